//! Input loading error types.

use std::path::PathBuf;

/// Errors that abort loading a trip file.
///
/// Any of these is fatal for the run: no trip is routed.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// One or more required columns are absent from the header.
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A required field is blank on a data row.
    #[error("row {row}: column '{column}' is empty")]
    EmptyField { row: usize, column: &'static str },

    /// A data row has values beyond the last header column.
    #[error("row {row}: {found} fields, but the header has {expected} columns")]
    ExtraFields {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// The file has no header row.
    #[error("file is empty (no header row)")]
    NoHeader,

    /// The file is not valid delimited UTF-8 text.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    /// Names of the missing columns, if that is what went wrong.
    pub fn missing_columns(&self) -> Option<&[String]> {
        match self {
            LoadError::MissingColumns(cols) => Some(cols),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = LoadError::MissingColumns(vec!["Origine".into(), "Mode de transport".into()]);
        assert_eq!(
            err.to_string(),
            "missing required columns: Origine, Mode de transport"
        );
        assert_eq!(err.missing_columns().map(<[String]>::len), Some(2));

        let err = LoadError::EmptyField {
            row: 3,
            column: "Destination",
        };
        assert_eq!(err.to_string(), "row 3: column 'Destination' is empty");
        assert!(err.missing_columns().is_none());

        let err = LoadError::ExtraFields {
            row: 2,
            expected: 3,
            found: 5,
        };
        assert_eq!(err.to_string(), "row 2: 5 fields, but the header has 3 columns");

        assert_eq!(
            LoadError::NoHeader.to_string(),
            "file is empty (no header row)"
        );
    }
}
