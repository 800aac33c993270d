//! CSV export of accumulated results.
//!
//! The export is the input file with three result columns added. Input
//! values are written back untouched. Files start with a UTF-8 byte-order
//! mark so spreadsheet software detects the encoding.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, TimeZone};

use super::reconciler::Reconciler;

/// Duration text column.
pub const COL_DURATION: &str = "Temps de trajet";
/// Distance text column.
pub const COL_DISTANCE: &str = "Distance";
/// Status summary column.
pub const COL_STATUS: &str = "Statut";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Errors writing an export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// File name for an export created at `now`, e.g.
/// `resultats_trajets_20250115_104217.csv`.
pub fn default_export_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("resultats_trajets_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Where each result column lands in the export.
///
/// Re-running a previous export overwrites its result columns in place
/// instead of appending a second set.
struct Layout {
    headers: Vec<String>,
    duration: usize,
    distance: usize,
    status: usize,
}

impl Layout {
    fn new(input_headers: &[String]) -> Self {
        let mut headers = input_headers.to_vec();
        let mut slot = |name: &str| match headers.iter().position(|h| h.trim() == name) {
            Some(idx) => idx,
            None => {
                headers.push(name.to_string());
                headers.len() - 1
            }
        };

        let duration = slot(COL_DURATION);
        let distance = slot(COL_DISTANCE);
        let status = slot(COL_STATUS);

        Self {
            headers,
            duration,
            distance,
            status,
        }
    }
}

impl Reconciler {
    /// Column names of the export.
    pub fn export_headers(&self) -> Vec<String> {
        Layout::new(self.headers()).headers
    }

    /// Write every recorded row as CSV, byte-order mark first.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> Result<(), ExportError> {
        writer.write_all(UTF8_BOM)?;

        let layout = Layout::new(self.headers());
        let mut csv = csv::WriterBuilder::new()
            .flexible(false)
            .from_writer(writer);

        csv.write_record(&layout.headers)?;

        for result in self.rows() {
            let mut record = result.fields.clone();
            record.resize(layout.headers.len(), String::new());
            record[layout.duration] = result.outcome.duration_text().to_string();
            record[layout.distance] = result.outcome.distance_text().to_string();
            record[layout.status] = result.outcome.status().to_string();
            csv.write_record(&record)?;
        }

        csv.flush()?;
        Ok(())
    }

    /// The export as an in-memory byte buffer.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, ExportError> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(buf)
    }

    /// Write the export to a file, replacing it if it exists.
    pub fn write_csv_file(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        let file = File::create(path)?;
        self.write_csv(BufWriter::new(file))
    }
}
