//! Trip file parsing.

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use crate::domain::TripRequest;

use super::error::LoadError;

/// Origin address column.
pub const COL_ORIGIN: &str = "Origine";
/// Destination address column.
pub const COL_DESTINATION: &str = "Destination";
/// Transport mode label column.
pub const COL_MODE: &str = "Mode de transport";
/// Departure clock time column.
pub const COL_DEPARTURE: &str = "Heure de départ";
/// Departure column name as mangled by an earlier Latin-1 round trip.
pub const COL_DEPARTURE_LEGACY: &str = "Heure de dÃ©part";
/// Departure weekday column.
pub const COL_WEEKDAY: &str = "Jour";

/// Columns every trip file must have.
pub const REQUIRED_COLUMNS: [&str; 3] = [COL_ORIGIN, COL_DESTINATION, COL_MODE];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Positions of the known columns within a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    origin: usize,
    destination: usize,
    mode: usize,
    departure: Option<usize>,
    weekday: Option<usize>,
}

impl Columns {
    /// Locate columns, reporting every missing required one at once.
    fn locate(headers: &[String]) -> Result<Self, LoadError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| find(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }

        Ok(Self {
            origin: find(COL_ORIGIN).unwrap_or_default(),
            destination: find(COL_DESTINATION).unwrap_or_default(),
            mode: find(COL_MODE).unwrap_or_default(),
            departure: find(COL_DEPARTURE).or_else(|| find(COL_DEPARTURE_LEGACY)),
            weekday: find(COL_WEEKDAY),
        })
    }
}

/// One data row of a trip file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripRow {
    /// 1-based position among data rows (the header is not counted).
    pub row: usize,
    /// Raw field values, one per header column, exactly as read.
    pub fields: Vec<String>,
    /// The trip described by this row.
    pub request: TripRequest,
}

/// A parsed trip file: its header and its rows, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripTable {
    headers: Vec<String>,
    rows: Vec<TripRow>,
}

impl TripTable {
    /// Load a trip file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }

    /// Load a trip file from any reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, LoadError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| LoadError::Csv(e.into()))?;
        Self::from_bytes(&bytes)
    }

    /// Parse a trip file held in memory.
    ///
    /// A leading UTF-8 byte-order mark is ignored. The delimiter is
    /// detected from the header line (comma, semicolon or tab). Rows with
    /// fewer fields than the header are padded with empty values; surplus
    /// trailing fields are dropped when empty and rejected otherwise, since
    /// they have no column to be written back to.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(sniff_delimiter(bytes))
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Err(LoadError::NoHeader);
        }

        let columns = Columns::locate(&headers)?;

        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            let row = idx + 1;
            let fields = fit_fields(&record, headers.len(), row)?;
            let request = build_request(row, &fields, &columns)?;
            rows.push(TripRow {
                row,
                fields,
                request,
            });
        }

        tracing::debug!(rows = rows.len(), columns = headers.len(), "loaded trip table");
        Ok(Self { headers, rows })
    }

    /// Column names, exactly as they appear in the file.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows, in file order.
    pub fn rows(&self) -> &[TripRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Split into header and rows.
    pub fn into_parts(self) -> (Vec<String>, Vec<TripRow>) {
        (self.headers, self.rows)
    }
}

/// Pick the delimiter that occurs most often on the header line.
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let header = bytes.split(|&b| b == b'\n').next().unwrap_or_default();
    let count = |d: u8| header.iter().filter(|&&b| b == d).count();

    [b',', b';', b'\t']
        .into_iter()
        .max_by_key(|&d| (count(d), d == b','))
        .unwrap_or(b',')
}

/// Align a record with the header: pad short rows, drop empty surplus
/// fields, reject surplus fields that carry data.
fn fit_fields(record: &StringRecord, width: usize, row: usize) -> Result<Vec<String>, LoadError> {
    let mut fields: Vec<String> = record.iter().map(str::to_string).collect();

    if fields.len() > width {
        if fields[width..].iter().any(|f| !f.trim().is_empty()) {
            return Err(LoadError::ExtraFields {
                row,
                expected: width,
                found: fields.len(),
            });
        }
        fields.truncate(width);
    }

    fields.resize(width, String::new());
    Ok(fields)
}

fn build_request(row: usize, fields: &[String], columns: &Columns) -> Result<TripRequest, LoadError> {
    let required = |idx: usize, column: &'static str| -> Result<String, LoadError> {
        let value = &fields[idx];
        if value.trim().is_empty() {
            return Err(LoadError::EmptyField { row, column });
        }
        Ok(value.clone())
    };

    Ok(TripRequest {
        origin: required(columns.origin, COL_ORIGIN)?,
        destination: required(columns.destination, COL_DESTINATION)?,
        mode_label: fields[columns.mode].clone(),
        departure_clock: columns.departure.map(|idx| fields[idx].clone()),
        departure_weekday: columns.weekday.map(|idx| fields[idx].clone()),
    })
}
