//! Spreadsheet abstraction for reading and appending ledger rows.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;

pub mod csv_file;
pub mod google;
pub mod mock;

pub use csv_file::CsvSheetSource;
pub use google::GoogleSheetsSource;
pub use mock::MockSheetSource;

/// A row keyed by sanitized header names.
pub type SheetRecord = Map<String, Value>;

/// Spreadsheet trait for reading cell values and appending rows.
#[async_trait]
pub trait SheetSource: Send + Sync + fmt::Debug {
    /// Fetch raw cell values for an A1 range, header row included.
    ///
    /// # Arguments
    /// * `range` - A1 notation, e.g. `Sheet1!A:AC`
    async fn read_values(&self, range: &str) -> Result<Vec<Vec<String>>, SheetError>;

    /// Append a single row after the last non-empty row of `range`.
    async fn append_values(&self, range: &str, row: Vec<String>) -> Result<(), SheetError>;

    /// Read `range` as records keyed by the sanitized first row.
    async fn read_rows(&self, range: &str) -> Result<Vec<SheetRecord>, SheetError> {
        let values = self.read_values(range).await?;
        Ok(rows_to_records(values))
    }
}

/// Replace each run of whitespace in a header with a single underscore.
pub fn sanitize_header(header: &str) -> String {
    let mut out = String::with_capacity(header.len());
    let mut in_space = false;
    for c in header.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Turn a value grid into records. The first row is the header; cells missing
/// at the end of a short row are left out of its record.
pub fn rows_to_records(values: Vec<Vec<String>>) -> Vec<SheetRecord> {
    let mut rows = values.into_iter();
    let Some(header_row) = rows.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = header_row.iter().map(|h| sanitize_header(h)).collect();

    rows.map(|row| {
        headers
            .iter()
            .zip(row)
            .map(|(header, cell)| (header.clone(), Value::String(cell)))
            .collect()
    })
    .collect()
}

/// Error type for spreadsheet operations.
#[derive(Debug)]
pub enum SheetError {
    /// Network error (e.g., connection refused, DNS failure)
    NetworkError(String),
    /// Non-success HTTP status from the spreadsheet API
    HttpError { status: u16, message: String },
    /// Response or file contents could not be parsed
    ParseError(String),
    /// Local file error
    Io(std::io::Error),
}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            SheetError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            SheetError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            SheetError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for SheetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SheetError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SheetError {
    fn from(err: std::io::Error) -> Self {
        SheetError::Io(err)
    }
}
