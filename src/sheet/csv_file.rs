//! Local CSV file acting as a single-sheet spreadsheet.

use async_trait::async_trait;
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::debug;

use super::{SheetError, SheetSource};

/// Spreadsheet backed by one CSV file. The A1 range is ignored: the whole
/// file is the sheet.
#[derive(Debug, Clone)]
pub struct CsvSheetSource {
    path: PathBuf,
    header: Option<Vec<String>>,
}

impl CsvSheetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            header: None,
        }
    }

    /// Header row written when the first row is appended to a new or empty file.
    pub fn with_header<I, S>(mut self, header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header = Some(header.into_iter().map(Into::into).collect());
        self
    }

    fn read_blocking(path: PathBuf) -> Result<Vec<Vec<String>>, SheetError> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)
            .map_err(csv_error)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }

    fn append_blocking(
        path: PathBuf,
        header: Option<Vec<String>>,
        row: Vec<String>,
    ) -> Result<(), SheetError> {
        let is_new = std::fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(file);
        if is_new {
            if let Some(header) = header {
                writer.write_record(&header).map_err(csv_error)?;
            }
        }
        writer.write_record(&row).map_err(csv_error)?;
        writer.flush()?;
        Ok(())
    }
}

fn csv_error(err: csv::Error) -> SheetError {
    if err.is_io_error() {
        match err.into_kind() {
            csv::ErrorKind::Io(io) => SheetError::Io(io),
            other => SheetError::ParseError(format!("{:?}", other)),
        }
    } else {
        SheetError::ParseError(err.to_string())
    }
}

#[async_trait]
impl SheetSource for CsvSheetSource {
    async fn read_values(&self, range: &str) -> Result<Vec<Vec<String>>, SheetError> {
        debug!(path = %self.path.display(), range = %range, "Reading CSV sheet");
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::read_blocking(path))
            .await
            .map_err(|e| SheetError::Io(std::io::Error::other(e)))?
    }

    async fn append_values(&self, range: &str, row: Vec<String>) -> Result<(), SheetError> {
        debug!(path = %self.path.display(), range = %range, "Appending CSV row");
        let path = self.path.clone();
        let header = self.header.clone();
        tokio::task::spawn_blocking(move || Self::append_blocking(path, header, row))
            .await
            .map_err(|e| SheetError::Io(std::io::Error::other(e)))?
    }
}
