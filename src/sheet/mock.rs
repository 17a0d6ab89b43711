//! Mock spreadsheet for testing without network or files.

use async_trait::async_trait;
use std::sync::Mutex;

use super::{SheetError, SheetSource};

/// In-memory grid with optional injected failure.
#[derive(Debug, Default)]
pub struct MockSheetSource {
    values: Mutex<Vec<Vec<String>>>,
    fail_with: Option<String>,
}

impl MockSheetSource {
    /// Create an empty sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row (the first row added is the header).
    pub fn with_row<I, S>(self, row: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().push(row.into_iter().map(Into::into).collect());
        self
    }

    /// Make every call fail with a network error carrying `message`.
    pub fn failing(mut self, message: &str) -> Self {
        self.fail_with = Some(message.to_string());
        self
    }

    /// Snapshot of the grid.
    pub fn values(&self) -> Vec<Vec<String>> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Vec<String>>> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_failure(&self) -> Result<(), SheetError> {
        match &self.fail_with {
            Some(message) => Err(SheetError::NetworkError(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SheetSource for MockSheetSource {
    async fn read_values(&self, _range: &str) -> Result<Vec<Vec<String>>, SheetError> {
        self.check_failure()?;
        Ok(self.values())
    }

    async fn append_values(&self, _range: &str, row: Vec<String>) -> Result<(), SheetError> {
        self.check_failure()?;
        self.lock().push(row);
        Ok(())
    }
}
