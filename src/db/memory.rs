//! In-memory ledger store for tests and local experiments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::db::store::{LedgerStore, StoreError};
use crate::domain::Transaction;

/// Ledger store that keeps documents in process memory.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    collections: Mutex<HashMap<String, Vec<Transaction>>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a collection with already-enriched history.
    pub fn with_documents(self, collection: &str, documents: Vec<Transaction>) -> Self {
        self.collections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
        self
    }

    /// Snapshot of a collection.
    pub fn documents(&self, collection: &str) -> Vec<Transaction> {
        self.collections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn get_all_documents(&self, collection: &str) -> Result<Vec<Transaction>, StoreError> {
        Ok(self.documents(collection))
    }

    async fn add_document(&self, collection: &str, tx: &Transaction) -> Result<String, StoreError> {
        self.collections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(collection.to_string())
            .or_default()
            .push(tx.clone());
        Ok(Uuid::new_v4().to_string())
    }
}
