//! Document store seam used by reconciliation.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Transaction;

/// Append-only store of enriched ledger transactions, grouped by collection.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Every transaction in `collection`, in insertion order.
    ///
    /// Callers rely on this being the complete history: no paging.
    async fn get_all_documents(&self, collection: &str) -> Result<Vec<Transaction>, StoreError>;

    /// Append one transaction, returning its generated document id.
    async fn add_document(&self, collection: &str, tx: &Transaction) -> Result<String, StoreError>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("ledger read failed: {0}")]
    Read(#[source] sqlx::Error),
    #[error("ledger write failed: {0}")]
    Write(#[source] sqlx::Error),
    #[error("stored document {doc_id} is unreadable: {reason}")]
    Corrupt { doc_id: String, reason: String },
}
