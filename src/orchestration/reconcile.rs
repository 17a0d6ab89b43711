use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::db::{LedgerStore, StoreError};
use crate::domain::{sort_chronological, LedgerError, Transaction};
use crate::engine::{CostingPolicy, PoolBook};

/// Merges newly reported transactions into the ledger with cost basis and
/// net profit filled in.
///
/// Runs are serialized by a single-writer lock, so the read-all-then-append
/// sequence of one sync never interleaves with another sync in this process.
/// Separate processes sharing one database are not coordinated.
pub struct ReconciliationService {
    store: Arc<dyn LedgerStore>,
    policy: CostingPolicy,
    collection: String,
    writer: Mutex<()>,
}

/// Result of a successful sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub processed: usize,
    pub enriched: Vec<Transaction>,
}

impl ReconciliationService {
    pub fn new(store: Arc<dyn LedgerStore>, policy: CostingPolicy, collection: String) -> Self {
        Self {
            store,
            policy,
            collection,
            writer: Mutex::new(()),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Load the complete history and reconcile `incoming` against it.
    ///
    /// # Errors
    /// Fails on the first read or write error. Transactions persisted before
    /// the failure stay committed.
    pub async fn sync(&self, incoming: Vec<Transaction>) -> Result<SyncOutcome, ReconcileError> {
        let _writer = self.writer.lock().await;

        let history = self
            .store
            .get_all_documents(&self.collection)
            .await
            .map_err(ReconcileError::Read)?;

        info!(
            collection = %self.collection,
            history = history.len(),
            incoming = incoming.len(),
            "Reconciling batch"
        );

        let enriched = self.reconcile_batch(history, incoming).await?;

        info!(
            collection = %self.collection,
            processed = enriched.len(),
            "Batch reconciled"
        );

        Ok(SyncOutcome {
            processed: enriched.len(),
            enriched,
        })
    }

    /// Enrich and persist `incoming` one transaction at a time, in input order.
    ///
    /// Before each transaction the working list (history plus everything
    /// already enriched in this batch) is re-sorted by date and the pools are
    /// replayed from scratch.
    pub async fn reconcile_batch(
        &self,
        existing: Vec<Transaction>,
        incoming: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, ReconcileError> {
        let mut working = existing;
        let mut enriched = Vec::with_capacity(incoming.len());

        for mut tx in incoming {
            sort_chronological(&mut working);
            let book = PoolBook::replay(&working).map_err(ReconcileError::Replay)?;

            let valuation = self
                .policy
                .value(&book, &tx)
                .and_then(|valuation| {
                    ensure_replayable(&working, &tx)?;
                    Ok(valuation)
                })
                .map_err(|e| {
                    warn!(
                        order_id = %tx.order_id,
                        persisted = enriched.len(),
                        error = %e,
                        "Aborting batch on unaccountable transaction"
                    );
                    ReconcileError::Rejected(e)
                })?;
            tx.cost_basis = Some(valuation.cost_basis);
            tx.net_profit = Some(valuation.net_profit);

            debug!(
                order_id = %tx.order_id,
                currency = %tx.currency_slug,
                service_type = %tx.service_type,
                cost_basis = %valuation.cost_basis,
                net_profit = %valuation.net_profit,
                "Enriched transaction"
            );

            if let Err(e) = self.store.add_document(&self.collection, &tx).await {
                error!(
                    order_id = %tx.order_id,
                    persisted = enriched.len(),
                    error = %e,
                    "Aborting batch on write failure"
                );
                return Err(ReconcileError::Write(e));
            }

            working.push(tx.clone());
            enriched.push(tx);
        }

        Ok(enriched)
    }

    /// Pool state after replaying the whole stored history.
    pub async fn current_pools(&self) -> Result<PoolBook, ReconcileError> {
        let history = self
            .store
            .get_all_documents(&self.collection)
            .await
            .map_err(ReconcileError::Read)?;
        PoolBook::from_history(&history).map_err(ReconcileError::Replay)
    }
}

/// Check that the ledger still replays once `tx` is added at its date.
/// A row that breaks replay would fail every later sync, so it must never
/// be persisted.
fn ensure_replayable(working: &[Transaction], tx: &Transaction) -> Result<(), LedgerError> {
    let mut ordered: Vec<&Transaction> = working.iter().chain(std::iter::once(tx)).collect();
    ordered.sort_by_key(|t| t.order_date);
    PoolBook::replay(ordered).map(|_| ())
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Read(StoreError),
    #[error(transparent)]
    Write(StoreError),
    /// An incoming transaction cannot be accounted for.
    #[error("transaction rejected: {0}")]
    Rejected(#[source] LedgerError),
    /// The stored history itself no longer replays.
    #[error("stored ledger cannot be replayed: {0}")]
    Replay(#[source] LedgerError),
}
