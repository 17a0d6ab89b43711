//! SQLite-backed ledger repository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::db::store::{LedgerStore, StoreError};
use crate::domain::{Decimal, Transaction};

/// Repository for ledger documents.
///
/// The full record is kept as JSON. Accounting fields are duplicated into
/// TEXT columns holding canonical decimals, and those columns win on read so
/// stored amounts never pass through a float.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Number of documents in a collection.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn count_documents(&self, collection: &str) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM ledger_documents WHERE collection = ?")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    fn decode_row(row: &SqliteRow) -> Result<Transaction, StoreError> {
        let doc_id: String = row.get("doc_id");
        let record: String = row.get("record");

        let mut tx: Transaction =
            serde_json::from_str(&record).map_err(|e| StoreError::Corrupt {
                doc_id: doc_id.clone(),
                reason: e.to_string(),
            })?;

        let exact = |column: &str| -> Result<Option<Decimal>, StoreError> {
            let raw: Option<String> = row.get(column);
            raw.map(|s| {
                s.parse::<Decimal>().map_err(|e| StoreError::Corrupt {
                    doc_id: doc_id.clone(),
                    reason: format!("{} {:?}: {}", column, s, e),
                })
            })
            .transpose()
        };

        if let Some(amount) = exact("currency_amount")? {
            tx.currency_amount = amount;
        }
        if let Some(price) = exact("currency_price")? {
            tx.currency_price = price;
        }
        tx.cost_basis = exact("cost_basis")?.or(tx.cost_basis);
        tx.net_profit = exact("net_profit")?.or(tx.net_profit);

        Ok(tx)
    }
}

#[async_trait]
impl LedgerStore for Repository {
    async fn get_all_documents(&self, collection: &str) -> Result<Vec<Transaction>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT doc_id, record, currency_amount, currency_price, cost_basis, net_profit
            FROM ledger_documents
            WHERE collection = ?
            ORDER BY seq ASC
            "#,
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::Read)?;

        let transactions = rows
            .iter()
            .map(Self::decode_row)
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|e| warn!(collection = %collection, error = %e, "Failed to decode ledger"))?;

        debug!(
            collection = %collection,
            count = transactions.len(),
            "Loaded ledger history"
        );
        Ok(transactions)
    }

    async fn add_document(&self, collection: &str, tx: &Transaction) -> Result<String, StoreError> {
        let doc_id = Uuid::new_v4().to_string();
        let record = serde_json::to_string(tx).map_err(|e| StoreError::Corrupt {
            doc_id: doc_id.clone(),
            reason: e.to_string(),
        })?;

        sqlx::query(
            r#"
            INSERT INTO ledger_documents (
                doc_id, collection, order_id, order_date_ms, currency_slug, service_type,
                currency_amount, currency_price, cost_basis, net_profit, record, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(doc_id.as_str())
        .bind(collection)
        .bind(tx.order_id.as_str())
        .bind(tx.order_date.timestamp_millis())
        .bind(tx.currency_slug.as_str())
        .bind(tx.service_type.to_string())
        .bind(tx.currency_amount.to_canonical_string())
        .bind(tx.currency_price.to_canonical_string())
        .bind(tx.cost_basis.map(|d| d.to_canonical_string()))
        .bind(tx.net_profit.map(|d| d.to_canonical_string()))
        .bind(record)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(StoreError::Write)?;

        Ok(doc_id)
    }
}
