//! Ledger database setup: connection options and the embedded schema.

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

const SCHEMA: &str = include_str!("schema.sql");

/// Open (creating if needed) the ledger database and apply the schema.
pub async fn init_db(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    apply_schema(&pool).await?;

    info!(path = %db_path, "Ledger database initialized");
    Ok(pool)
}

fn schema_statements() -> impl Iterator<Item = &'static str> {
    SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty())
}

/// Apply every schema statement in one transaction. Statements use
/// `IF NOT EXISTS`, so reapplying is a no-op.
async fn apply_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut applied = 0usize;
    for statement in schema_statements() {
        sqlx::query(statement).execute(&mut *tx).await?;
        applied += 1;
    }
    tx.commit().await?;

    debug!(statements = applied, "Ledger schema applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn fresh_db() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("nested")
            .join("ledger.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (pool, temp_dir)
    }

    #[test]
    fn test_schema_has_table_and_two_indexes() {
        let statements: Vec<&str> = schema_statements().collect();
        assert_eq!(statements.len(), 3);
        assert!(statements[0].starts_with("CREATE TABLE IF NOT EXISTS ledger_documents"));
        assert!(statements[1..]
            .iter()
            .all(|s| s.starts_with("CREATE INDEX IF NOT EXISTS")));
    }

    #[tokio::test]
    async fn test_init_db_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("a").join("b").join("ledger.db");

        init_db(&db_path.to_string_lossy()).await.expect("init_db failed");
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_seq_is_autoincrement_primary_key() {
        let (pool, _temp) = fresh_db().await;

        let columns: Vec<(i64, String, String, i64, Option<String>, i64)> =
            sqlx::query_as("PRAGMA table_info(ledger_documents)")
                .fetch_all(&pool)
                .await
                .unwrap();
        let seq = columns.iter().find(|c| c.1 == "seq").unwrap();
        assert_eq!(seq.2, "INTEGER");
        assert_eq!(seq.5, 1, "seq should be the primary key");

        // AUTOINCREMENT keeps a sequence row, so deleted seq values are never reused.
        let (uses_sequence,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE name = 'sqlite_sequence'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(uses_sequence, 1);
    }

    #[tokio::test]
    async fn test_decimal_columns_are_text() {
        let (pool, _temp) = fresh_db().await;

        let columns: Vec<(i64, String, String, i64, Option<String>, i64)> =
            sqlx::query_as("PRAGMA table_info(ledger_documents)")
                .fetch_all(&pool)
                .await
                .unwrap();
        for name in ["currency_amount", "currency_price", "cost_basis", "net_profit"] {
            let column = columns.iter().find(|c| c.1 == name).unwrap();
            assert_eq!(column.2, "TEXT", "{} must hold canonical decimal text", name);
        }
        let nullable: Vec<&str> = columns
            .iter()
            .filter(|c| c.3 == 0)
            .map(|c| c.1.as_str())
            .collect();
        assert_eq!(nullable, vec!["seq", "cost_basis", "net_profit"]);
    }

    #[tokio::test]
    async fn test_currency_index_covers_replay_lookup() {
        let (pool, _temp) = fresh_db().await;

        let columns: Vec<(i64, i64, String)> =
            sqlx::query_as("PRAGMA index_info(idx_ledger_documents_currency)")
                .fetch_all(&pool)
                .await
                .unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.2.as_str()).collect();
        assert_eq!(names, vec!["collection", "currency_slug", "order_date_ms"]);
    }

    #[tokio::test]
    async fn test_reapplying_schema_keeps_documents() {
        let (pool, _temp) = fresh_db().await;

        sqlx::query(
            "INSERT INTO ledger_documents (doc_id, collection, order_id, order_date_ms, \
             currency_slug, service_type, currency_amount, currency_price, record, created_at) \
             VALUES ('d1', 'transactions', '1', 0, 'tether', 'buy', '1', '100', '{}', 0)",
        )
        .execute(&pool)
        .await
        .unwrap();

        apply_schema(&pool).await.expect("second schema run failed");

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ledger_documents")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
