use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};

use super::AppState;
use crate::domain::Transaction;
use crate::error::AppError;

pub const SYNC_SECRET_HEADER: &str = "x-sync-secret";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub success: bool,
    pub message: String,
    pub processed: usize,
}

/// Reconcile a batch of sheet transactions into the ledger.
///
/// The whole body is decoded before anything is persisted, so a malformed
/// item rejects the batch up front. Store failures abort mid-batch and keep
/// what was already written.
pub async fn sync_from_sheet(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SyncResponse>, AppError> {
    let authorized = headers
        .get(SYNC_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|presented| state.config.sync_secret.matches(presented))
        .unwrap_or(false);
    if !authorized {
        warn!("Rejected sync request with missing or wrong secret");
        return Err(AppError::Unauthorized);
    }

    let items: Vec<Value> =
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let incoming = items
        .into_iter()
        .map(Transaction::from_json)
        .collect::<Result<Vec<_>, _>>()?;

    let outcome = state.reconciler.sync(incoming).await.map_err(|e| {
        error!(error = %e, "Error syncing data");
        AppError::from(e)
    })?;

    Ok(Json(SyncResponse {
        success: true,
        message: format!("{} transactions synced.", outcome.processed),
        processed: outcome.processed,
    }))
}
