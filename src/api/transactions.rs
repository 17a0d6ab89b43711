use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use tracing::{error, info};

use super::AppState;
use crate::domain::Transaction;
use crate::error::AppError;
use crate::sheet::SheetRecord;

/// Every sheet row as an object keyed by sanitized header. Cells stay text.
pub async fn get_transactions(
    State(state): State<AppState>,
) -> Result<Json<Vec<SheetRecord>>, AppError> {
    let rows = state
        .sheet
        .read_rows(&state.config.sheet_read_range)
        .await
        .map_err(|e| {
            error!(error = %e, "Error reading from spreadsheet");
            AppError::UpstreamRead(e.to_string())
        })?;

    Ok(Json(rows))
}

/// Append one transaction to the sheet in the fixed column layout.
pub async fn add_transaction(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let value: Value =
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let tx = Transaction::from_json(value)?;

    state
        .sheet
        .append_values(&state.config.sheet_append_range, tx.to_sheet_row())
        .await
        .map_err(|e| {
            error!(order_id = %tx.order_id, error = %e, "Error writing to spreadsheet");
            AppError::UpstreamWrite(e.to_string())
        })?;

    info!(order_id = %tx.order_id, "Transaction appended to spreadsheet");
    Ok(Json(json!({ "success": true })))
}
