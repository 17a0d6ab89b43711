use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::collections::BTreeMap;

use super::AppState;
use crate::engine::CurrencyPool;
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolsResponse {
    pub pools: BTreeMap<String, CurrencyPool>,
}

/// Pool state per currency after replaying the whole ledger.
pub async fn get_pools(State(state): State<AppState>) -> Result<Json<PoolsResponse>, AppError> {
    let book = state.reconciler.current_pools().await?;

    let pools = book
        .iter()
        .map(|(slug, pool)| (slug.as_str().to_string(), *pool))
        .collect();

    Ok(Json(PoolsResponse { pools }))
}
