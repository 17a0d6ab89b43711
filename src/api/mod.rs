pub mod health;
pub mod pools;
pub mod sync;
pub mod transactions;

use crate::config::Config;
use crate::error::AppError;
use crate::orchestration::ReconciliationService;
use crate::sheet::SheetSource;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sheet: Arc<dyn SheetSource>,
    pub reconciler: Arc<ReconciliationService>,
}

impl AppState {
    pub fn new(
        config: Config,
        sheet: Arc<dyn SheetSource>,
        reconciler: Arc<ReconciliationService>,
    ) -> Self {
        Self {
            config,
            sheet,
            reconciler,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route(
            "/api/get-transactions",
            get(transactions::get_transactions),
        )
        .route(
            "/api/add-transaction",
            post(transactions::add_transaction).fallback(method_not_allowed),
        )
        .route(
            "/api/sync-from-sheet",
            post(sync::sync_from_sheet).fallback(method_not_allowed),
        )
        .route("/api/pools", get(pools::get_pools))
        .layer(cors)
        .with_state(state)
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
