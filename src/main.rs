use poolkeeper::config::{Config, SheetBackend};
use poolkeeper::domain::SHEET_COLUMNS;
use poolkeeper::{api, db::init_db, CostingPolicy, LedgerStore, ReconciliationService, Repository};
use poolkeeper::{CsvSheetSource, GoogleSheetsSource, SheetSource};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;

    let pool = match init_db(&config.database_path).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let store: Arc<dyn LedgerStore> = Arc::new(Repository::new(pool));
    let reconciler = Arc::new(ReconciliationService::new(
        store,
        CostingPolicy::new(config.fallback_cost_factor),
        config.ledger_collection.clone(),
    ));

    let sheet: Arc<dyn SheetSource> = match &config.sheet_backend {
        SheetBackend::Csv { path } => {
            Arc::new(CsvSheetSource::new(path.as_str()).with_header(SHEET_COLUMNS))
        }
        SheetBackend::Google {
            api_url,
            spreadsheet_id,
            access_token,
        } => Arc::new(GoogleSheetsSource::new(
            api_url.clone(),
            spreadsheet_id.clone(),
            access_token.clone(),
        )),
    };

    tracing::info!(
        collection = %config.ledger_collection,
        fallback_cost_factor = %config.fallback_cost_factor,
        "Ledger reconciliation configured"
    );

    let app = api::create_router(api::AppState::new(config, sheet, reconciler));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
