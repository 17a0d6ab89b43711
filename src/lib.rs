pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod sheet;

pub use config::Config;
pub use db::{init_db, LedgerStore, MemoryLedgerStore, Repository};
pub use domain::{CurrencySlug, Decimal, LedgerError, OrderId, ServiceType, Transaction};
pub use engine::{CostingPolicy, CurrencyPool, PoolBook, Valuation};
pub use error::AppError;
pub use orchestration::{ReconcileError, ReconciliationService};
pub use sheet::{CsvSheetSource, GoogleSheetsSource, MockSheetSource, SheetSource};
