//! Domain types for the exchange ledger.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper
//! - Domain primitives: OrderId, CurrencySlug, ServiceType, order dates
//! - The Transaction record and its lenient inbound form
//! - Per-field decoders for spreadsheet input
//! - Stable chronological ordering for replay

pub mod coerce;
pub mod decimal;
pub mod error;
pub mod ordering;
pub mod primitives;
pub mod transaction;

pub use decimal::Decimal;
pub use error::LedgerError;
pub use ordering::sort_chronological;
pub use primitives::{parse_order_date, CurrencySlug, OrderId, ServiceType};
pub use transaction::{Transaction, TransactionRow, SHEET_COLUMNS};
