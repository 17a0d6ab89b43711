//! Ledger persistence.
//!
//! This module provides:
//! - Database initialization (WAL, busy timeout) and the embedded schema
//! - The `LedgerStore` seam with SQLite and in-memory implementations

pub mod memory;
pub mod migrations;
pub mod repo;
pub mod store;

pub use memory::MemoryLedgerStore;
pub use migrations::init_db;
pub use repo::Repository;
pub use store::{LedgerStore, StoreError};
