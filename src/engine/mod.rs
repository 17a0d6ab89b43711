//! Pure computation engine for deterministic ledger logic.

pub mod pool_accountant;

pub use pool_accountant::{CostingPolicy, CurrencyPool, PoolBook, Valuation};
