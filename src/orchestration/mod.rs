pub mod reconcile;

pub use reconcile::{ReconcileError, ReconciliationService, SyncOutcome};
