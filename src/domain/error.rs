use thiserror::Error;

/// Errors raised while decoding or validating ledger records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("invalid service type {0:?}: expected buy or sell")]
    InvalidServiceType(String),
    #[error("invalid order date {0:?}")]
    InvalidOrderDate(String),
    #[error("malformed transaction: {0}")]
    Decode(String),
    #[error("order {order_id}: {operation} overflows the decimal range")]
    Overflow {
        order_id: String,
        operation: &'static str,
    },
}
