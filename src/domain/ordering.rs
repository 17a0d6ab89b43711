//! Stable chronological ordering for ledger replay.

use crate::domain::Transaction;

/// Sort transactions by order date, oldest first.
///
/// The sort is stable: transactions sharing a timestamp keep their
/// arrival/insertion order.
pub fn sort_chronological(transactions: &mut [Transaction]) {
    transactions.sort_by_key(|tx| tx.order_date);
}
