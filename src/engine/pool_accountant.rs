//! Per-currency pool accounting: running quantity and weighted-average cost.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::domain::{CurrencySlug, Decimal, LedgerError, ServiceType, Transaction};

/// Running aggregate for one currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyPool {
    /// Net quantity held. May go negative when sells outrun buys.
    pub quantity: Decimal,
    /// Quantity-weighted average purchase price. Only buys move it.
    pub weighted_avg_cost: Decimal,
}

/// Pool state for every currency seen so far.
///
/// Always rebuilt from the full ordered history; never cached between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolBook {
    pools: BTreeMap<CurrencySlug, CurrencyPool>,
}

fn overflow(tx: &Transaction, operation: &'static str) -> LedgerError {
    LedgerError::Overflow {
        order_id: tx.order_id.to_string(),
        operation,
    }
}

impl PoolBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay a history from empty pools.
    ///
    /// The history is ordered by order date first (stable, so same-time
    /// transactions replay in insertion order). The input is not modified.
    pub fn from_history(history: &[Transaction]) -> Result<Self, LedgerError> {
        let mut ordered: Vec<&Transaction> = history.iter().collect();
        ordered.sort_by_key(|tx| tx.order_date);
        Self::replay(ordered)
    }

    /// Replay transactions that are already in chronological order.
    ///
    /// # Errors
    /// Stops at the first transaction whose arithmetic leaves the decimal range.
    pub fn replay<'a, I>(ordered: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut book = Self::new();
        for tx in ordered {
            book.apply(tx)?;
        }
        Ok(book)
    }

    /// Apply one transaction to the pool of its currency.
    ///
    /// A buy blends its price into the weighted-average cost; a sell only
    /// reduces quantity. When a buy leaves the pool at zero or below, the
    /// average cost resets to zero instead of dividing by a non-positive
    /// quantity. On overflow the pool is left as it was.
    pub fn apply(&mut self, tx: &Transaction) -> Result<(), LedgerError> {
        let pool = self.pools.entry(tx.currency_slug.clone()).or_default();

        match tx.service_type {
            ServiceType::Buy => {
                let new_qty = pool
                    .quantity
                    .checked_add(tx.currency_amount)
                    .ok_or_else(|| overflow(tx, "pool quantity"))?;
                let weighted_avg_cost = if new_qty.is_positive() {
                    let held = pool
                        .quantity
                        .checked_mul(pool.weighted_avg_cost)
                        .ok_or_else(|| overflow(tx, "held notional"))?;
                    let bought = tx
                        .currency_amount
                        .checked_mul(tx.currency_price)
                        .ok_or_else(|| overflow(tx, "buy notional"))?;
                    held.checked_add(bought)
                        .and_then(|total| total.checked_div(new_qty))
                        .ok_or_else(|| overflow(tx, "weighted cost"))?
                } else {
                    debug!(
                        currency = %tx.currency_slug,
                        order_id = %tx.order_id,
                        quantity = %new_qty,
                        "Buy leaves pool non-positive, resetting weighted cost"
                    );
                    Decimal::zero()
                };
                pool.quantity = new_qty;
                pool.weighted_avg_cost = weighted_avg_cost;
            }
            ServiceType::Sell => {
                pool.quantity = pool
                    .quantity
                    .checked_sub(tx.currency_amount)
                    .ok_or_else(|| overflow(tx, "pool quantity"))?;
            }
        }
        Ok(())
    }

    /// Pool for a currency; zero quantity and zero cost when never seen.
    pub fn pool(&self, slug: &CurrencySlug) -> CurrencyPool {
        self.pools.get(slug).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CurrencySlug, &CurrencyPool)> {
        self.pools.iter()
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

/// Derived fields for one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Valuation {
    pub cost_basis: Decimal,
    pub net_profit: Decimal,
}

/// Rules for attributing cost and profit to a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostingPolicy {
    /// Multiplier applied to a sell's own price when its currency has no
    /// positive average cost yet. Awaiting product-owner confirmation.
    pub fallback_cost_factor: Decimal,
}

impl CostingPolicy {
    pub fn new(fallback_cost_factor: Decimal) -> Self {
        Self {
            fallback_cost_factor,
        }
    }

    /// Value `tx` against the pool state that precedes it.
    pub fn value(&self, book: &PoolBook, tx: &Transaction) -> Result<Valuation, LedgerError> {
        let cost_basis = self.cost_basis(book, tx)?;
        let net_profit = match tx.service_type {
            // Buys earn on markup and fees, not on the exchange itself.
            ServiceType::Buy => tx
                .network_wage
                .checked_sub(tx.actual_network_wage)
                .and_then(|network| tx.vip_amount.checked_add(tx.fix_wage)?.checked_add(network)),
            ServiceType::Sell => cost_basis
                .checked_mul(tx.currency_amount)
                .and_then(|cost| cost.checked_add(tx.actual_network_wage))
                .and_then(|cost| tx.total_amount.checked_sub(cost)),
        }
        .ok_or_else(|| overflow(tx, "net profit"))?;

        Ok(Valuation {
            cost_basis,
            net_profit,
        })
    }

    fn cost_basis(&self, book: &PoolBook, tx: &Transaction) -> Result<Decimal, LedgerError> {
        match tx.service_type {
            ServiceType::Buy => Ok(tx.currency_price),
            ServiceType::Sell => {
                let pool = book.pool(&tx.currency_slug);
                if pool.weighted_avg_cost.is_positive() {
                    Ok(pool.weighted_avg_cost)
                } else {
                    tx.currency_price
                        .checked_mul(self.fallback_cost_factor)
                        .ok_or_else(|| overflow(tx, "fallback cost"))
                }
            }
        }
    }
}

impl Default for CostingPolicy {
    fn default() -> Self {
        // 0.98
        Self::new(Decimal::new(rust_decimal::Decimal::new(98, 2)))
    }
}
