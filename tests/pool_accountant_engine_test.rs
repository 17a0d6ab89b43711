use chrono::{Duration, TimeZone, Utc};
use poolkeeper::{CostingPolicy, CurrencySlug, Decimal, PoolBook, ServiceType, Transaction};
use serde_json::json;

fn d(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap()
}

fn tether() -> CurrencySlug {
    CurrencySlug::new("tether".to_string())
}

fn tx(seq: i64, side: &str, amount: &str, price: &str) -> Transaction {
    let mut tx = Transaction::from_json(json!({
        "orderid": seq.to_string(),
        "orderdate": "2024-01-01T00:00:00Z",
        "services_type": side,
        "currencie_slug": "tether",
        "currency_amount": amount,
        "currency_price": price,
    }))
    .unwrap();
    tx.order_date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(seq);
    tx
}

/// Deterministic mixed sequence: mostly buys with periodic sells.
fn mixed_sequence() -> Vec<Transaction> {
    let mut out = Vec::new();
    for i in 0..40i64 {
        let amount = format!("{}", (i * 7) % 11 + 1);
        let price = format!("{}.{}", 90 + (i * 13) % 25, i % 10);
        let side = if i % 4 == 3 { "sell" } else { "buy" };
        out.push(tx(i, side, &amount, &price));
    }
    out
}

#[test]
fn test_sells_never_move_weighted_cost() {
    let mut book = PoolBook::new();
    for t in mixed_sequence() {
        let before = book.pool(&tether());
        book.apply(&t).unwrap();
        let after = book.pool(&tether());

        if t.service_type == ServiceType::Sell {
            assert_eq!(after.weighted_avg_cost, before.weighted_avg_cost);
            assert_eq!(after.quantity, before.quantity - t.currency_amount);
        }
    }
}

#[test]
fn test_buy_only_cost_is_weighted_mean() {
    let buys = vec![
        tx(1, "buy", "2", "100"),
        tx(2, "buy", "3", "110"),
        tx(3, "buy", "5", "95.5"),
    ];
    let book = PoolBook::from_history(&buys).unwrap();

    let notional: Decimal = buys.iter().map(|t| t.currency_amount * t.currency_price).sum();
    let quantity: Decimal = buys.iter().map(|t| t.currency_amount).sum();

    let pool = book.pool(&tether());
    assert_eq!(pool.quantity, quantity);
    assert_eq!(pool.weighted_avg_cost, notional / quantity);
}

#[test]
fn test_replay_matches_direct_recomputation() {
    let history = mixed_sequence();

    // Direct recomputation of the same recurrence, kept independent of PoolBook.
    let mut qty = Decimal::zero();
    let mut wac = Decimal::zero();
    for t in &history {
        match t.service_type {
            ServiceType::Buy => {
                let new_qty = qty + t.currency_amount;
                wac = if new_qty > Decimal::zero() {
                    (qty * wac + t.currency_amount * t.currency_price) / new_qty
                } else {
                    Decimal::zero()
                };
                qty = new_qty;
            }
            ServiceType::Sell => qty = qty - t.currency_amount,
        }
    }

    let pool = PoolBook::from_history(&history).unwrap().pool(&tether());
    assert_eq!(pool.quantity, qty);
    assert_eq!(pool.weighted_avg_cost, wac);
}

#[test]
fn test_replay_is_independent_of_input_order() {
    let history = mixed_sequence();
    let mut reversed = history.clone();
    reversed.reverse();

    assert_eq!(
        PoolBook::from_history(&history).unwrap(),
        PoolBook::from_history(&reversed).unwrap()
    );
}

#[test]
fn test_division_guard_through_zero() {
    let history = vec![
        tx(1, "buy", "3", "100"),
        tx(2, "sell", "10", "120"),
        tx(3, "buy", "7", "130"),
    ];
    let pool = PoolBook::from_history(&history).unwrap().pool(&tether());
    assert_eq!(pool.quantity, Decimal::zero());
    assert_eq!(pool.weighted_avg_cost, Decimal::zero());

    // A later sell then falls back to its own discounted price.
    let mut sell = tx(4, "sell", "1", "200");
    sell.total_amount = d("200");
    let book = PoolBook::from_history(&history).unwrap();
    let valuation = CostingPolicy::default().value(&book, &sell).unwrap();
    assert_eq!(valuation.cost_basis, d("196"));
    assert_eq!(valuation.net_profit, d("4"));
}

#[test]
fn test_short_position_is_permitted() {
    let history = vec![tx(1, "buy", "2", "100"), tx(2, "sell", "5", "100")];
    let pool = PoolBook::from_history(&history).unwrap().pool(&tether());
    assert_eq!(pool.quantity, d("-3"));
    assert_eq!(pool.weighted_avg_cost, d("100"));
}
