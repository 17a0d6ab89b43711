//! Ledger transaction record and its inbound (spreadsheet) form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::coerce;
use crate::domain::primitives::parse_order_date;
use crate::domain::{CurrencySlug, Decimal, LedgerError, OrderId, ServiceType};

/// Sheet header row, columns A..AC, in the order rows are appended.
pub const SHEET_COLUMNS: [&str; 29] = [
    "orderid",
    "orderdate",
    "userid",
    "first_name",
    "last_name",
    "Mobile",
    "Email",
    "service_slug",
    "categories_title",
    "services_type",
    "currency",
    "currencie_slug",
    "Source Wallet Address",
    "Destination Wallet Address",
    "Txid",
    "currency_amount",
    "Is Crypto?",
    "crypto_total_usdt",
    "currency_price",
    "Cost_Basis",
    "Network Wage",
    "ActualNetwork Wage",
    "Fix Wage",
    "Total Amount",
    "Vip Amount",
    "Voucher Amount",
    "Vouchers Code",
    "description",
    "NetProfit",
];

/// A single exchange order as stored in the ledger.
///
/// Serialized keys are the sanitized sheet headers, so a stored document and
/// a row read back from the sheet share the same vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "orderid")]
    pub order_id: OrderId,
    #[serde(rename = "orderdate")]
    pub order_date: DateTime<Utc>,
    #[serde(rename = "userid", default)]
    pub user_id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(rename = "Mobile", default)]
    pub mobile: String,
    #[serde(rename = "Email", default)]
    pub email: String,
    #[serde(default)]
    pub service_slug: String,
    #[serde(default)]
    pub categories_title: String,
    #[serde(rename = "services_type")]
    pub service_type: ServiceType,
    #[serde(default)]
    pub currency: String,
    #[serde(rename = "currencie_slug")]
    pub currency_slug: CurrencySlug,
    #[serde(rename = "Source_Wallet_Address", default)]
    pub source_wallet_address: String,
    #[serde(rename = "Destination_Wallet_Address", default)]
    pub destination_wallet_address: String,
    #[serde(rename = "Txid", default)]
    pub txid: String,
    pub currency_amount: Decimal,
    #[serde(rename = "Is_Crypto?", default)]
    pub is_crypto: bool,
    #[serde(default)]
    pub crypto_total_usdt: Decimal,
    pub currency_price: Decimal,
    #[serde(rename = "Cost_Basis", default)]
    pub cost_basis: Option<Decimal>,
    #[serde(rename = "Network_Wage", default)]
    pub network_wage: Decimal,
    #[serde(rename = "ActualNetwork_Wage", default)]
    pub actual_network_wage: Decimal,
    #[serde(rename = "Fix_Wage", default)]
    pub fix_wage: Decimal,
    #[serde(rename = "Total_Amount", default)]
    pub total_amount: Decimal,
    #[serde(rename = "Vip_Amount", default)]
    pub vip_amount: Decimal,
    #[serde(rename = "Voucher_Amount", default)]
    pub voucher_amount: Decimal,
    #[serde(rename = "Vouchers_Code", default)]
    pub vouchers_code: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "NetProfit", default)]
    pub net_profit: Option<Decimal>,
}

impl Transaction {
    /// Decode an inbound JSON object (sheet row or API body).
    ///
    /// Each field decides for itself: identifier and label columns keep their
    /// text verbatim, monetary columns parse strings as exact decimals.
    ///
    /// # Errors
    /// Returns `InvalidServiceType` or `InvalidOrderDate` for unusable core
    /// fields and `Decode` when the value is not an object.
    pub fn from_json(value: Value) -> Result<Self, LedgerError> {
        if !value.is_object() {
            return Err(LedgerError::Decode("expected a JSON object".to_string()));
        }
        let row: TransactionRow =
            serde_json::from_value(value).map_err(|e| LedgerError::Decode(e.to_string()))?;
        Transaction::try_from(row)
    }

    /// Whether both derived fields have been filled in.
    pub fn is_enriched(&self) -> bool {
        self.cost_basis.is_some() && self.net_profit.is_some()
    }

    /// Render the transaction as a sheet row matching [`SHEET_COLUMNS`].
    pub fn to_sheet_row(&self) -> Vec<String> {
        let money = |d: &Decimal| d.to_canonical_string();
        vec![
            self.order_id.as_str().to_string(),
            self.order_date.to_rfc3339(),
            self.user_id.clone(),
            self.first_name.clone(),
            self.last_name.clone(),
            self.mobile.clone(),
            self.email.clone(),
            self.service_slug.clone(),
            self.categories_title.clone(),
            self.service_type.to_string(),
            self.currency.clone(),
            self.currency_slug.as_str().to_string(),
            self.source_wallet_address.clone(),
            self.destination_wallet_address.clone(),
            self.txid.clone(),
            money(&self.currency_amount),
            if self.is_crypto { "Yes" } else { "No" }.to_string(),
            money(&self.crypto_total_usdt),
            money(&self.currency_price),
            money(&self.cost_basis.unwrap_or_default()),
            money(&self.network_wage),
            money(&self.actual_network_wage),
            money(&self.fix_wage),
            money(&self.total_amount),
            money(&self.vip_amount),
            money(&self.voucher_amount),
            self.vouchers_code.clone(),
            self.description.clone(),
            money(&self.net_profit.unwrap_or_default()),
        ]
    }
}

/// Inbound transaction as it arrives from the sheet or an HTTP caller.
///
/// Accepts both raw header names (`Vip Amount`) and sanitized ones
/// (`Vip_Amount`); every field is optional at this stage.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransactionRow {
    #[serde(alias = "order_id", deserialize_with = "coerce::text")]
    pub orderid: String,
    #[serde(alias = "order_date", deserialize_with = "coerce::text")]
    pub orderdate: String,
    #[serde(alias = "user_id", deserialize_with = "coerce::text")]
    pub userid: String,
    #[serde(deserialize_with = "coerce::text")]
    pub first_name: String,
    #[serde(deserialize_with = "coerce::text")]
    pub last_name: String,
    #[serde(rename = "Mobile", alias = "mobile", deserialize_with = "coerce::text")]
    pub mobile: String,
    #[serde(rename = "Email", alias = "email", deserialize_with = "coerce::text")]
    pub email: String,
    #[serde(deserialize_with = "coerce::text")]
    pub service_slug: String,
    #[serde(deserialize_with = "coerce::text")]
    pub categories_title: String,
    #[serde(alias = "service_type", deserialize_with = "coerce::text")]
    pub services_type: String,
    #[serde(deserialize_with = "coerce::text")]
    pub currency: String,
    #[serde(alias = "currency_slug", deserialize_with = "coerce::text")]
    pub currencie_slug: String,
    #[serde(
        rename = "Source_Wallet_Address",
        alias = "Source Wallet Address",
        deserialize_with = "coerce::text"
    )]
    pub source_wallet_address: String,
    #[serde(
        rename = "Destination_Wallet_Address",
        alias = "Destination Wallet Address",
        deserialize_with = "coerce::text"
    )]
    pub destination_wallet_address: String,
    #[serde(rename = "Txid", alias = "txid", deserialize_with = "coerce::text")]
    pub txid: String,
    #[serde(deserialize_with = "coerce::decimal_or_zero")]
    pub currency_amount: Decimal,
    #[serde(rename = "Is_Crypto?", alias = "Is Crypto?", deserialize_with = "coerce::flag")]
    pub is_crypto: bool,
    #[serde(deserialize_with = "coerce::decimal_or_zero")]
    pub crypto_total_usdt: Decimal,
    #[serde(deserialize_with = "coerce::decimal_or_zero")]
    pub currency_price: Decimal,
    #[serde(
        rename = "Cost_Basis",
        alias = "Cost Basis",
        deserialize_with = "coerce::optional_decimal"
    )]
    pub cost_basis: Option<Decimal>,
    #[serde(
        rename = "Network_Wage",
        alias = "Network Wage",
        deserialize_with = "coerce::decimal_or_zero"
    )]
    pub network_wage: Decimal,
    #[serde(
        rename = "ActualNetwork_Wage",
        alias = "ActualNetwork Wage",
        deserialize_with = "coerce::decimal_or_zero"
    )]
    pub actual_network_wage: Decimal,
    #[serde(
        rename = "Fix_Wage",
        alias = "Fix Wage",
        deserialize_with = "coerce::decimal_or_zero"
    )]
    pub fix_wage: Decimal,
    #[serde(
        rename = "Total_Amount",
        alias = "Total Amount",
        deserialize_with = "coerce::decimal_or_zero"
    )]
    pub total_amount: Decimal,
    #[serde(
        rename = "Vip_Amount",
        alias = "Vip Amount",
        deserialize_with = "coerce::decimal_or_zero"
    )]
    pub vip_amount: Decimal,
    #[serde(
        rename = "Voucher_Amount",
        alias = "Voucher Amount",
        deserialize_with = "coerce::decimal_or_zero"
    )]
    pub voucher_amount: Decimal,
    #[serde(
        rename = "Vouchers_Code",
        alias = "Vouchers Code",
        deserialize_with = "coerce::text"
    )]
    pub vouchers_code: String,
    #[serde(deserialize_with = "coerce::text")]
    pub description: String,
    #[serde(
        rename = "NetProfit",
        alias = "Net Profit",
        deserialize_with = "coerce::optional_decimal"
    )]
    pub net_profit: Option<Decimal>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = LedgerError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let service_type = row.services_type.parse::<ServiceType>()?;
        let order_date = parse_order_date(&row.orderdate)?;

        Ok(Transaction {
            order_id: OrderId::new(row.orderid),
            order_date,
            user_id: row.userid,
            first_name: row.first_name,
            last_name: row.last_name,
            mobile: row.mobile,
            email: row.email,
            service_slug: row.service_slug,
            categories_title: row.categories_title,
            service_type,
            currency: row.currency,
            currency_slug: CurrencySlug::new(row.currencie_slug),
            source_wallet_address: row.source_wallet_address,
            destination_wallet_address: row.destination_wallet_address,
            txid: row.txid,
            currency_amount: row.currency_amount,
            is_crypto: row.is_crypto,
            crypto_total_usdt: row.crypto_total_usdt,
            currency_price: row.currency_price,
            cost_basis: row.cost_basis,
            network_wage: row.network_wage,
            actual_network_wage: row.actual_network_wage,
            fix_wage: row.fix_wage,
            total_amount: row.total_amount,
            vip_amount: row.vip_amount,
            voucher_amount: row.voucher_amount,
            vouchers_code: row.vouchers_code,
            description: row.description,
            net_profit: row.net_profit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_from_json_with_raw_header_names() {
        let tx = Transaction::from_json(json!({
            "orderid": "00123",
            "orderdate": "2024-01-02 10:00:00",
            "services_type": "sell",
            "currencie_slug": "tether",
            "currency_amount": "4",
            "currency_price": "150",
            "Total Amount": "600",
            "ActualNetwork Wage": "5",
            "Mobile": "09121234567",
            "Is Crypto?": "Yes",
        }))
        .unwrap();

        assert_eq!(tx.order_id.as_str(), "00123");
        assert_eq!(tx.mobile, "09121234567");
        assert_eq!(tx.service_type, ServiceType::Sell);
        assert_eq!(tx.currency_slug.as_str(), "tether");
        assert_eq!(tx.currency_amount, d("4"));
        assert_eq!(tx.total_amount, d("600"));
        assert_eq!(tx.actual_network_wage, d("5"));
        assert!(tx.is_crypto);
        assert_eq!(
            tx.order_date,
            Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap()
        );
        assert!(tx.cost_basis.is_none());
        assert!(!tx.is_enriched());
    }

    #[test]
    fn test_from_json_with_sanitized_header_names() {
        let tx = Transaction::from_json(json!({
            "orderid": 98765,
            "orderdate": "2024-01-02T10:00:00Z",
            "services_type": "buy",
            "currencie_slug": "bitcoin",
            "currency_amount": 0.5,
            "currency_price": "60000",
            "Vip_Amount": "12",
            "Fix_Wage": "3",
            "Network_Wage": "not a number",
        }))
        .unwrap();

        assert_eq!(tx.order_id.as_str(), "98765");
        assert_eq!(tx.currency_amount, d("0.5"));
        assert_eq!(tx.vip_amount, d("12"));
        assert_eq!(tx.fix_wage, d("3"));
        assert_eq!(tx.network_wage, Decimal::zero());
        assert!(!tx.is_crypto);
    }

    #[test]
    fn test_from_json_invalid_service_type() {
        let err = Transaction::from_json(json!({
            "orderid": "1",
            "orderdate": "2024-01-02",
            "services_type": "transfer",
            "currencie_slug": "tether",
        }))
        .unwrap_err();
        assert_eq!(err, LedgerError::InvalidServiceType("transfer".to_string()));
    }

    #[test]
    fn test_from_json_missing_date() {
        let err = Transaction::from_json(json!({
            "orderid": "1",
            "services_type": "buy",
            "currencie_slug": "tether",
        }))
        .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidOrderDate(_)));
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let err = Transaction::from_json(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, LedgerError::Decode(_)));
    }

    #[test]
    fn test_storage_round_trip_uses_sanitized_keys() {
        let tx = Transaction::from_json(json!({
            "orderid": "7",
            "orderdate": "2024-05-01T08:00:00Z",
            "services_type": "buy",
            "currencie_slug": "tether",
            "currency_amount": "10",
            "currency_price": "100",
            "Vip Amount": "2.5",
        }))
        .unwrap();

        let stored = serde_json::to_value(&tx).unwrap();
        assert_eq!(stored["Vip_Amount"], json!(2.5));
        assert_eq!(stored["orderid"], json!("7"));
        assert_eq!(stored["services_type"], json!("buy"));
        assert!(stored["Cost_Basis"].is_null());

        let back: Transaction = serde_json::from_value(stored).unwrap();
        assert_eq!(back, tx);
    }

    #[test]
    fn test_sheet_row_layout() {
        let mut tx = Transaction::from_json(json!({
            "orderid": "55",
            "orderdate": "2024-05-01T08:00:00Z",
            "services_type": "sell",
            "currencie_slug": "tether",
            "currency_amount": "4",
            "currency_price": "150",
            "Is Crypto?": true,
        }))
        .unwrap();
        tx.cost_basis = Some(d("100"));
        tx.net_profit = Some(d("195"));

        let row = tx.to_sheet_row();
        assert_eq!(row.len(), SHEET_COLUMNS.len());
        assert_eq!(row[0], "55");
        assert_eq!(row[1], "2024-05-01T08:00:00+00:00");
        assert_eq!(row[9], "sell");
        assert_eq!(row[11], "tether");
        assert_eq!(row[16], "Yes");
        assert_eq!(row[19], "100");
        assert_eq!(row[28], "195");
    }

    #[test]
    fn test_amount_strings_decode_exactly() {
        let tx = Transaction::from_json(json!({
            "orderid": "1",
            "orderdate": "2024-05-01T08:00:00Z",
            "services_type": "buy",
            "currencie_slug": "tether",
            "currency_amount": "12345678901234.56789",
            "currency_price": "0.123456789012345678",
            "Total Amount": "1234567890123456789",
        }))
        .unwrap();

        assert_eq!(tx.currency_amount, d("12345678901234.56789"));
        assert_eq!(tx.currency_price, d("0.123456789012345678"));
        assert_eq!(tx.total_amount, d("1234567890123456789"));
        assert_eq!(tx.to_sheet_row()[15], "12345678901234.56789");
    }

    #[test]
    fn test_text_columns_keep_numeric_looking_values() {
        let tx = Transaction::from_json(json!({
            "orderid": "12345",
            "orderdate": "2024-05-01T08:00:00Z",
            "userid": "0042",
            "first_name": "007",
            "Mobile": "09120000000",
            "Email": "1",
            "services_type": "buy",
            "currencie_slug": "100",
            "Source Wallet Address": "0x00ff",
            "Txid": "000123",
            "Vouchers Code": "0099",
            "description": "42",
            "currency_amount": "123.45",
        }))
        .unwrap();

        assert_eq!(tx.order_id.as_str(), "12345");
        assert_eq!(tx.user_id, "0042");
        assert_eq!(tx.first_name, "007");
        assert_eq!(tx.mobile, "09120000000");
        assert_eq!(tx.email, "1");
        assert_eq!(tx.currency_slug.as_str(), "100");
        assert_eq!(tx.source_wallet_address, "0x00ff");
        assert_eq!(tx.txid, "000123");
        assert_eq!(tx.vouchers_code, "0099");
        assert_eq!(tx.description, "42");
        assert_eq!(tx.currency_amount, d("123.45"));
    }
}
