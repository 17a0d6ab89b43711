//! Per-field decoders for inbound ledger rows.
//!
//! Spreadsheet cells arrive as strings and API bodies as whatever the caller
//! sent. Identifier and label columns decode with [`text`], so an order id of
//! `"00123"` stays `"00123"`; monetary columns decode with
//! [`decimal_or_zero`] or [`optional_decimal`], which parse strings exactly.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::Decimal;

/// Decode any scalar as text. Numbers keep their literal digits.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

/// Decode a monetary field. Missing, blank and non-numeric values are zero.
pub fn decimal_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => Decimal::parse_cell(&n.to_string())
            .or_else(|| n.as_f64().and_then(Decimal::from_f64))
            .unwrap_or_default(),
        Value::String(s) => Decimal::from_cell(&s),
        _ => Decimal::zero(),
    })
}

/// Decode a derived monetary field that may not have been computed yet.
pub fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => Decimal::parse_cell(&n.to_string()),
        Value::String(s) => Decimal::parse_cell(&s),
        _ => None,
    })
}

/// Decode a yes/no style flag (`true`, `"Yes"`, `"1"`).
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "yes" | "y" | "true" | "1"
        ),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Cells {
        #[serde(default, deserialize_with = "text")]
        label: String,
        #[serde(default, deserialize_with = "decimal_or_zero")]
        amount: Decimal,
        #[serde(default, deserialize_with = "optional_decimal")]
        derived: Option<Decimal>,
        #[serde(default, deserialize_with = "flag")]
        crypto: bool,
    }

    fn cells(value: Value) -> Cells {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_amount_string_becomes_decimal() {
        let c = cells(json!({ "amount": "123.45" }));
        assert_eq!(c.amount, Decimal::from_str_canonical("123.45").unwrap());
    }

    #[test]
    fn test_text_keeps_digits_verbatim() {
        assert_eq!(cells(json!({ "label": "12345" })).label, "12345");
        assert_eq!(cells(json!({ "label": "00123" })).label, "00123");
        assert_eq!(cells(json!({ "label": 98765 })).label, "98765");
        assert_eq!(cells(json!({ "label": null })).label, "");
    }

    #[test]
    fn test_amount_leniency() {
        assert_eq!(cells(json!({ "amount": "" })).amount, Decimal::zero());
        assert_eq!(cells(json!({ "amount": "n/a" })).amount, Decimal::zero());
        assert_eq!(cells(json!({ "amount": 7 })).amount, Decimal::from(7));
        assert_eq!(
            cells(json!({ "amount": "1,250.5" })).amount,
            Decimal::from_str_canonical("1250.5").unwrap()
        );
    }

    #[test]
    fn test_derived_blank_is_none() {
        assert_eq!(cells(json!({ "derived": "" })).derived, None);
        assert_eq!(cells(json!({ "derived": "0" })).derived, Some(Decimal::zero()));
        assert_eq!(cells(json!({})).derived, None);
    }

    #[test]
    fn test_flag_forms() {
        assert!(cells(json!({ "crypto": "Yes" })).crypto);
        assert!(cells(json!({ "crypto": 1 })).crypto);
        assert!(!cells(json!({ "crypto": "No" })).crypto);
        assert!(!cells(json!({ "crypto": "" })).crypto);
    }
}
