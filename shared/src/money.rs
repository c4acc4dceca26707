//! Money parsing and calculation utilities using rust_decimal
//!
//! All monetary arithmetic is done in `Decimal`, converted to `f64`
//! only at the serialization boundary. The backend transmits monetary
//! fields inconsistently as strings or numbers, so parsing is lenient
//! by design: anything that does not parse becomes zero, never an
//! error.

use rust_decimal::prelude::*;
use serde::Deserialize;
use serde_json::Value;

/// Rounding for monetary values (2 decimal places, half-up)
pub const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Convert f64 to Decimal for calculation
///
/// Non-finite input is logged and zeroed rather than propagated into
/// financial arithmetic.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// Parse a JSON value as a currency amount, or zero
///
/// Accepts numbers and numeric strings (with surrounding whitespace).
/// Everything else, including null and absent fields, is 0.0. This is
/// intentionally lenient: the bill is recomputed defensively on every
/// input change and a malformed field must not poison the total.
pub fn parse_or_zero(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Serde deserializer for lenient monetary fields
///
/// Usage: `#[serde(deserialize_with = "shared::money::lenient_f64", default)]`
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_or_zero(&value))
}

/// Compare two monetary values for equality (within 0.01 tolerance)
pub fn money_eq(a: f64, b: f64) -> bool {
    let diff = (to_decimal(a) - to_decimal(b)).abs();
    diff < MONEY_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_decimal_precision() {
        // Classic floating point problem: 0.1 + 0.2 != 0.3
        let sum_dec = to_decimal(0.1) + to_decimal(0.2);
        assert_eq!(to_f64(sum_dec), 0.3);
    }

    #[test]
    fn test_parse_or_zero_number() {
        assert_eq!(parse_or_zero(&json!(42.5)), 42.5);
        assert_eq!(parse_or_zero(&json!(0)), 0.0);
    }

    #[test]
    fn test_parse_or_zero_numeric_string() {
        assert_eq!(parse_or_zero(&json!("199.99")), 199.99);
        assert_eq!(parse_or_zero(&json!(" 20 ")), 20.0);
    }

    #[test]
    fn test_parse_or_zero_garbage() {
        assert_eq!(parse_or_zero(&json!(null)), 0.0);
        assert_eq!(parse_or_zero(&json!("abc")), 0.0);
        assert_eq!(parse_or_zero(&json!([1, 2])), 0.0);
        assert_eq!(parse_or_zero(&json!({"amount": 5})), 0.0);
    }

    #[test]
    fn test_lenient_field_roundtrip() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(deserialize_with = "lenient_f64", default)]
            amount: f64,
        }

        let a: Row = serde_json::from_value(json!({"amount": "12.50"})).unwrap();
        assert_eq!(a.amount, 12.5);
        let b: Row = serde_json::from_value(json!({"amount": 12.5})).unwrap();
        assert_eq!(b.amount, 12.5);
        let c: Row = serde_json::from_value(json!({"amount": null})).unwrap();
        assert_eq!(c.amount, 0.0);
        let d: Row = serde_json::from_value(json!({})).unwrap();
        assert_eq!(d.amount, 0.0);
    }

    #[test]
    fn test_money_eq_tolerance() {
        assert!(money_eq(10.004, 10.0));
        assert!(!money_eq(10.02, 10.0));
    }
}
