//! Numeric-safe conversions for loosely typed payload fields.
//!
//! Brokerage payloads mix numbers, numeric strings, `null` and sentinels like
//! `"N/A"` in the same column. Everything in here degrades to a default
//! instead of failing.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

/// Placeholder written for missing descriptive fields.
pub const NOT_AVAILABLE: &str = "N/A";

fn is_blank(s: &str) -> bool {
    matches!(s.trim(), "" | "None" | "N/A")
}

/// Coerce a payload value to `f64`. Returns `None` for missing, null, blank
/// sentinels and anything that does not parse.
pub fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !is_blank(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

pub fn number_or(value: Option<&Value>, default: f64) -> f64 {
    number(value).unwrap_or(default)
}

/// Integer coercion: numeric coercion followed by truncation toward zero.
pub fn integer_or(value: Option<&Value>, default: i64) -> i64 {
    number(value).map(|v| v.trunc() as i64).unwrap_or(default)
}

/// Descriptive fields pass through verbatim; numbers are rendered as text.
pub fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Parse a strike exactly. The result is normalized so `5000` and `5000.0`
/// compare and hash the same.
pub fn decimal(value: Option<&Value>) -> Option<Decimal> {
    let raw = match value? {
        Value::Number(n) => n.to_string(),
        Value::String(s) if !is_blank(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .ok()
        .map(|d| d.normalize())
}

/// Round to two decimal places, ties to even on the exact binary value.
///
/// Half-cent mids such as `1.125` are common with nickel-wide quotes and land
/// on `1.12`, not `1.13`. Non-finite input is returned unchanged.
pub fn round2(x: f64) -> f64 {
    let Some(d) = Decimal::from_f64_retain(x) else {
        return x;
    };
    let d = d.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    // mantissa / 10^scale is a single correctly rounded division.
    d.mantissa() as f64 / 10f64.powi(d.scale() as i32)
}
