//! Lenient field decoding.
//!
//! Remote rows carry numbers as JSON numbers, numeric strings (sometimes
//! with thousands separators), or junk. Metrics decode to `None` when the
//! value is not a finite number; they never default to `0`.

use serde::{Deserialize, Deserializer, de};
use serde_json::Value;

/// Parse a JSON value as a finite number.
///
/// ```rust
/// # use courtside::types::lenient::parse_number;
/// # use serde_json::json;
/// assert_eq!(parse_number(&json!(1.5)), Some(1.5));
/// assert_eq!(parse_number(&json!("1,234.5")), Some(1234.5));
/// assert_eq!(parse_number(&json!("n/a")), None);
/// assert_eq!(parse_number(&json!(null)), None);
/// ```
pub fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Parse a JSON value as an integer; fractional values are rejected.
pub fn parse_integer(value: &Value) -> Option<i64> {
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    let n = parse_number(value)?;
    (n.fract() == 0.0 && n.abs() < i64::MAX as f64).then_some(n as i64)
}

/// `deserialize_with` adapter for optional metrics.
pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_number))
}

/// `deserialize_with` adapter for optional integer fields.
pub fn integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_integer))
}

/// `deserialize_with` adapter for required positive ids.
pub fn id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match parse_integer(&value) {
        Some(id) if id > 0 => Ok(id),
        _ => Err(de::Error::custom(format!("invalid nba_id: {value}"))),
    }
}

/// `deserialize_with` adapter for optional text; blank strings are absent.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
