//! Numeric token recognition shared by the scalar and list coercers.
//!
//! String-to-number coercion goes through anchored regexes rather than bare
//! `str::parse`, because `f64::from_str` happily accepts `inf`, `NaN` and
//! friends that must never count as numeric payload tokens.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static INT_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?[0-9]+$").unwrap());

static FLOAT_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?$").unwrap());

/// Integer interpretation of a raw value: integers, integer-valued floats
/// (`3.0` counts), and integer-shaped strings. Fractional values and
/// fractional strings are rejected, as is anything out of `i64` range.
pub(crate) fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            if let Some(u) = n.as_u64() {
                return i64::try_from(u).ok();
            }
            let f = n.as_f64()?;
            if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                Some(f as i64)
            } else {
                None
            }
        }
        Value::String(s) if INT_TOKEN.is_match(s) => s.parse().ok(),
        _ => None,
    }
}

/// Float interpretation: any number, or any numeric string.
pub(crate) fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if FLOAT_TOKEN.is_match(s) => s.parse().ok(),
        _ => None,
    }
}
