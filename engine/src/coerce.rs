//! Lenient decoding of form-entered values.
//!
//! Sheets are filled in by hand, so numeric fields arrive as numbers, numeric
//! strings, partially numeric strings ("15 (base)") or garbage. Each field has
//! a documented fallback instead of failing the whole record.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub(crate) const DEFAULT_SCORE: i32 = 10;
pub(crate) const MIN_LEVEL: i32 = 1;

/// Leading-integer parse: optional sign followed by digits, leading whitespace
/// ignored, anything after the digits ignored. `None` when no digits lead.
pub(crate) fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = rest
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    rest[..end].parse::<i64>().ok().map(|n| sign * n)
}

pub(crate) fn int_from_value(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => parse_int_prefix(s),
        _ => None,
    }
}

fn saturate(n: i64) -> i32 {
    n.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

pub(crate) fn score_from_str(s: &str) -> i32 {
    parse_int_prefix(s).map(saturate).unwrap_or(DEFAULT_SCORE)
}

pub(crate) fn level_from_str(s: &str) -> Option<i32> {
    parse_int_prefix(s).map(saturate)
}

pub(crate) fn charges_from_i64(n: i64) -> u32 {
    n.clamp(0, u32::MAX as i64) as u32
}

pub(crate) fn score<'de, D: Deserializer<'de>>(d: D) -> Result<i32, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(int_from_value(&v).map(saturate).unwrap_or(DEFAULT_SCORE))
}

pub(crate) fn level<'de, D: Deserializer<'de>>(d: D) -> Result<i32, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(int_from_value(&v)
        .map(saturate)
        .unwrap_or(MIN_LEVEL)
        .max(MIN_LEVEL))
}

pub(crate) fn charges<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(int_from_value(&v).map(charges_from_i64).unwrap_or(0))
}

/// Display-only fields keep whatever text was typed; numbers become their
/// decimal text.
pub(crate) fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

/// List entries were once stored as their display text; a bare string becomes
/// an entry with that name.
pub(crate) fn entry_list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + From<String>,
{
    let raw = Option::<Vec<Value>>::deserialize(d)?.unwrap_or_default();
    raw.into_iter()
        .map(|v| match v {
            Value::String(s) => Ok(T::from(s)),
            other => serde_json::from_value(other).map_err(D::Error::custom),
        })
        .collect()
}

pub(crate) fn default_score() -> i32 {
    DEFAULT_SCORE
}

pub(crate) fn default_level() -> i32 {
    MIN_LEVEL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_prefix_matches_form_parsing() {
        assert_eq!(parse_int_prefix("15"), Some(15));
        assert_eq!(parse_int_prefix("  -3"), Some(-3));
        assert_eq!(parse_int_prefix("+4"), Some(4));
        assert_eq!(parse_int_prefix("12 (racial)"), Some(12));
        assert_eq!(parse_int_prefix("abc"), None);
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("-"), None);
    }

    #[test]
    fn floats_truncate_toward_zero() {
        assert_eq!(int_from_value(&serde_json::json!(15.7)), Some(15));
        assert_eq!(int_from_value(&serde_json::json!(-1.5)), Some(-1));
        assert_eq!(int_from_value(&serde_json::json!(null)), None);
    }
}
