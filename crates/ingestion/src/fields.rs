//! Lenient field parsing shared by the source adapters.
//!
//! Upstream feeds disagree on how they encode the same field: numbers arrive
//! as JSON numbers or as strings with thousands separators, booleans as
//! `true`/`"1"`/`"Y"`, and XML-derived documents wrap scalars in
//! `{"value": ...}` objects.

use chrono::NaiveDate;
use insider_core::{Error, Result};
use serde::Deserialize;
use serde_json::Value;

/// A number that may be encoded as a JSON number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum LenientNumber {
    Number(f64),
    Text(String),
}

impl LenientNumber {
    /// Resolve to a float. Blank strings count as missing (0).
    pub(crate) fn resolve(&self, field: &str) -> Result<f64> {
        match self {
            LenientNumber::Number(n) => Ok(*n),
            LenientNumber::Text(raw) => {
                let cleaned: String = raw
                    .trim()
                    .chars()
                    .filter(|c| !matches!(c, ',' | '$' | '_'))
                    .collect();
                if cleaned.is_empty() {
                    return Ok(0.0);
                }
                cleaned
                    .parse::<f64>()
                    .map_err(|_| Error::malformed(format!("{field} is not numeric: {raw:?}")))
            }
        }
    }
}

/// Resolve an optional number, defaulting to 0 when absent.
pub(crate) fn number_or_zero(value: Option<&LenientNumber>, field: &str) -> Result<f64> {
    value.map_or(Ok(0.0), |n| n.resolve(field))
}

/// A boolean that may be encoded as a bool, a number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Flag {
    Bool(bool),
    Number(i64),
    Text(String),
}

impl Flag {
    pub(crate) fn is_set(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Number(n) => *n != 0,
            Flag::Text(s) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "y" | "yes" | "x"
            ),
        }
    }
}

pub(crate) fn flag_set(flag: Option<&Flag>) -> bool {
    flag.is_some_and(Flag::is_set)
}

/// Scalar that XML-derived documents may wrap as `{"value": ...}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Wrapped<T> {
    Bare(T),
    Object { value: Option<T> },
}

impl<T> Wrapped<T> {
    pub(crate) fn into_inner(self) -> Option<T> {
        match self {
            Wrapped::Bare(v) => Some(v),
            Wrapped::Object { value } => value,
        }
    }

    pub(crate) fn as_inner(&self) -> Option<&T> {
        match self {
            Wrapped::Bare(v) => Some(v),
            Wrapped::Object { value } => value.as_ref(),
        }
    }
}

/// XML-to-JSON converters emit a single child as an object and repeated
/// children as an array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// Parse the calendar date at the start of `YYYY-MM-DD`, RFC 3339 or
/// `YYYY-MM-DD HH:MM:SS` strings. The date is taken as written, without
/// shifting the timezone.
pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let prefix = trimmed.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// Parse a required filing date.
pub(crate) fn require_date(raw: Option<&str>, field: &str) -> Result<NaiveDate> {
    let raw = raw.ok_or_else(|| Error::malformed(format!("missing {field}")))?;
    parse_date(raw).ok_or_else(|| Error::malformed(format!("{field} is not a date: {raw:?}")))
}

/// Normalize an exchange symbol. Placeholder symbols count as missing.
pub(crate) fn clean_ticker(raw: Option<&str>) -> Result<String> {
    let ticker = raw.map(|t| t.trim().to_ascii_uppercase()).unwrap_or_default();
    match ticker.as_str() {
        "" | "NONE" | "N/A" | "NA" | "-" => Err(Error::malformed("missing ticker")),
        _ => Ok(ticker),
    }
}

/// Treat blank strings as absent so a fallback field gets its turn.
pub(crate) fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.trim().is_empty())
}

/// Trimmed name, or the sentinel when missing or blank.
pub(crate) fn clean_name(raw: Option<&str>, unknown: &str) -> String {
    match raw.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => unknown.to_string(),
    }
}

/// Whether any string inside the value references a 10b5-1 trading plan.
pub(crate) fn mentions_trading_plan(value: &Value) -> bool {
    match value {
        Value::String(text) => text_mentions_trading_plan(text),
        Value::Array(items) => items.iter().any(mentions_trading_plan),
        Value::Object(map) => map.values().any(mentions_trading_plan),
        _ => false,
    }
}

fn text_mentions_trading_plan(text: &str) -> bool {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if matches!(c, '\u{2010}'..='\u{2015}') { '-' } else { c })
        .collect::<String>()
        .to_ascii_lowercase();
    compact.contains("10b5-1") || compact.contains("10b-5-1")
}
