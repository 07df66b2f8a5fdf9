//! Normalization of provider payloads into canonical types
//!
//! Alpha Vantage sends numbers as strings and marks unknown values with `"None"` or
//! `"-"`. Required fields that are absent or unparseable fail with
//! `MalformedResponse`; optional ones become `None`, never zero.

pub mod alpha_vantage;
pub mod news;

pub use alpha_vantage::{parse_company_overview, parse_global_quote, parse_indicator};
pub use news::parse_news_articles;

use chrono::NaiveDate;
use std::borrow::Cow;
use serde_json::{Map, Value};

use crate::error::{Result, StockError};

type Object = Map<String, Value>;

/// Textual form of a field; numbers are accepted as well as strings
fn raw_field<'a>(object: &'a Object, field: &str) -> Option<Cow<'a, str>> {
    match object.get(field)? {
        Value::String(s) => Some(Cow::Borrowed(s.trim())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        _ => None,
    }
}

fn is_placeholder(value: &str) -> bool {
    value.is_empty() || value == "-" || value.eq_ignore_ascii_case("none")
}

pub(crate) fn required_str<'a>(object: &'a Object, field: &str, provider: &str) -> Result<&'a str> {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !is_placeholder(value))
        .ok_or_else(|| StockError::malformed(provider, format!("missing field `{field}`")))
}

pub(crate) fn optional_str(object: &Object, field: &str) -> Option<String> {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !is_placeholder(value))
        .map(str::to_string)
}

/// Required decimal; a trailing `%` is stripped
pub(crate) fn required_f64(object: &Object, field: &str, provider: &str) -> Result<f64> {
    let raw = raw_field(object, field)
        .filter(|value| !is_placeholder(value))
        .ok_or_else(|| StockError::malformed(provider, format!("missing field `{field}`")))?;

    parse_decimal(&raw).ok_or_else(|| {
        StockError::malformed(provider, format!("field `{field}` is not a number: {raw}"))
    })
}

/// Optional decimal; placeholders and unparseable text read as `None`
pub(crate) fn optional_f64(object: &Object, field: &str) -> Option<f64> {
    let raw = raw_field(object, field)?;
    if is_placeholder(&raw) {
        return None;
    }

    let parsed = parse_decimal(&raw);
    if parsed.is_none() {
        tracing::debug!(field, value = %raw, "ignoring unparseable optional value");
    }
    parsed
}

pub(crate) fn required_u64(object: &Object, field: &str, provider: &str) -> Result<u64> {
    let raw = raw_field(object, field)
        .ok_or_else(|| StockError::malformed(provider, format!("missing field `{field}`")))?;

    raw.parse().map_err(|_| {
        StockError::malformed(provider, format!("field `{field}` is not an integer: {raw}"))
    })
}

/// `YYYY-MM-DD`, ignoring any time suffix
pub(crate) fn parse_date(raw: &str, provider: &str) -> Result<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|_| StockError::malformed(provider, format!("invalid date: {raw}")))
}

fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim_end_matches('%')
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
