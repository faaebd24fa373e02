//! Internal helpers for input validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! parsing and mapping logic so every operation enforces the same rules.

use chrono::NaiveDate;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a strict `YYYY-MM-DD` date.
pub(crate) fn parse_date(value: &str, label: &str) -> ResultEngine<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::MissingField(format!("{label} is required")));
    }
    // chrono accepts unpadded fields, the wire format does not.
    if trimmed.len() != 10 {
        return Err(EngineError::InvalidField(format!(
            "{label} must be YYYY-MM-DD"
        )));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| EngineError::InvalidField(format!("{label} must be YYYY-MM-DD")))
}

/// Parse an optional date; `None` and blank strings are both absent.
pub(crate) fn parse_optional_date(
    value: Option<&str>,
    label: &str,
) -> ResultEngine<Option<NaiveDate>> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        Some(v) => parse_date(v, label).map(Some),
        None => Ok(None),
    }
}

/// Parse a strictly positive amount.
pub(crate) fn parse_positive_amount(value: &str, label: &str) -> ResultEngine<Money> {
    let amount: Money = value.parse()?;
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount(format!("{label} must be > 0")));
    }
    Ok(amount)
}

/// Trim a required text field.
pub(crate) fn required_text(value: Option<&str>, label: &str) -> ResultEngine<String> {
    normalize_optional_text(value)
        .ok_or_else(|| EngineError::MissingField(format!("{label} is required")))
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Collapse inner whitespace of a display name.
pub(crate) fn normalize_display(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Accent- and case-insensitive key used for uniqueness of names.
///
/// `"  Agua   Potáble "` and `"agua potable"` share the key `"agua potable"`.
pub(crate) fn normalize_key(input: &str) -> String {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in input.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidField(format!("invalid {label} id")))
}
