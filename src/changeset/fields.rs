//! Attribute coercion.
//!
//! Every helper either returns a typed value or a [`MalformedRecordError`]
//! naming the column and the raw text it rejected.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::config::TIMESTAMP_FORMAT;
use crate::error_handling::MalformedRecordError;

use super::{Column, RawAttributes};

/// Raw text of a required attribute.
pub(super) fn required(attrs: &RawAttributes, column: Column) -> Result<&str, MalformedRecordError> {
    attrs
        .get(column.as_str())
        .map(String::as_str)
        .ok_or(MalformedRecordError::Missing {
            field: column.as_str(),
        })
}

/// Raw text of an optional attribute. Empty text counts as absent.
pub(super) fn optional(attrs: &RawAttributes, column: Column) -> Option<&str> {
    attrs
        .get(column.as_str())
        .map(String::as_str)
        .filter(|raw| !raw.is_empty())
}

pub(super) fn parse_number<T>(column: Column, raw: &str) -> Result<T, MalformedRecordError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| invalid(column, raw, e.to_string()))
}

/// Parses a signed integer that must not be negative.
pub(super) fn parse_non_negative(column: Column, raw: &str) -> Result<i64, MalformedRecordError> {
    let value: i64 = parse_number(column, raw)?;
    if value < 0 {
        return Err(invalid(column, raw, "must not be negative".to_string()));
    }
    Ok(value)
}

/// Parses a coordinate. `NaN` and infinities parse as `f64` but are not
/// coordinates, so they are rejected here.
pub(super) fn parse_coordinate(column: Column, raw: &str) -> Result<f64, MalformedRecordError> {
    let value: f64 = parse_number(column, raw)?;
    if !value.is_finite() {
        return Err(invalid(column, raw, "not a finite number".to_string()));
    }
    Ok(value)
}

pub(super) fn parse_timestamp(
    column: Column,
    raw: &str,
) -> Result<DateTime<Utc>, MalformedRecordError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| {
            invalid(
                column,
                raw,
                format!("{e} (expected YYYY-MM-DDTHH:MM:SSZ)"),
            )
        })
}

pub(super) fn invalid(column: Column, raw: &str, reason: String) -> MalformedRecordError {
    MalformedRecordError::Invalid {
        field: column.as_str(),
        value: raw.to_string(),
        reason,
    }
}
