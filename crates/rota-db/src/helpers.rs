//! Row-to-entity parsing helpers.
//!
//! Every repo needs to convert `libsql::Row` (column-indexed) into typed
//! entity structs. These helpers isolate the parsing logic and handle the
//! dual datetime format issue (`SQLite`'s `datetime('now')` vs Rust's
//! `to_rfc3339()`).

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::StoreError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2025-08-25T14:00:00+00:00"`) and `SQLite`'s
/// default format (`"2025-08-25 14:00:00"`).
///
/// # Errors
///
/// Returns `StoreError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| StoreError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with all rota-core enums that use `#[serde(rename_all = "snake_case")]`.
///
/// # Errors
///
/// Returns `StoreError::Query` if the string does not match any enum variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, StoreError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| StoreError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty
/// string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
/// You must use `get::<Option<String>>()` for nullable columns.
///
/// # Errors
///
/// Returns `StoreError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, StoreError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Extract an optional JSON value from a TEXT column.
///
/// # Errors
///
/// Returns `StoreError::Query` if a non-empty string contains invalid JSON.
pub fn parse_optional_json(
    s: Option<&str>,
) -> Result<Option<serde_json::Value>, StoreError> {
    match s {
        Some(s) if !s.is_empty() => {
            let val = serde_json::from_str(s)
                .map_err(|e| StoreError::Query(format!("Invalid JSON in column: {e}")))?;
            Ok(Some(val))
        }
        _ => Ok(None),
    }
}

/// Parse a JSON object column into a `serde_json::Map` (the event metadata
/// column). NULL and empty both parse as an empty map.
///
/// # Errors
///
/// Returns `StoreError::Query` if the column holds invalid JSON or a
/// non-object value.
pub fn parse_json_map(
    s: Option<&str>,
) -> Result<serde_json::Map<String, serde_json::Value>, StoreError> {
    match parse_optional_json(s)? {
        None => Ok(serde_json::Map::new()),
        Some(serde_json::Value::Object(map)) => Ok(map),
        Some(other) => Err(StoreError::Query(format!(
            "Expected JSON object in column, got: {other}"
        ))),
    }
}

/// Half-open UTC window covering one calendar week: `[start, start + 7 days)`.
///
/// Instants are compared through `datetime()` in SQL, so an event starting
/// any time on the week's last day falls inside the window.
#[must_use]
pub fn week_window(week_start: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = week_start.and_time(chrono::NaiveTime::MIN).and_utc();
    (start, start + chrono::Duration::days(7))
}
