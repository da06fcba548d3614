//! Shared argument parsing for instants, week starts, and metadata JSON.

use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse an instant: RFC 3339, or a naive `YYYY-MM-DD HH:MM[:SS]` read as
/// UTC.
pub fn parse_instant(input: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Ok(instant.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(naive.and_utc());
        }
    }
    anyhow::bail!("invalid instant '{input}': expected RFC 3339 or 'YYYY-MM-DD HH:MM'")
}

/// Parse a week start date (`YYYY-MM-DD`).
pub fn parse_week(input: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("invalid week start '{input}': expected YYYY-MM-DD"))
}

/// Parse a `--metadata` argument into a JSON object map.
pub fn parse_metadata(
    input: &str,
) -> anyhow::Result<serde_json::Map<String, serde_json::Value>> {
    match serde_json::from_str(input).context("invalid --metadata JSON")? {
        serde_json::Value::Object(map) => Ok(map),
        _ => anyhow::bail!("--metadata must be a JSON object"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_instants_parse_with_offset() {
        let instant = parse_instant("2025-08-25T10:00:00+02:00").unwrap();
        assert_eq!(instant.to_rfc3339(), "2025-08-25T08:00:00+00:00");
    }

    #[test]
    fn naive_instants_are_read_as_utc() {
        let instant = parse_instant("2025-08-25 10:00").unwrap();
        assert_eq!(instant.to_rfc3339(), "2025-08-25T10:00:00+00:00");
        let with_seconds = parse_instant("2025-08-25 10:00:30").unwrap();
        assert_eq!(with_seconds.to_rfc3339(), "2025-08-25T10:00:30+00:00");
    }

    #[test]
    fn garbage_instant_is_an_error() {
        assert!(parse_instant("next tuesday").is_err());
    }

    #[test]
    fn week_start_parses_plain_date() {
        let week = parse_week("2025-08-25").unwrap();
        assert_eq!(week, NaiveDate::from_ymd_opt(2025, 8, 25).unwrap());
        assert!(parse_week("25/08/2025").is_err());
    }

    #[test]
    fn metadata_must_be_an_object() {
        assert!(parse_metadata(r#"{"room": "A"}"#).is_ok());
        assert!(parse_metadata(r#"["a"]"#).is_err());
        assert!(parse_metadata("notjson").is_err());
    }
}
