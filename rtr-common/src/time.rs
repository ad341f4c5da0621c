//! Timestamp utilities

use chrono::{DateTime, NaiveDate, Utc};

use crate::{Error, Result};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Parse a stored RFC 3339 timestamp
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse timestamp {:?}: {}", s, e)))
}

/// Parse an optional stored RFC 3339 timestamp
pub fn parse_optional_timestamp(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
    s.as_deref().map(parse_timestamp).transpose()
}

/// Parse a stored `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| Error::Internal(format!("Failed to parse date {:?}: {}", s, e)))
}

/// Millisecond timestamp used to derive dedupe keys
pub fn epoch_millis(dt: &DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let ts = now();
        let parsed = parse_timestamp(&ts.to_rfc3339()).unwrap();
        assert_eq!(parsed, ts);
    }

    #[test]
    fn test_parse_optional_timestamp_none() {
        assert!(parse_optional_timestamp(None).unwrap().is_none());
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("2025-10-31").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 10, 31).unwrap());
        assert!(parse_date("31/10/2025").is_err());
    }
}
