//! Timestamp utilities
//!
//! Timestamps are written as RFC 3339. Records produced by older collectors
//! carry naive local timestamps ("2024-03-01 14:05:00" or ISO-8601 without an
//! offset); those are read as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};

const LEGACY_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Parse an RFC 3339 timestamp, falling back to the naive legacy layouts
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    LEGACY_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// Serde adapter for required timestamps
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| de::Error::custom(format!("unrecognized timestamp '{}'", raw)))
    }
}

/// Serde adapter for optional timestamps
pub mod optional_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => super::timestamp::serialize(ts, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => super::parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("unrecognized timestamp '{}'", raw))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let ts = parse_timestamp("2024-05-10T08:30:00+02:00").unwrap();
        assert_eq!(ts.hour(), 6);
        assert_eq!(ts.day(), 10);
    }

    #[test]
    fn test_parse_legacy_space_separated() {
        let ts = parse_timestamp("2024-03-01 14:05:00").unwrap();
        assert_eq!(ts.year(), 2024);
        assert_eq!(ts.hour(), 14);
        assert_eq!(ts.minute(), 5);
    }

    #[test]
    fn test_parse_legacy_iso_with_fraction() {
        let ts = parse_timestamp("2025-01-01T12:34:56.123456").unwrap();
        assert_eq!(ts.second(), 56);
        assert_eq!(ts.timestamp_subsec_micros(), 123_456);
    }

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Stamped {
        #[serde(with = "timestamp")]
        at: DateTime<Utc>,
        #[serde(with = "optional_timestamp")]
        annotated_at: Option<DateTime<Utc>>,
    }

    #[test]
    fn test_written_timestamp_reads_back_exactly() {
        let at = now();
        let value = Stamped {
            at,
            annotated_at: Some(at),
        };

        let json = serde_json::to_string(&value).unwrap();
        let back: Stamped = serde_json::from_str(&json).unwrap();

        assert_eq!(back, value);
        assert_eq!(back.at.timestamp_subsec_nanos(), at.timestamp_subsec_nanos());
    }

    #[test]
    fn test_whole_second_timestamp_has_no_fraction() {
        let at = parse_timestamp("2024-01-15T10:00:00Z").unwrap();
        let json = serde_json::to_string(&Stamped { at, annotated_at: None }).unwrap();
        assert!(json.contains("\"2024-01-15T10:00:00Z\""));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }
}
