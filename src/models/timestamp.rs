//! Lenient parsing of timestamps supplied by clients.
//!
//! Offline clients serialize dates in whatever shape their platform produces.
//! Every accepted form is normalized to a UTC instant:
//!
//! - RFC 3339 (`2024-01-01T10:00:00Z`, `2024-01-01T12:00:00+02:00`)
//! - naive date-time without offset, read as UTC (`2024-01-01T10:00:00.123`,
//!   `2024-01-01 10:00:00`)
//! - date only, read as UTC midnight (`2024-01-01`)
//! - integer milliseconds since the Unix epoch

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::fmt;

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A client-supplied point in time, normalized to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientTimestamp(pub DateTime<Utc>);

impl ClientTimestamp {
    /// Parses any of the accepted textual forms.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();

        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(Self(parsed.with_timezone(&Utc)));
        }

        for format in NAIVE_DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(Self(Utc.from_utc_datetime(&naive)));
            }
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Self(Utc.from_utc_datetime(&naive)))
    }

    pub fn from_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self)
    }

    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for ClientTimestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

struct ClientTimestampVisitor;

impl<'de> Visitor<'de> for ClientTimestampVisitor {
    type Value = ClientTimestamp;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an ISO 8601 date/time string or epoch milliseconds")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        ClientTimestamp::parse(value)
            .ok_or_else(|| E::custom(format!("unrecognized timestamp `{}`", value)))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        ClientTimestamp::from_millis(value)
            .ok_or_else(|| E::custom(format!("timestamp {} is out of range", value)))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        i64::try_from(value)
            .ok()
            .and_then(ClientTimestamp::from_millis)
            .ok_or_else(|| E::custom(format!("timestamp {} is out of range", value)))
    }
}

impl<'de> Deserialize<'de> for ClientTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ClientTimestampVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_accepted_forms() {
        let cases = [
            ("2024-01-01", utc(2024, 1, 1, 0, 0, 0)),
            ("2024-01-01T10:30:00Z", utc(2024, 1, 1, 10, 30, 0)),
            ("2024-01-01T12:30:00+02:00", utc(2024, 1, 1, 10, 30, 0)),
            ("2024-01-01T10:30:00", utc(2024, 1, 1, 10, 30, 0)),
            ("2024-01-01 10:30:00", utc(2024, 1, 1, 10, 30, 0)),
            ("2024-01-01T10:30", utc(2024, 1, 1, 10, 30, 0)),
            (" 2024-01-01 ", utc(2024, 1, 1, 0, 0, 0)),
        ];

        for (raw, expected) in cases {
            assert_eq!(
                ClientTimestamp::parse(raw).map(ClientTimestamp::into_inner),
                Some(expected),
                "parsing {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_fractional_seconds_are_kept() {
        let parsed = ClientTimestamp::parse("2024-03-05T08:09:10.250").unwrap();
        assert_eq!(parsed.0.timestamp_millis() % 1000, 250);
    }

    #[test]
    fn test_rejected_forms() {
        for raw in ["", "yesterday", "2024-13-01", "2024-02-30", "01/02/2024", "12:00"] {
            assert!(ClientTimestamp::parse(raw).is_none(), "{:?} should be rejected", raw);
        }
    }

    #[test]
    fn test_deserialize_from_json() {
        let from_string: ClientTimestamp = serde_json::from_str("\"2024-01-01\"").unwrap();
        assert_eq!(from_string.0, utc(2024, 1, 1, 0, 0, 0));

        let from_millis: ClientTimestamp = serde_json::from_str("1704067200000").unwrap();
        assert_eq!(from_millis.0, utc(2024, 1, 1, 0, 0, 0));

        assert!(serde_json::from_str::<ClientTimestamp>("\"not a date\"").is_err());
        assert!(serde_json::from_str::<ClientTimestamp>("null").is_err());
        assert!(serde_json::from_str::<ClientTimestamp>("true").is_err());
        assert!(serde_json::from_str::<ClientTimestamp>("1.5").is_err());
    }
}
