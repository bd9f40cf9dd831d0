//! Wire timestamp handling.
//!
//! Every timestamp that crosses the API or store boundary uses the fixed
//! `%Y-%m-%dT%H:%M:%SZ` format, whole seconds in UTC. Cosmos documents store
//! timestamps as strings in this format, so range queries compare
//! lexicographically; the format must stay zero-padded and second-granular.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Timestamp format used on the wire and in stored documents.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Format a UTC instant in the wire format.
pub fn format_utc(dt: &DateTime<Utc>) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Parse a wire-format timestamp into a UTC instant.
pub fn parse_utc(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).map(|naive| naive.and_utc())
}

/// Serde adapter for `DateTime<Utc>` fields in the wire format.
///
/// Usage: `#[serde(with = "occu_models::time::utc_second")]`.
pub mod utc_second {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_utc(dt))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_utc(&s).map_err(serde::de::Error::custom)
    }
}
