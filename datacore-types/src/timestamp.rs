//! Immutable temporal values.
//!
//! Timestamps keep the UTC offset they were parsed with and always render in
//! the RFC 3339 extended form (millisecond precision, `+hh:mm` offset), e.g.
//! `2024-01-01T00:00:00.000+00:00`.

use crate::{Error, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Output format: RFC 3339 with milliseconds and a colon-separated offset.
const RFC3339_EXTENDED: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

/// Offset-carrying layouts accepted besides strict RFC 3339.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Layouts without an offset; these are read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// An immutable point in time with its original UTC offset.
///
/// Equality and ordering compare the instant, so `10:00+02:00` equals
/// `08:00Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    /// Creates a timestamp at the current time (UTC).
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now().fixed_offset())
    }

    /// Wraps an existing chrono value.
    #[must_use]
    pub const fn from_datetime(datetime: DateTime<FixedOffset>) -> Self {
        Self(datetime)
    }

    /// Parses a timestamp from the string forms remote APIs emit.
    ///
    /// Accepts RFC 3339 (with or without fractional seconds), the same with a
    /// space separator or a colon-less offset, offset-free date-times (read as
    /// UTC) and bare `YYYY-MM-DD` dates (midnight UTC).
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();

        if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self(datetime));
        }

        for format in OFFSET_FORMATS {
            if let Ok(datetime) = DateTime::parse_from_str(trimmed, format) {
                return Ok(Self(datetime));
            }
        }

        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(Self(naive.and_utc().fixed_offset()));
            }
        }

        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Self(naive.and_utc().fixed_offset()))
            .ok_or_else(|| Error::InvalidTimestamp(input.to_string()))
    }

    /// Returns the underlying chrono value.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<FixedOffset> {
        &self.0
    }

    /// Returns the instant converted to UTC.
    #[must_use]
    pub fn to_utc(&self) -> DateTime<Utc> {
        self.0.with_timezone(&Utc)
    }

    /// Renders the RFC 3339 extended form, e.g. `2024-01-01T00:00:00.000+00:00`.
    #[must_use]
    pub fn to_rfc3339_extended(&self) -> String {
        self.0.format(RFC3339_EXTENDED).to_string()
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(datetime: DateTime<FixedOffset>) -> Self {
        Self(datetime)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self(datetime.fixed_offset())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339_extended())
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339_extended())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
