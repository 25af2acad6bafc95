//! The "modified since" pagination cursor and timestamp helpers.
//!
//! The vendor API accepts and returns ISO-8601 UTC timestamps in several
//! spellings (`Z` or `+00:00`, with or without fractional seconds, sometimes
//! without any offset). [`parse_timestamp`] accepts all of them;
//! [`format_api_timestamp`] always produces the millisecond `Z` form the API
//! expects in `modifiedFromUtc`.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// `2024-01-02T03:04:05.678Z`
pub const API_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parse a vendor timestamp. Offset-less values are taken as UTC and a bare
/// date is taken as midnight UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Format a timestamp the way `modifiedFromUtc` expects it.
#[must_use]
pub fn format_api_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(API_TIMESTAMP_FORMAT).to_string()
}

/// Pagination cursor for one extraction run.
///
/// The raw string is kept verbatim so the exact value the server returned is
/// echoed back on the next request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watermark(String);

impl Watermark {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The instant this watermark denotes, if it parses.
    #[must_use]
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.0)
    }

    /// Advance by exactly one millisecond.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTimestamp`] if the watermark does not parse.
    pub fn bumped(&self) -> Result<Self, CoreError> {
        let instant = self
            .instant()
            .ok_or_else(|| CoreError::InvalidTimestamp(self.0.clone()))?;
        Ok(Self(format_api_timestamp(
            instant + Duration::milliseconds(1),
        )))
    }

    /// True when both watermarks are the same string or denote the same instant.
    #[must_use]
    pub fn same_instant(&self, other: &Self) -> bool {
        if self.0 == other.0 {
            return true;
        }
        matches!((self.instant(), other.instant()), (Some(a), Some(b)) if a == b)
    }

    /// True when `self` parses to an instant strictly earlier than `other`.
    #[must_use]
    pub fn is_before(&self, other: &Self) -> bool {
        matches!((self.instant(), other.instant()), (Some(a), Some(b)) if a < b)
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Watermark {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
