//! Common types used across the platform

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minutes an upstream snapshot may be served from the cache before it is refetched
pub const FRESHNESS_WINDOW_MINUTES: i64 = 15;

/// Actor recorded on every override until sessions exist
pub const ANONYMOUS_ACTOR: &str = "anonymous";

/// Freshness window as a chrono duration
pub fn freshness_window() -> Duration {
    Duration::minutes(FRESHNESS_WINDOW_MINUTES)
}

/// Identity of one forecast/override slot.
///
/// Coordinates are kept exactly as the caller wrote them: `"17.385"` and
/// `"17.3850"` are different keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverrideKey {
    pub lat: String,
    pub lon: String,
    pub date: NaiveDate,
}

impl OverrideKey {
    pub fn new(lat: impl Into<String>, lon: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            lat: lat.into(),
            lon: lon.into(),
            date,
        }
    }
}

impl fmt::Display for OverrideKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) @ {}", self.lat, self.lon, self.date)
    }
}
