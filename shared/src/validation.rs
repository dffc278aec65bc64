//! Validation utilities for override requests
//!
//! Everything here runs before a request is allowed to touch the override log.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{SnapshotPatch, WeatherCondition};
use crate::types::OverrideKey;

/// A field that failed boundary validation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn missing(field: &str) -> Self {
        Self::new(field, format!("{} is required", field))
    }
}

// ============================================================================
// Key Validations
// ============================================================================

/// Parse an ISO-8601 calendar date (`YYYY-MM-DD`)
pub fn parse_calendar_date(date: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::new("date", "date must be a YYYY-MM-DD calendar date"))
}

fn require<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::missing(field)),
    }
}

/// Build a key from raw request fields; blank values count as missing
pub fn validate_key(
    lat: Option<&str>,
    lon: Option<&str>,
    date: Option<&str>,
) -> Result<OverrideKey, ValidationError> {
    let lat = require("lat", lat)?;
    let lon = require("lon", lon)?;
    let date = parse_calendar_date(require("date", date)?)?;
    Ok(OverrideKey::new(lat, lon, date))
}

// ============================================================================
// Value Validations
// ============================================================================

/// Validate that an override cannot break the snapshot invariants once merged
pub fn validate_patch(patch: &SnapshotPatch) -> Result<(), ValidationError> {
    if let Some(temp) = patch.temp_c {
        if !temp.is_finite() {
            return Err(ValidationError::new("tempC", "tempC must be a finite number"));
        }
    }
    if let Some(humidity) = patch.humidity_pct {
        if !(0..=100).contains(&humidity) {
            return Err(ValidationError::new(
                "humidityPct",
                "humidityPct must be between 0 and 100",
            ));
        }
    }
    if let Some(wind) = patch.wind_kph {
        if !wind.is_finite() || wind < 0.0 {
            return Err(ValidationError::new(
                "windKph",
                "windKph must be a non-negative number",
            ));
        }
    }
    if let Some(precip) = patch.precip_mm {
        if !precip.is_finite() || precip < 0.0 {
            return Err(ValidationError::new(
                "precipMm",
                "precipMm must be a non-negative number",
            ));
        }
    }
    if let Some(icon) = patch.condition_icon.as_deref() {
        if WeatherCondition::from_icon_code(icon).is_none() {
            return Err(ValidationError::new(
                "conditionIcon",
                format!("unknown condition icon '{}'", icon),
            ));
        }
    }
    Ok(())
}
