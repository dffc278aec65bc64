//! Weather data models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a displayed snapshot came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SnapshotSource {
    #[default]
    Api,
    Override,
}

/// A fully-populated daily forecast for one location and date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub temp_c: f64,
    pub humidity_pct: i32,
    pub wind_kph: f64,
    pub precip_mm: f64,
    pub condition_text: String,
    pub condition_icon: String,
    pub source: SnapshotSource,
}

impl WeatherSnapshot {
    /// True when every numeric field is finite and within its range
    pub fn is_well_formed(&self) -> bool {
        self.temp_c.is_finite()
            && (0..=100).contains(&self.humidity_pct)
            && self.wind_kph.is_finite()
            && self.wind_kph >= 0.0
            && self.precip_mm.is_finite()
            && self.precip_mm >= 0.0
    }
}

/// A user correction: any subset of snapshot fields.
///
/// Missing fields fall through to the upstream value when merged. Unknown
/// field names are rejected rather than silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SnapshotPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity_pct: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_kph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precip_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_icon: Option<String>,
}

impl SnapshotPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overwrite every field this patch carries, keep the rest of `base`
    pub fn apply_to(&self, base: &WeatherSnapshot) -> WeatherSnapshot {
        WeatherSnapshot {
            temp_c: self.temp_c.unwrap_or(base.temp_c),
            humidity_pct: self.humidity_pct.unwrap_or(base.humidity_pct),
            wind_kph: self.wind_kph.unwrap_or(base.wind_kph),
            precip_mm: self.precip_mm.unwrap_or(base.precip_mm),
            condition_text: self
                .condition_text
                .clone()
                .unwrap_or_else(|| base.condition_text.clone()),
            condition_icon: self
                .condition_icon
                .clone()
                .unwrap_or_else(|| base.condition_icon.clone()),
            source: base.source,
        }
    }
}

/// The six icon categories a WMO weather code collapses into
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Fog,
    Rain,
    Snow,
    Cloudy,
}

impl WeatherCondition {
    pub const ALL: [WeatherCondition; 6] = [
        Self::Clear,
        Self::PartlyCloudy,
        Self::Fog,
        Self::Rain,
        Self::Snow,
        Self::Cloudy,
    ];

    /// Map a WMO weather code; unknown codes are cloudy
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1 | 2 => Self::PartlyCloudy,
            45 | 48 => Self::Fog,
            51..=57 | 61..=67 | 80..=82 | 95 | 96 | 99 => Self::Rain,
            71..=77 | 85 | 86 => Self::Snow,
            _ => Self::Cloudy,
        }
    }

    /// Symbolic icon code stored in snapshots
    pub fn icon_code(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::PartlyCloudy => "partly-cloudy",
            Self::Fog => "fog",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Cloudy => "cloudy",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Fog => "Fog",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::Cloudy => "Cloudy",
        }
    }

    pub fn from_icon_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.icon_code() == code)
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
