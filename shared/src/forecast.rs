//! Reduction of an hourly forecast series to a single daily snapshot

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{SnapshotSource, WeatherCondition, WeatherSnapshot};

/// Hourly series as returned by the forecast provider.
///
/// Each vector is indexed in parallel with `time`; the provider may send
/// `null` for hours it has no value for.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HourlySeries {
    pub time: Vec<String>,
    pub temperature_2m: Vec<Option<f64>>,
    pub relative_humidity_2m: Vec<Option<f64>>,
    pub wind_speed_10m: Vec<Option<f64>>,
    pub precipitation: Vec<Option<f64>>,
    pub weather_code: Vec<Option<i32>>,
}

/// One complete hour of data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlySample {
    pub temp_c: f64,
    pub humidity_pct: f64,
    pub wind_kph: f64,
    pub precip_mm: f64,
    pub weather_code: i32,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ForecastError {
    #[error("hourly series have mismatched lengths")]
    MismatchedSeries,

    #[error("no hourly data for {0}")]
    EmptySeries(NaiveDate),
}

impl HourlySeries {
    /// Complete samples whose timestamp falls on `date`
    pub fn samples_for(&self, date: NaiveDate) -> Result<Vec<HourlySample>, ForecastError> {
        let n = self.time.len();
        if [
            self.temperature_2m.len(),
            self.relative_humidity_2m.len(),
            self.wind_speed_10m.len(),
            self.precipitation.len(),
            self.weather_code.len(),
        ]
        .iter()
        .any(|len| *len != n)
        {
            return Err(ForecastError::MismatchedSeries);
        }

        let prefix = date.format("%Y-%m-%d").to_string();
        let samples = (0..n)
            .filter(|&i| self.time[i].starts_with(&prefix))
            .filter_map(|i| {
                Some(HourlySample {
                    temp_c: self.temperature_2m[i].filter(|v| v.is_finite())?,
                    humidity_pct: self.relative_humidity_2m[i].filter(|v| v.is_finite())?,
                    wind_kph: self.wind_speed_10m[i].filter(|v| v.is_finite())?,
                    precip_mm: self.precipitation[i].filter(|v| v.is_finite())?,
                    weather_code: self.weather_code[i]?,
                })
            })
            .collect();
        Ok(samples)
    }
}

/// Summarize one day: means for temperature, humidity and wind, total
/// precipitation, and the condition of the midpoint hour (`len / 2`).
pub fn summarize_day(series: &HourlySeries, date: NaiveDate) -> Result<WeatherSnapshot, ForecastError> {
    let samples = series.samples_for(date)?;
    if samples.is_empty() {
        return Err(ForecastError::EmptySeries(date));
    }

    let count = samples.len() as f64;
    let mean = |f: fn(&HourlySample) -> f64| samples.iter().map(f).sum::<f64>() / count;

    let humidity = mean(|s| s.humidity_pct).round().clamp(0.0, 100.0) as i32;
    let condition = WeatherCondition::from_wmo_code(samples[samples.len() / 2].weather_code);

    Ok(WeatherSnapshot {
        temp_c: mean(|s| s.temp_c),
        humidity_pct: humidity,
        wind_kph: mean(|s| s.wind_kph).max(0.0),
        precip_mm: samples.iter().map(|s| s.precip_mm).sum::<f64>().max(0.0),
        condition_text: condition.label().to_string(),
        condition_icon: condition.icon_code().to_string(),
        source: SnapshotSource::Api,
    })
}
