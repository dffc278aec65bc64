//! Forecast provider client
//!
//! Integrates with an Open-Meteo style forecast endpoint. Only the hourly
//! series of the response is consumed.

use reqwest::Client;
use serde::Deserialize;
use shared::{summarize_day, HourlySeries, OverrideKey, WeatherSnapshot};
use std::future::Future;
use std::time::Duration;

use crate::error::UpstreamFetchError;

const HOURLY_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,wind_speed_10m,precipitation,weather_code";

/// Source of baseline snapshots for the cache
pub trait SnapshotFetcher {
    fn fetch(
        &self,
        key: &OverrideKey,
    ) -> impl Future<Output = Result<WeatherSnapshot, UpstreamFetchError>> + Send;
}

/// Forecast API client
#[derive(Clone)]
pub struct ForecastClient {
    client: Client,
    base_url: String,
}

/// Forecast provider response; everything but `hourly` is ignored
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    hourly: Option<HourlySeries>,
}

impl ForecastClient {
    /// Create a new ForecastClient
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamFetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the hourly series covering `key.date`
    pub async fn get_hourly(&self, key: &OverrideKey) -> Result<HourlySeries, UpstreamFetchError> {
        let url = format!("{}/v1/forecast", self.base_url);
        let date = key.date.format("%Y-%m-%d").to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", key.lat.as_str()),
                ("longitude", key.lon.as_str()),
                ("hourly", HOURLY_FIELDS),
                ("start_date", date.as_str()),
                ("end_date", date.as_str()),
                ("timezone", "auto"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamFetchError::Status { status, body });
        }

        let body = response.text().await?;
        let data: ForecastResponse =
            serde_json::from_str(&body).map_err(|e| UpstreamFetchError::Parse(e.to_string()))?;

        Ok(data.hourly.unwrap_or_default())
    }

    /// Fetch and reduce one day to a single snapshot
    pub async fn get_daily(&self, key: &OverrideKey) -> Result<WeatherSnapshot, UpstreamFetchError> {
        let hourly = self.get_hourly(key).await?;
        let snapshot = summarize_day(&hourly, key.date)?;
        if !snapshot.is_well_formed() {
            return Err(UpstreamFetchError::Parse(format!(
                "forecast for {} has out-of-range values",
                key
            )));
        }
        tracing::debug!("Fetched forecast for {}: {:.1}°C", key, snapshot.temp_c);
        Ok(snapshot)
    }
}

impl SnapshotFetcher for ForecastClient {
    async fn fetch(&self, key: &OverrideKey) -> Result<WeatherSnapshot, UpstreamFetchError> {
        self.get_daily(key).await
    }
}
