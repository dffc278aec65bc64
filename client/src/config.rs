//! Client configuration
//!
//! Defaults in code, overridable with WO_CLIENT__* environment variables.

use config::{ConfigError, Environment};
use serde::Deserialize;
use shared::FRESHNESS_WINDOW_MINUTES;

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    /// Forecast provider base URL
    pub forecast_base_url: String,

    /// Override server base URL
    pub override_base_url: String,

    /// How long a fetched snapshot may be served from the cache
    pub freshness_minutes: i64,

    /// Per-request timeout for both services
    pub request_timeout_secs: u64,
}

impl ClientConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = config::Config::builder()
            .set_default("forecast_base_url", defaults.forecast_base_url)?
            .set_default("override_base_url", defaults.override_base_url)?
            .set_default("freshness_minutes", defaults.freshness_minutes)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?
            .add_source(
                Environment::with_prefix("WO_CLIENT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.freshness_window()?;
        Ok(config)
    }

    /// Cache TTL; must be a positive number of minutes
    pub fn freshness_window(&self) -> Result<chrono::Duration, ConfigError> {
        chrono::Duration::try_minutes(self.freshness_minutes)
            .filter(|window| *window > chrono::Duration::zero())
            .ok_or_else(|| {
                ConfigError::Message(format!(
                    "freshness_minutes must be a positive number of minutes, got {}",
                    self.freshness_minutes
                ))
            })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            forecast_base_url: "https://api.open-meteo.com".to_string(),
            override_base_url: "http://localhost:3000".to_string(),
            freshness_minutes: FRESHNESS_WINDOW_MINUTES,
            request_timeout_secs: 10,
        }
    }
}
