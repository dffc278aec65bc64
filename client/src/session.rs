//! Per-session context tying the cache, the override service and the merge
//! together.

use shared::{merge, validate_patch, MergedView, OverrideKey, OverrideRecord, SnapshotPatch};
use std::time::Duration;

use crate::cache::{Clock, SnapshotCache, SystemClock};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::override_api::OverrideApiClient;
use crate::upstream::{ForecastClient, SnapshotFetcher};

/// One logical viewing session
pub struct WeatherSession<F, C = SystemClock> {
    cache: SnapshotCache<F, C>,
    overrides: OverrideApiClient,
    selection: Option<OverrideKey>,
}

impl WeatherSession<ForecastClient, SystemClock> {
    /// Build a session against the configured services
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let forecast = ForecastClient::new(&config.forecast_base_url, timeout)?;
        let overrides = OverrideApiClient::new(&config.override_base_url, timeout)?;
        let cache = SnapshotCache::new(forecast).with_ttl(config.freshness_window()?);
        Ok(Self::new(cache, overrides))
    }
}

impl<F: SnapshotFetcher, C: Clock> WeatherSession<F, C> {
    pub fn new(cache: SnapshotCache<F, C>, overrides: OverrideApiClient) -> Self {
        Self {
            cache,
            overrides,
            selection: None,
        }
    }

    pub fn select(&mut self, key: OverrideKey) {
        self.selection = Some(key);
    }

    pub fn selection(&self) -> Option<&OverrideKey> {
        self.selection.as_ref()
    }

    pub fn cache(&self) -> &SnapshotCache<F, C> {
        &self.cache
    }

    /// Baseline from the cache merged with the live active override.
    ///
    /// An unreachable or failing override service degrades to the plain
    /// upstream view; an upstream failure is returned to the caller.
    pub async fn view(&mut self, key: &OverrideKey) -> Result<MergedView, ClientError> {
        let baseline = self.cache.get(key).await?;

        let active = match self.overrides.get_active(key).await {
            Ok(active) => active,
            Err(e) => {
                tracing::warn!("Override lookup failed for {}, showing API data: {}", key, e);
                None
            }
        };

        let view = merge(&baseline, active.as_ref());
        tracing::debug!("View for {}: {}", key, view.provenance);
        Ok(view)
    }

    /// View for the current selection
    pub async fn refresh(&mut self) -> Result<MergedView, ClientError> {
        let key = self.selection.clone().ok_or(ClientError::NothingSelected)?;
        self.view(&key).await
    }

    /// Store a correction, then drop the cached baseline for that key
    pub async fn save_override(
        &mut self,
        key: &OverrideKey,
        values: &SnapshotPatch,
    ) -> Result<OverrideRecord, ClientError> {
        validate_patch(values)?;
        let record = self.overrides.create(key, values).await?;
        self.cache.invalidate(key);
        tracing::info!("Saved override v{} for {}", record.version, key);
        Ok(record)
    }

    /// Remove the active correction, then drop the cached baseline for that key
    pub async fn remove_override(&mut self, key: &OverrideKey) -> Result<bool, ClientError> {
        let removed = self.overrides.delete(key).await?;
        self.cache.invalidate(key);
        tracing::info!("Removed override for {} (was active: {})", key, removed);
        Ok(removed)
    }
}
