//! Client side of the weather override platform
//!
//! Fetches daily forecasts through a freshness-bounded cache, asks the
//! override server for the active correction, and merges the two.

pub mod cache;
pub mod config;
pub mod error;
pub mod override_api;
pub mod session;
pub mod upstream;

pub use cache::{CacheEntry, Clock, SnapshotCache, SystemClock};
pub use config::ClientConfig;
pub use error::{ClientError, UpstreamFetchError};
pub use override_api::OverrideApiClient;
pub use session::WeatherSession;
pub use upstream::{ForecastClient, SnapshotFetcher};
