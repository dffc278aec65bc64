//! Client-side error types

use shared::{ForecastError, ValidationError};
use thiserror::Error;

/// Failure to obtain a baseline snapshot from the forecast provider
#[derive(Debug, Error)]
pub enum UpstreamFetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Forecast provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse forecast response: {0}")]
    Parse(String),

    #[error("Forecast has no usable data: {0}")]
    NoData(#[from] ForecastError),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Upstream(#[from] UpstreamFetchError),

    #[error("Override service rejected the request: {0}")]
    Rejected(String),

    #[error("Override service error {status}: {message}")]
    OverrideService { status: u16, message: String },

    #[error("Invalid override value: {0}")]
    Validation(#[from] ValidationError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No location selected")]
    NothingSelected,

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl ClientError {
    /// Status line shown in place of the weather card
    pub fn user_message(&self) -> String {
        match self {
            Self::Upstream(_) => "Could not load the forecast. Please try again.".to_string(),
            Self::Rejected(msg) => format!("Override not saved: {}", msg),
            Self::OverrideService { .. } => "The override service is unavailable.".to_string(),
            Self::Validation(err) => format!("Invalid value for {}: {}", err.field, err.message),
            Self::Network(_) => "Network error. Check your connection.".to_string(),
            Self::InvalidResponse(_) => "Unexpected response from the server.".to_string(),
            Self::NothingSelected => "Choose a location and date first.".to_string(),
            Self::Config(_) => "The weather client is misconfigured.".to_string(),
        }
    }

    /// Whether the forecast card should be hidden
    pub fn hides_forecast(&self) -> bool {
        matches!(self, Self::Upstream(_) | Self::NothingSelected)
    }
}
