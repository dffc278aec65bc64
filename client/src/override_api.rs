//! HTTP client for the override server

use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use shared::{OverrideKey, OverrideRecord, SnapshotPatch};
use std::time::Duration;

use crate::error::ClientError;

#[derive(Clone)]
pub struct OverrideApiClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct KeyBody<'a> {
    lat: &'a str,
    lon: &'a str,
    date: String,
}

#[derive(Serialize)]
struct CreateBody<'a> {
    #[serde(flatten)]
    key: KeyBody<'a>,
    values: &'a SnapshotPatch,
}

impl<'a> From<&'a OverrideKey> for KeyBody<'a> {
    fn from(key: &'a OverrideKey) -> Self {
        Self {
            lat: &key.lat,
            lon: &key.lon,
            date: key.date.format("%Y-%m-%d").to_string(),
        }
    }
}

impl OverrideApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self) -> String {
        format!("{}/override", self.base_url)
    }

    /// Latest active override for `key`; the server answers `{}` when there is none
    pub async fn get_active(&self, key: &OverrideKey) -> Result<Option<OverrideRecord>, ClientError> {
        let body = KeyBody::from(key);
        let response = self
            .client
            .get(self.url())
            .query(&[("lat", body.lat), ("lon", body.lon), ("date", body.date.as_str())])
            .send()
            .await?;

        let value: Value = check(response).await?.json().await?;
        if value.as_object().is_some_and(|o| o.is_empty()) {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    pub async fn create(
        &self,
        key: &OverrideKey,
        values: &SnapshotPatch,
    ) -> Result<OverrideRecord, ClientError> {
        let response = self
            .client
            .post(self.url())
            .json(&CreateBody {
                key: KeyBody::from(key),
                values,
            })
            .send()
            .await?;

        let record = check(response).await?.json().await?;
        Ok(record)
    }

    /// Returns whether an active override was removed
    pub async fn delete(&self, key: &OverrideKey) -> Result<bool, ClientError> {
        let response = self
            .client
            .delete(self.url())
            .json(&KeyBody::from(key))
            .send()
            .await?;

        let value: Value = check(response).await?.json().await?;
        value
            .get("removed")
            .and_then(Value::as_bool)
            .ok_or_else(|| ClientError::InvalidResponse("missing 'removed' flag".to_string()))
    }
}

async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: Value = response.json().await.unwrap_or(Value::Null);
    let message = body["error"]["message"]
        .as_str()
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error"))
        .to_string();

    if status == StatusCode::BAD_REQUEST {
        Err(ClientError::Rejected(message))
    } else {
        Err(ClientError::OverrideService {
            status: status.as_u16(),
            message,
        })
    }
}
