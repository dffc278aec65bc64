//! HTTP handlers for the override endpoints

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{validate_key, validate_patch, OverrideKey, OverrideRecord, SnapshotPatch, ValidationError};

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Query parameters identifying one override slot
#[derive(Debug, Deserialize)]
pub struct OverrideQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub date: Option<String>,
}

impl OverrideQuery {
    fn key(&self) -> Result<OverrideKey, ValidationError> {
        validate_key(self.lat.as_deref(), self.lon.as_deref(), self.date.as_deref())
    }
}

/// Body of a create request
#[derive(Debug, Deserialize)]
pub struct CreateOverrideInput {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub date: Option<String>,
    pub values: Option<SnapshotPatch>,
}

/// Body of a delete request
#[derive(Debug, Deserialize)]
pub struct DeleteOverrideInput {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteOverrideResponse {
    pub removed: bool,
}

/// Get the active override for a key, or `{}` when there is none
pub async fn get_override(
    State(state): State<AppState>,
    query: Result<Query<OverrideQuery>, QueryRejection>,
) -> AppResult<Json<Value>> {
    let Query(query) = query?;
    let key = query.key()?;

    let body = match state.store.get_latest_active(&key).await {
        Some(record) => {
            serde_json::to_value(record).map_err(|e| AppError::Internal(e.to_string()))?
        }
        None => Value::Object(Default::default()),
    };
    Ok(Json(body))
}

/// Create a new override, superseding any earlier one for the same key
pub async fn create_override(
    State(state): State<AppState>,
    input: Result<Json<CreateOverrideInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<OverrideRecord>)> {
    let Json(input) = input?;
    let key = validate_key(input.lat.as_deref(), input.lon.as_deref(), input.date.as_deref())?;
    let values = input.values.ok_or_else(|| ValidationError::missing("values"))?;
    validate_patch(&values)?;

    let record = state.store.create(key, values).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Deactivate the active override for a key
pub async fn delete_override(
    State(state): State<AppState>,
    input: Result<Json<DeleteOverrideInput>, JsonRejection>,
) -> AppResult<Json<DeleteOverrideResponse>> {
    let Json(input) = input?;
    let key = validate_key(input.lat.as_deref(), input.lon.as_deref(), input.date.as_deref())?;

    let removed = state.store.delete(&key).await?;
    Ok(Json(DeleteOverrideResponse {
        removed: removed.is_some(),
    }))
}
