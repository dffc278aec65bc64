//! Override log entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::SnapshotPatch;
use crate::types::OverrideKey;

/// One entry in the override log.
///
/// Records are never removed; supersession and deletion only flip `active`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRecord {
    #[serde(flatten)]
    pub key: OverrideKey,
    pub new_values: SnapshotPatch,
    pub version: u32,
    pub active: bool,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}
