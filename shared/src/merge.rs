//! Field-level merge of an upstream snapshot with the active override

use serde::{Serialize, Serializer};
use std::fmt;

use crate::models::{OverrideRecord, SnapshotSource, WeatherSnapshot};

/// Label describing where the shown data came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Api,
    Override { version: u32 },
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Api => f.write_str("API"),
            Provenance::Override { version } => write!(f, "Override (v{})", version),
        }
    }
}

impl Serialize for Provenance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The value shown to the user for one key
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MergedView {
    pub snapshot: WeatherSnapshot,
    pub provenance: Provenance,
}

/// Combine a baseline with the latest active override, if any.
///
/// An override with no values still reports override provenance.
pub fn merge(baseline: &WeatherSnapshot, active: Option<&OverrideRecord>) -> MergedView {
    match active {
        None => MergedView {
            snapshot: baseline.clone(),
            provenance: Provenance::Api,
        },
        Some(record) => {
            let mut snapshot = record.new_values.apply_to(baseline);
            snapshot.source = SnapshotSource::Override;
            MergedView {
                snapshot,
                provenance: Provenance::Override {
                    version: record.version,
                },
            }
        }
    }
}
