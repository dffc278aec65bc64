//! Versioned override log persisted as a single JSON array
//!
//! Every mutation rewrites the whole log. Mutations are serialized behind one
//! writer lock so two concurrent creates can never compute the same version or
//! drop each other's record. Reads only take the read side of the in-memory log.

use chrono::Utc;
use shared::{OverrideKey, OverrideRecord, SnapshotPatch, ANONYMOUS_ACTOR};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

/// Failure to persist the override log
#[derive(Debug, Error)]
pub enum OverrideStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No versions left for {0}")]
    VersionExhausted(OverrideKey),
}

/// Append-ordered records plus a per-key index into them
#[derive(Debug, Clone, Default)]
struct OverrideLog {
    records: Vec<OverrideRecord>,
    by_key: HashMap<OverrideKey, Vec<usize>>,
}

impl OverrideLog {
    fn from_records(records: Vec<OverrideRecord>) -> Self {
        let mut log = Self::default();
        for record in records {
            log.append(record);
        }
        log
    }

    fn append(&mut self, record: OverrideRecord) {
        self.by_key
            .entry(record.key.clone())
            .or_default()
            .push(self.records.len());
        self.records.push(record);
    }

    fn for_key<'a>(&'a self, key: &OverrideKey) -> impl Iterator<Item = &'a OverrideRecord> + 'a {
        self.by_key
            .get(key)
            .into_iter()
            .flatten()
            .map(move |&i| &self.records[i])
    }

    /// Highest-version active record; more than one active is tolerated
    fn latest_active(&self, key: &OverrideKey) -> Option<&OverrideRecord> {
        self.for_key(key)
            .filter(|r| r.active)
            .max_by_key(|r| r.version)
    }

    /// `None` once the key has used up the version space
    fn next_version(&self, key: &OverrideKey) -> Option<u32> {
        self.for_key(key).map(|r| r.version).max().unwrap_or(0).checked_add(1)
    }

    /// Deactivate every active record for `key`, returning the newest one touched
    fn deactivate(&mut self, key: &OverrideKey) -> Option<OverrideRecord> {
        let indices = self.by_key.get(key)?.clone();
        let mut newest: Option<OverrideRecord> = None;
        for i in indices {
            let record = &mut self.records[i];
            if !record.active {
                continue;
            }
            record.active = false;
            if newest.as_ref().map_or(true, |n| record.version > n.version) {
                newest = Some(record.clone());
            }
        }
        newest
    }
}

/// Durable store of user corrections, one active record per key
pub struct OverrideStore {
    path: PathBuf,
    log: RwLock<OverrideLog>,
    writer: Mutex<()>,
}

impl OverrideStore {
    /// Open the log at `path`.
    ///
    /// A missing, empty, unreadable or malformed file yields an empty store.
    pub async fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let records = load_records(&path).await;
        tracing::info!(
            "Loaded {} override records from {}",
            records.len(),
            path.display()
        );

        Self {
            path,
            log: RwLock::new(OverrideLog::from_records(records)),
            writer: Mutex::new(()),
        }
    }

    /// Latest active override for `key`, if any
    pub async fn get_latest_active(&self, key: &OverrideKey) -> Option<OverrideRecord> {
        let record = self.log.read().await.latest_active(key).cloned();
        tracing::debug!(
            "Active override for {}: {:?}",
            key,
            record.as_ref().map(|r| r.version)
        );
        record
    }

    /// Every record ever written for `key`, oldest first
    pub async fn history(&self, key: &OverrideKey) -> Vec<OverrideRecord> {
        let log = self.log.read().await;
        let mut records: Vec<OverrideRecord> = log.for_key(key).cloned().collect();
        records.sort_by_key(|r| r.version);
        records
    }

    /// Append a new active record for `key`, superseding every earlier one
    pub async fn create(
        &self,
        key: OverrideKey,
        new_values: SnapshotPatch,
    ) -> Result<OverrideRecord, OverrideStoreError> {
        let _guard = self.writer.lock().await;

        let mut next = self.log.read().await.clone();
        let Some(version) = next.next_version(&key) else {
            return Err(OverrideStoreError::VersionExhausted(key));
        };
        next.deactivate(&key);

        let record = OverrideRecord {
            key,
            new_values,
            version,
            active: true,
            updated_at: Utc::now(),
            updated_by: ANONYMOUS_ACTOR.to_string(),
        };
        next.append(record.clone());

        self.persist(&next.records).await?;
        *self.log.write().await = next;

        tracing::info!("Created override v{} for {}", record.version, record.key);
        Ok(record)
    }

    /// Deactivate the active record for `key` without creating a new one.
    ///
    /// Returns the deactivated record, or `None` (and writes nothing) when no
    /// record was active.
    pub async fn delete(
        &self,
        key: &OverrideKey,
    ) -> Result<Option<OverrideRecord>, OverrideStoreError> {
        let _guard = self.writer.lock().await;

        let mut next = self.log.read().await.clone();
        let Some(removed) = next.deactivate(key) else {
            tracing::debug!("No active override to delete for {}", key);
            return Ok(None);
        };

        self.persist(&next.records).await?;
        *self.log.write().await = next;

        tracing::info!("Deactivated override v{} for {}", removed.version, key);
        Ok(Some(removed))
    }

    /// Write the full log to a sibling temp file, then rename it into place
    async fn persist(&self, records: &[OverrideRecord]) -> Result<(), OverrideStoreError> {
        let json = serde_json::to_vec_pretty(records)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

async fn load_records(path: &Path) -> Vec<OverrideRecord> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!("Override log {} unreadable, starting empty: {}", path.display(), e);
            return Vec::new();
        }
    };

    if contents.trim().is_empty() {
        return Vec::new();
    }

    match serde_json::from_str(&contents) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!("Override log {} is invalid, starting empty: {}", path.display(), e);
            Vec::new()
        }
    }
}
