//! Override store integration tests
//!
//! Tests for the versioned override log including:
//! - Supersession: one active record per key
//! - Version numbering across deactivation
//! - Resilience to missing or corrupt log files
//! - Serialized concurrent mutation

use chrono::NaiveDate;
use proptest::prelude::*;
use shared::{OverrideKey, SnapshotPatch};
use std::sync::Arc;
use tempfile::TempDir;
use weather_override_backend::services::{OverrideStore, OverrideStoreError};

fn key(lat: &str, lon: &str, date: &str) -> OverrideKey {
    OverrideKey::new(
        lat,
        lon,
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
    )
}

fn hyderabad() -> OverrideKey {
    key("17.385", "78.4867", "2024-01-01")
}

fn temp(value: f64) -> SnapshotPatch {
    SnapshotPatch {
        temp_c: Some(value),
        ..Default::default()
    }
}

async fn open_store(dir: &TempDir) -> OverrideStore {
    OverrideStore::open(dir.path().join("overrides.json")).await
}

// ============================================================================
// Unit Tests
// ============================================================================

#[tokio::test]
async fn test_create_then_delete_end_to_end() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let created = store.create(hyderabad(), temp(28.0)).await.unwrap();
    assert_eq!(created.version, 1);
    assert!(created.active);
    assert_eq!(created.updated_by, "anonymous");

    let active = store.get_latest_active(&hyderabad()).await.unwrap();
    assert_eq!(active.version, 1);
    assert!(active.active);
    assert_eq!(active.new_values.temp_c, Some(28.0));

    let removed = store.delete(&hyderabad()).await.unwrap().unwrap();
    assert_eq!(removed.version, 1);
    assert!(!removed.active);

    assert!(store.get_latest_active(&hyderabad()).await.is_none());
}

#[tokio::test]
async fn test_versions_never_reused_after_delete() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let first = store.create(hyderabad(), temp(20.0)).await.unwrap();
    store.delete(&hyderabad()).await.unwrap();
    let second = store.create(hyderabad(), temp(21.0)).await.unwrap();

    assert_eq!(first.version, 1);
    assert_eq!(second.version, 2);

    let history = store.history(&hyderabad()).await;
    assert_eq!(history.len(), 2);
    assert_eq!((history[0].version, history[0].active), (1, false));
    assert_eq!((history[1].version, history[1].active), (2, true));
}

#[tokio::test]
async fn test_delete_without_active_is_noop() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    assert!(store.delete(&hyderabad()).await.unwrap().is_none());
    // nothing was written
    assert!(!dir.path().join("overrides.json").exists());

    store.create(hyderabad(), temp(20.0)).await.unwrap();
    store.delete(&hyderabad()).await.unwrap();
    assert!(store.delete(&hyderabad()).await.unwrap().is_none());

    let next = store.create(hyderabad(), temp(22.0)).await.unwrap();
    assert_eq!(next.version, 2);
}

#[tokio::test]
async fn test_keys_are_exact_text() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    store.create(hyderabad(), temp(28.0)).await.unwrap();

    let padded = key("17.3850", "78.4867", "2024-01-01");
    assert!(store.get_latest_active(&padded).await.is_none());

    let next_day = key("17.385", "78.4867", "2024-01-02");
    assert!(store.get_latest_active(&next_day).await.is_none());

    let other = store.create(padded.clone(), temp(30.0)).await.unwrap();
    assert_eq!(other.version, 1);
    assert_eq!(
        store.get_latest_active(&hyderabad()).await.unwrap().new_values.temp_c,
        Some(28.0)
    );
}

#[tokio::test]
async fn test_empty_override_is_stored() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let record = store
        .create(hyderabad(), SnapshotPatch::default())
        .await
        .unwrap();
    assert!(record.new_values.is_empty());
    assert!(store.get_latest_active(&hyderabad()).await.is_some());
}

// ============================================================================
// Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_log_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = open_store(&dir).await;
        store.create(hyderabad(), temp(20.0)).await.unwrap();
        store.create(hyderabad(), temp(25.0)).await.unwrap();
        store
            .create(key("1", "2", "2024-05-05"), temp(5.0))
            .await
            .unwrap();
    }

    let store = open_store(&dir).await;
    let active = store.get_latest_active(&hyderabad()).await.unwrap();
    assert_eq!(active.version, 2);
    assert_eq!(active.new_values.temp_c, Some(25.0));
    assert_eq!(store.history(&hyderabad()).await.len(), 2);

    let raw = std::fs::read_to_string(dir.path().join("overrides.json")).unwrap();
    let records: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["lat"], "17.385");
    assert_eq!(records[0]["active"], false);
    assert_eq!(records[1]["newValues"]["tempC"], 25.0);
}

#[tokio::test]
async fn test_missing_parent_directory_is_created() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("data").join("overrides.json");
    let store = OverrideStore::open(&path).await;

    store.create(hyderabad(), temp(20.0)).await.unwrap();
    assert!(path.exists());
}

#[tokio::test]
async fn test_corrupt_log_is_treated_as_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("overrides.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = OverrideStore::open(&path).await;
    assert!(store.get_latest_active(&hyderabad()).await.is_none());

    let record = store.create(hyderabad(), temp(20.0)).await.unwrap();
    assert_eq!(record.version, 1);

    let raw = std::fs::read_to_string(&path).unwrap();
    let records: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_empty_and_wrong_shape_logs_are_treated_as_empty() {
    for contents in ["", "   \n", "{}", "[1, 2, 3]", "null"] {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("overrides.json");
        std::fs::write(&path, contents).unwrap();

        let store = OverrideStore::open(&path).await;
        assert!(store.history(&hyderabad()).await.is_empty());
        assert_eq!(store.create(hyderabad(), temp(1.0)).await.unwrap().version, 1);
    }
}

#[tokio::test]
async fn test_multiple_active_records_are_tolerated_and_healed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("overrides.json");
    let raw = serde_json::json!([
        {
            "lat": "17.385", "lon": "78.4867", "date": "2024-01-01",
            "newValues": {"tempC": 10.0}, "version": 1, "active": true,
            "updatedAt": "2024-01-01T00:00:00Z", "updatedBy": "anonymous"
        },
        {
            "lat": "17.385", "lon": "78.4867", "date": "2024-01-01",
            "newValues": {"tempC": 30.0}, "version": 3, "active": true,
            "updatedAt": "2024-01-01T02:00:00Z", "updatedBy": "anonymous"
        },
        {
            "lat": "17.385", "lon": "78.4867", "date": "2024-01-01",
            "newValues": {"tempC": 20.0}, "version": 2, "active": true,
            "updatedAt": "2024-01-01T01:00:00Z", "updatedBy": "anonymous"
        }
    ]);
    std::fs::write(&path, raw.to_string()).unwrap();

    let store = OverrideStore::open(&path).await;
    let active = store.get_latest_active(&hyderabad()).await.unwrap();
    assert_eq!(active.version, 3);
    assert_eq!(active.new_values.temp_c, Some(30.0));

    let created = store.create(hyderabad(), temp(40.0)).await.unwrap();
    assert_eq!(created.version, 4);

    let history = store.history(&hyderabad()).await;
    assert_eq!(history.iter().filter(|r| r.active).count(), 1);
    assert_eq!(history.last().unwrap().version, 4);
}

#[tokio::test]
async fn test_failed_write_leaves_log_unchanged() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("overrides.json");
    let store = OverrideStore::open(&path).await;
    store.create(hyderabad(), temp(20.0)).await.unwrap();

    // a directory in place of the log file makes every rewrite fail
    std::fs::remove_file(&path).unwrap();
    std::fs::create_dir(&path).unwrap();

    let err = store.create(hyderabad(), temp(30.0)).await.unwrap_err();
    assert!(matches!(err, OverrideStoreError::Io(_)));

    let active = store.get_latest_active(&hyderabad()).await.unwrap();
    assert_eq!(active.version, 1);
    assert_eq!(active.new_values.temp_c, Some(20.0));
    assert_eq!(store.history(&hyderabad()).await.len(), 1);

    assert!(matches!(
        store.delete(&hyderabad()).await,
        Err(OverrideStoreError::Io(_))
    ));
    assert!(store.get_latest_active(&hyderabad()).await.unwrap().active);

    // once writable again, numbering continues from the last persisted record
    std::fs::remove_dir(&path).unwrap();
    let record = store.create(hyderabad(), temp(30.0)).await.unwrap();
    assert_eq!(record.version, 2);
}

#[tokio::test]
async fn test_exhausted_versions_are_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("overrides.json");
    let raw = serde_json::json!([{
        "lat": "17.385", "lon": "78.4867", "date": "2024-01-01",
        "newValues": {}, "version": u32::MAX, "active": true,
        "updatedAt": "2024-01-01T00:00:00Z", "updatedBy": "anonymous"
    }]);
    std::fs::write(&path, raw.to_string()).unwrap();

    let store = OverrideStore::open(&path).await;
    let err = store.create(hyderabad(), temp(1.0)).await.unwrap_err();
    assert!(matches!(err, OverrideStoreError::VersionExhausted(_)));

    let active = store.get_latest_active(&hyderabad()).await.unwrap();
    assert_eq!(active.version, u32::MAX);
    assert_eq!(store.history(&hyderabad()).await.len(), 1);
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_do_not_lose_updates() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(open_store(&dir).await);

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.create(hyderabad(), temp(i as f64)).await })
        })
        .collect();

    let mut versions = Vec::new();
    for handle in handles {
        versions.push(handle.await.unwrap().unwrap().version);
    }
    versions.sort_unstable();
    assert_eq!(versions, (1..=32).collect::<Vec<u32>>());

    let history = store.history(&hyderabad()).await;
    assert_eq!(history.len(), 32);
    assert_eq!(history.iter().filter(|r| r.active).count(), 1);
    assert_eq!(store.get_latest_active(&hyderabad()).await.unwrap().version, 32);

    // the file holds every record too
    let reopened = open_store(&dir).await;
    assert_eq!(reopened.history(&hyderabad()).await.len(), 32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_mixed_keys() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(open_store(&dir).await);
    let keys = [
        key("1", "1", "2024-01-01"),
        key("2", "2", "2024-01-01"),
        key("3", "3", "2024-01-01"),
    ];

    let mut handles = Vec::new();
    for round in 0..10 {
        for k in keys.iter().cloned() {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.create(k, temp(round as f64)).await
            }));
        }
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for k in &keys {
        let history = store.history(k).await;
        assert_eq!(history.len(), 10);
        assert_eq!(history.iter().filter(|r| r.active).count(), 1);
        assert_eq!(store.get_latest_active(k).await.unwrap().version, 10);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Create(u8),
    Delete(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..3).prop_map(Op::Create),
        (0u8..3).prop_map(Op::Delete),
    ]
}

fn slot(i: u8) -> OverrideKey {
    key(&format!("{}.5", i), "100.25", "2024-06-01")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: N creates on one key leave exactly one active record at version N
    #[test]
    fn prop_n_creates_one_active(n in 1usize..15) {
        tokio_test::block_on(async {
            let dir = TempDir::new().unwrap();
            let store = open_store(&dir).await;
            for i in 0..n {
                store.create(hyderabad(), temp(i as f64)).await.unwrap();
            }
            let history = store.history(&hyderabad()).await;
            assert_eq!(history.iter().filter(|r| r.active).count(), 1);
            let active = store.get_latest_active(&hyderabad()).await.unwrap();
            assert_eq!(active.version as usize, n);
        });
    }

    /// Property: any interleaving of creates and deletes keeps the log invariants
    #[test]
    fn prop_interleaved_ops_keep_invariants(ops in proptest::collection::vec(op_strategy(), 1..25)) {
        tokio_test::block_on(async {
            let dir = TempDir::new().unwrap();
            let store = open_store(&dir).await;
            let mut creates = [0u32; 3];
            let mut live = [false; 3];

            for op in &ops {
                match *op {
                    Op::Create(i) => {
                        let record = store.create(slot(i), temp(1.0)).await.unwrap();
                        creates[i as usize] += 1;
                        live[i as usize] = true;
                        assert_eq!(record.version, creates[i as usize]);
                    }
                    Op::Delete(i) => {
                        let removed = store.delete(&slot(i)).await.unwrap();
                        assert_eq!(removed.is_some(), live[i as usize]);
                        live[i as usize] = false;
                    }
                }
            }

            for i in 0..3u8 {
                let history = store.history(&slot(i)).await;
                assert_eq!(history.len() as u32, creates[i as usize]);
                let versions: Vec<u32> = history.iter().map(|r| r.version).collect();
                assert_eq!(versions, (1..=creates[i as usize]).collect::<Vec<u32>>());
                let active_count = history.iter().filter(|r| r.active).count();
                assert_eq!(active_count, usize::from(live[i as usize]));
            }
        });
    }
}
