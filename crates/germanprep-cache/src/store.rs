//! Versioned cache store with deterministic key derivation and reactive
//! eviction.
//!
//! Entries never expire by age. The only ways out are an explicit
//! `clear` or quota-triggered eviction of the oldest half. Every failure
//! path in here logs and degrades to a miss; callers never see a cache
//! error.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use germanprep_core::model::{GenerateParams, Skill};

use crate::backend::{StorageBackend, StorageError};

/// Namespace prefix for every key this store owns in the backend.
pub const CACHE_PREFIX: &str = "germanprep_cache_";

/// Static envelope version tag. A mismatch on read is currently neither
/// detected nor acted upon.
pub const CACHE_VERSION: &str = "1.0";

/// Entry count above which a failed write triggers eviction.
const EVICTION_THRESHOLD: usize = 20;

/// Deterministic cache key for one (skill, params) request shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The params carried no usable topic.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("cache key requires a non-empty topic")]
pub struct KeyError;

/// Derive the cache key for a generation request.
///
/// Base is `{skill}_{level}_{topic}`; set discriminators are appended as
/// `name:value` in fixed declaration order (`prefer_type`, `task_type`,
/// `interaction_type`, `item_id_start`). The order is fixed by this
/// function, not sorted; adding a future discriminator anywhere but the
/// end would silently re-key existing entries.
pub fn derive_key(skill: Skill, params: &GenerateParams) -> Result<CacheKey, KeyError> {
    if params.topic.trim().is_empty() {
        return Err(KeyError);
    }

    let mut extra: Vec<String> = Vec::new();
    if let Some(v) = params.prefer_type.as_deref().filter(|v| !v.is_empty()) {
        extra.push(format!("prefer_type:{v}"));
    }
    if let Some(v) = params.task_type.as_deref().filter(|v| !v.is_empty()) {
        extra.push(format!("task_type:{v}"));
    }
    if let Some(v) = params.interaction_type.as_deref().filter(|v| !v.is_empty()) {
        extra.push(format!("interaction_type:{v}"));
    }
    if let Some(v) = params.item_id_start {
        extra.push(format!("item_id_start:{v}"));
    }

    let base = format!("{}_{}_{}", skill, params.level, params.topic);
    Ok(CacheKey(if extra.is_empty() {
        base
    } else {
        format!("{}_{}", base, extra.join("_"))
    }))
}

/// Versioned envelope wrapping every cached payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub version: String,
    /// Write time, epoch milliseconds. Drives eviction ordering only.
    pub timestamp: i64,
    pub data: T,
}

/// Best-effort cache over an injected storage backend.
#[derive(Clone)]
pub struct CacheStore {
    backend: Arc<dyn StorageBackend>,
}

impl CacheStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Read a cached payload. Any backend or envelope failure is logged
    /// and treated as a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let storage_key = format!("{CACHE_PREFIX}{key}");
        let raw = match self.backend.get_item(&storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(%key, error = %e, "cache read failed");
                return None;
            }
        };
        match serde_json::from_str::<CacheEntry<T>>(&raw) {
            Ok(entry) => Some(entry.data),
            Err(e) => {
                warn!(%key, error = %e, "discarding unreadable cache entry");
                None
            }
        }
    }

    /// Write a payload under `key`, wrapped in a versioned envelope.
    ///
    /// A quota failure triggers eviction of the oldest entries but the
    /// write is not retried within this call; the next write may succeed.
    pub fn set<T: Serialize>(&self, key: &CacheKey, data: &T) {
        let entry = CacheEntry {
            version: CACHE_VERSION.to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            data,
        };
        let serialized = match serde_json::to_string(&entry) {
            Ok(s) => s,
            Err(e) => {
                warn!(%key, error = %e, "failed to serialize cache entry");
                return;
            }
        };
        let storage_key = format!("{CACHE_PREFIX}{key}");
        match self.backend.set_item(&storage_key, &serialized) {
            Ok(()) => {}
            Err(StorageError::QuotaExceeded) => {
                warn!(%key, "cache write hit storage quota, evicting oldest entries");
                self.evict_oldest();
            }
            Err(e) => warn!(%key, error = %e, "cache write failed"),
        }
    }

    /// Remove every entry under this store's namespace.
    pub fn clear(&self) {
        let keys = match self.backend.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "cache clear failed to list keys");
                return;
            }
        };
        for key in keys.iter().filter(|k| k.starts_with(CACHE_PREFIX)) {
            if let Err(e) = self.backend.remove_item(key) {
                warn!(%key, error = %e, "cache clear failed to remove entry");
            }
        }
    }

    /// Drop the oldest half of the namespace, by envelope timestamp, if
    /// more than `EVICTION_THRESHOLD` entries are present. Reactive only;
    /// there is no background sweep.
    fn evict_oldest(&self) {
        let keys = match self.backend.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "eviction failed to list keys");
                return;
            }
        };

        let mut stamped: Vec<(String, i64)> = Vec::new();
        for key in keys.into_iter().filter(|k| k.starts_with(CACHE_PREFIX)) {
            let timestamp = match self.backend.get_item(&key) {
                Ok(Some(raw)) => serde_json::from_str::<serde_json::Value>(&raw)
                    .ok()
                    .and_then(|v| v.get("timestamp").and_then(|t| t.as_i64()))
                    .unwrap_or(0),
                _ => 0,
            };
            stamped.push((key, timestamp));
        }

        if stamped.len() <= EVICTION_THRESHOLD {
            return;
        }

        stamped.sort_by_key(|(_, timestamp)| *timestamp);
        let to_remove = stamped.len() / 2;
        for (key, _) in stamped.into_iter().take(to_remove) {
            if let Err(e) = self.backend.remove_item(&key) {
                warn!(%key, error = %e, "eviction failed to remove entry");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use germanprep_core::model::Level;

    fn store_with_backend() -> (CacheStore, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        (CacheStore::new(backend.clone()), backend)
    }

    #[test]
    fn derive_key_is_deterministic() {
        let params = GenerateParams::new("Reisen", Level::B1)
            .with_prefer_type("TextMatch")
            .with_item_id_start(10);
        let a = derive_key(Skill::Reading, &params).unwrap();
        let b = derive_key(Skill::Reading, &params).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            a.as_str(),
            "reading_B1_Reisen_prefer_type:TextMatch_item_id_start:10"
        );
    }

    #[test]
    fn derive_key_changes_with_discriminator_value() {
        let base = GenerateParams::new("Arbeit", Level::A2);
        let with_start = base.clone().with_item_id_start(1);
        let with_other_start = base.clone().with_item_id_start(2);

        let plain = derive_key(Skill::Writing, &base).unwrap();
        let k1 = derive_key(Skill::Writing, &with_start).unwrap();
        let k2 = derive_key(Skill::Writing, &with_other_start).unwrap();
        assert_ne!(plain, k1);
        assert_ne!(k1, k2);
    }

    #[test]
    fn derive_key_skips_empty_discriminators() {
        let params = GenerateParams::new("Essen", Level::A1).with_prefer_type("");
        let key = derive_key(Skill::Reading, &params).unwrap();
        assert_eq!(key.as_str(), "reading_A1_Essen");
    }

    #[test]
    fn derive_key_rejects_empty_topic() {
        let params = GenerateParams::new("  ", Level::A1);
        assert_eq!(derive_key(Skill::Listening, &params), Err(KeyError));
    }

    #[test]
    fn set_then_get_round_trips() {
        let (store, _) = store_with_backend();
        let key = derive_key(Skill::Listening, &GenerateParams::new("Wetter", Level::A1)).unwrap();

        let data = vec!["eins".to_string(), "zwei".to_string()];
        store.set(&key, &data);
        assert_eq!(store.get::<Vec<String>>(&key), Some(data));
    }

    #[test]
    fn get_treats_garbage_as_miss() {
        let (store, backend) = store_with_backend();
        let key = derive_key(Skill::Listening, &GenerateParams::new("Wetter", Level::A1)).unwrap();
        backend
            .set_item(&format!("{CACHE_PREFIX}{key}"), "not json at all")
            .unwrap();
        assert_eq!(store.get::<Vec<String>>(&key), None);
    }

    #[test]
    fn clear_only_touches_namespace() {
        let (store, backend) = store_with_backend();
        let key = derive_key(Skill::Speaking, &GenerateParams::new("Hobbys", Level::B2)).unwrap();
        store.set(&key, &vec![1, 2, 3]);
        backend.set_item("unrelated", "survives").unwrap();

        store.clear();
        assert_eq!(store.get::<Vec<i32>>(&key), None);
        assert_eq!(backend.get_item("unrelated").unwrap().as_deref(), Some("survives"));
    }

    #[test]
    fn quota_failure_evicts_oldest_half() {
        let (store, backend) = store_with_backend();

        // 21 entries with distinct ascending timestamps, written directly
        // so the timestamps are under test control.
        for i in 1..=21 {
            let envelope = format!(r#"{{"version":"1.0","timestamp":{i},"data":["q{i}"]}}"#);
            backend
                .set_item(&format!("{CACHE_PREFIX}entry_{i}"), &envelope)
                .unwrap();
        }

        // Freeze the quota at the current size so the next write fails.
        backend.set_quota(Some(backend.used_bytes()));
        let key = derive_key(Skill::Reading, &GenerateParams::new("Neu", Level::B1)).unwrap();
        store.set(&key, &vec!["new".to_string()]);

        // floor(21 / 2) = 10 oldest removed, 11 survivors, and the failed
        // write was not retried.
        assert_eq!(backend.len(), 11);
        for i in 1..=10 {
            assert_eq!(
                backend
                    .get_item(&format!("{CACHE_PREFIX}entry_{i}"))
                    .unwrap(),
                None,
                "entry_{i} should have been evicted"
            );
        }
        for i in 11..=21 {
            assert!(backend
                .get_item(&format!("{CACHE_PREFIX}entry_{i}"))
                .unwrap()
                .is_some());
        }
        assert_eq!(store.get::<Vec<String>>(&key), None);
    }

    #[test]
    fn no_eviction_at_or_below_threshold() {
        let (store, backend) = store_with_backend();
        for i in 1..=20 {
            let envelope = format!(r#"{{"version":"1.0","timestamp":{i},"data":[]}}"#);
            backend
                .set_item(&format!("{CACHE_PREFIX}entry_{i}"), &envelope)
                .unwrap();
        }
        backend.set_quota(Some(backend.used_bytes()));
        let key = derive_key(Skill::Reading, &GenerateParams::new("Neu", Level::B1)).unwrap();
        store.set(&key, &vec!["new".to_string()]);

        assert_eq!(backend.len(), 20);
    }

    #[test]
    fn entries_without_timestamp_sort_oldest() {
        let (store, backend) = store_with_backend();
        backend
            .set_item(&format!("{CACHE_PREFIX}broken"), "garbage")
            .unwrap();
        for i in 1..=20 {
            let envelope = format!(r#"{{"version":"1.0","timestamp":{i},"data":[]}}"#);
            backend
                .set_item(&format!("{CACHE_PREFIX}entry_{i}"), &envelope)
                .unwrap();
        }
        backend.set_quota(Some(backend.used_bytes()));
        let key = derive_key(Skill::Reading, &GenerateParams::new("Neu", Level::B1)).unwrap();
        store.set(&key, &vec!["new".to_string()]);

        // 21 candidates, 10 evicted; the unparseable entry counts as epoch 0
        // and goes first.
        assert_eq!(backend.len(), 11);
        assert_eq!(
            backend.get_item(&format!("{CACHE_PREFIX}broken")).unwrap(),
            None
        );
    }
}
