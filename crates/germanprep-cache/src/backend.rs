//! Storage backend trait and the two shipped implementations.
//!
//! The backend contract is deliberately small and synchronous: a quota
//! limited, string-keyed store scoped to one user profile. `MemoryBackend`
//! doubles as the test backend (its quota can be tightened at runtime to
//! force write failures); `FileBackend` persists the map as one JSON file.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

/// Errors a storage backend can report.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The write would exceed the backend's capacity.
    #[error("storage quota exceeded")]
    QuotaExceeded,

    /// Any other backend failure.
    #[error("storage error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e.to_string())
    }
}

/// A synchronous, string-keyed persistent store.
///
/// Implementations must be safe to share across tasks; writers to the same
/// key race (last writer wins) and no locking discipline is imposed beyond
/// per-call atomicity.
pub trait StorageBackend: Send + Sync {
    /// Read a value, `None` if the key is absent.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value. Fails with `QuotaExceeded` when capacity would be
    /// exceeded; the store is left unchanged in that case.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// All keys currently present, in no particular order.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

struct MemoryInner {
    entries: HashMap<String, String>,
    quota_bytes: Option<usize>,
}

/// In-memory backend with an optional byte quota.
///
/// Size accounting is the sum of key and value lengths, which is close
/// enough to how browser storage quotas behave for our purposes.
pub struct MemoryBackend {
    inner: Mutex<MemoryInner>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MemoryInner {
                entries: HashMap::new(),
                quota_bytes: None,
            }),
        }
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            inner: Mutex::new(MemoryInner {
                entries: HashMap::new(),
                quota_bytes: Some(quota_bytes),
            }),
        }
    }

    /// Tighten or loosen the quota after construction.
    pub fn set_quota(&self, quota_bytes: Option<usize>) {
        self.inner.lock().unwrap().quota_bytes = quota_bytes;
    }

    /// Current accounted size in bytes.
    pub fn used_bytes(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner
            .entries
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.inner.lock().unwrap().entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(quota) = inner.quota_bytes {
            let current: usize = inner
                .entries
                .iter()
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let replaced = inner
                .entries
                .get(key)
                .map(|v| key.len() + v.len())
                .unwrap_or(0);
            if current - replaced + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }
        inner.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.inner.lock().unwrap().entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.inner.lock().unwrap().entries.keys().cloned().collect())
    }
}

/// File-backed store: the whole key space serialized as one JSON object,
/// rewritten on every mutation. Good enough for a few hundred cache
/// entries per profile.
pub struct FileBackend {
    path: PathBuf,
    quota_bytes: Option<u64>,
    entries: Mutex<HashMap<String, String>>,
}

impl FileBackend {
    /// Open (or create) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        Self::open_inner(path.into(), None)
    }

    /// Open with a cap on the serialized file size.
    pub fn with_quota(path: impl Into<PathBuf>, quota_bytes: u64) -> Result<Self, StorageError> {
        Self::open_inner(path.into(), Some(quota_bytes))
    }

    fn open_inner(path: PathBuf, quota_bytes: Option<u64>) -> Result<Self, StorageError> {
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| StorageError::Io(format!("corrupt store file: {e}")))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            quota_bytes,
            entries: Mutex::new(entries),
        })
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(entries)
            .map_err(|e| StorageError::Io(e.to_string()))?;
        if let Some(quota) = self.quota_bytes {
            if serialized.len() as u64 > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serialized)?;
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap();
        let previous = entries.insert(key.to_string(), value.to_string());
        match self.persist(&entries) {
            Ok(()) => Ok(()),
            Err(e) => {
                // Roll back so the in-memory view matches the file.
                match previous {
                    Some(v) => entries.insert(key.to_string(), v),
                    None => entries.remove(key),
                };
                Err(e)
            }
        }
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap();
        if let Some(previous) = entries.remove(key) {
            if let Err(e) = self.persist(&entries) {
                // Roll back so the in-memory view matches the file.
                entries.insert(key.to_string(), previous);
                return Err(e);
            }
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.lock().unwrap().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_round_trip() {
        let backend = MemoryBackend::new();
        backend.set_item("a", "1").unwrap();
        assert_eq!(backend.get_item("a").unwrap().as_deref(), Some("1"));
        backend.remove_item("a").unwrap();
        assert_eq!(backend.get_item("a").unwrap(), None);
    }

    #[test]
    fn memory_quota_rejects_and_leaves_store_unchanged() {
        let backend = MemoryBackend::with_quota(10);
        backend.set_item("ab", "cdef").unwrap(); // 6 bytes
        let err = backend.set_item("gh", "ijklmn").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded));
        assert_eq!(backend.len(), 1);

        // Replacing an existing value only counts the delta.
        backend.set_item("ab", "cdefgh").unwrap(); // 8 bytes total
        assert_eq!(backend.get_item("ab").unwrap().as_deref(), Some("cdefgh"));
    }

    #[test]
    fn memory_quota_can_be_tightened() {
        let backend = MemoryBackend::new();
        backend.set_item("k", "value").unwrap();
        backend.set_quota(Some(backend.used_bytes()));
        assert!(matches!(
            backend.set_item("k2", "v"),
            Err(StorageError::QuotaExceeded)
        ));
    }

    #[test]
    fn file_backend_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let backend = FileBackend::open(&path).unwrap();
        backend.set_item("key", "value").unwrap();
        drop(backend);

        let reopened = FileBackend::open(&path).unwrap();
        assert_eq!(reopened.get_item("key").unwrap().as_deref(), Some("value"));
        assert_eq!(reopened.keys().unwrap(), vec!["key".to_string()]);
    }

    #[test]
    fn file_backend_failed_remove_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let backend = FileBackend::open(&path).unwrap();
        backend.set_item("key", "value").unwrap();

        // Make the next persist fail: put a directory where the file was.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(backend.remove_item("key").is_err());
        // The in-memory view still matches what the file last held.
        assert_eq!(backend.get_item("key").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn file_backend_quota_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let backend = FileBackend::with_quota(&path, 24).unwrap();
        backend.set_item("a", "1").unwrap();
        let err = backend
            .set_item("b", "a much longer value that will not fit")
            .unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded));
        assert_eq!(backend.get_item("b").unwrap(), None);
        assert_eq!(backend.get_item("a").unwrap().as_deref(), Some("1"));
    }
}
