//! germanprep-cache — Quota-aware question cache.
//!
//! A versioned cache over a pluggable, synchronous, string-keyed storage
//! backend. Mirrors the constraints of a browser-profile store: limited
//! capacity, best-effort writes, reactive eviction under quota pressure.
//! Cache failures are never correctness failures; everything here degrades
//! to a miss.

pub mod backend;
pub mod store;

pub use backend::{FileBackend, MemoryBackend, StorageBackend, StorageError};
pub use store::{derive_key, CacheEntry, CacheKey, CacheStore, KeyError};
