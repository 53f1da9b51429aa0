//! Command implementations.

use std::sync::Arc;

use anyhow::Result;

use germanprep_cache::{FileBackend, MemoryBackend, StorageBackend};
use germanprep_client::{ClientConfig, ContentClient};

pub mod cache;
pub mod generate;
pub mod validate;

/// Build a client over the configured cache backend. With caching
/// disabled the backend is an in-memory store that dies with the process.
pub(crate) fn build_client(config: &ClientConfig) -> Result<ContentClient> {
    let backend: Arc<dyn StorageBackend> = if config.cache.enabled {
        Arc::new(FileBackend::with_quota(
            config.cache_file(),
            config.cache.max_bytes,
        )?)
    } else {
        Arc::new(MemoryBackend::new())
    };
    Ok(ContentClient::new(config, backend)?)
}
