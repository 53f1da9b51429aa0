//! The `germanprep cache` subcommands.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use germanprep_cache::{CacheStore, FileBackend};
use germanprep_client::load_config_from;

pub fn execute_clear(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let backend = Arc::new(FileBackend::open(config.cache_file())?);
    CacheStore::new(backend).clear();
    println!("Cache cleared.");
    Ok(())
}
