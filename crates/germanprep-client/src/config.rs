//! Client configuration loading.
//!
//! Search order:
//! 1. `germanprep.toml` in the current directory
//! 2. `~/.config/germanprep/config.toml`
//!
//! Environment variable overrides: `GERMANPREP_BASE_URL`,
//! `GERMANPREP_CACHE_DIR`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

/// Top-level germanprep configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the content service.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Retries after the first attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Fixed delay between attempts in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Optional per-request timeout. Off by default: this layer does not
    /// enforce one.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Cache behavior.
    #[serde(default)]
    pub cache: CacheSettings,
}

/// Cache-related settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Directory holding the cache file. Defaults to
    /// `~/.cache/germanprep`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Storage quota in bytes for the cache file.
    #[serde(default = "default_cache_max_bytes")]
    pub max_bytes: u64,
}

fn default_base_url() -> String {
    "https://german.productafter.com".to_string()
}
fn default_max_retries() -> u32 {
    2
}
fn default_retry_delay() -> u64 {
    1000
}
fn default_true() -> bool {
    true
}
fn default_cache_max_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay(),
            timeout_secs: None,
            cache: CacheSettings::default(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            max_bytes: default_cache_max_bytes(),
        }
    }
}

impl ClientConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }

    /// Path of the persistent cache file.
    pub fn cache_file(&self) -> PathBuf {
        if let Some(dir) = &self.cache.dir {
            return dir.join("cache.json");
        }
        match std::env::var("HOME") {
            Ok(home) => PathBuf::from(home)
                .join(".cache")
                .join("germanprep")
                .join("cache.json"),
            Err(_) => PathBuf::from("germanprep-cache.json"),
        }
    }
}

/// Load configuration from the well-known paths.
pub fn load_config() -> Result<ClientConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ClientConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("germanprep.toml");
        if local.exists() {
            Some(local)
        } else if let Some(dir) = config_dir() {
            let global = dir.join("config.toml");
            global.exists().then_some(global)
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ClientConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ClientConfig::default(),
    };

    // Apply env var overrides
    if let Ok(url) = std::env::var("GERMANPREP_BASE_URL") {
        config.base_url = url;
    }
    if let Ok(dir) = std::env::var("GERMANPREP_CACHE_DIR") {
        config.cache.dir = Some(PathBuf::from(dir));
    }

    Ok(config)
}

fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("germanprep"))
}
