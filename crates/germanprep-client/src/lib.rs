//! germanprep-client — Typed client for the exam content service.
//!
//! Orchestrates the content-access flow: derive a cache key, consult the
//! cache, otherwise fetch with bounded retry, normalize the upstream
//! payload, cache the result, return it. Validation calls (writing and
//! speaking) bypass the cache entirely.

pub mod client;
pub mod config;
pub mod error;
pub mod retry;

pub use client::ContentClient;
pub use config::{load_config, load_config_from, CacheSettings, ClientConfig};
pub use error::ClientError;
pub use retry::{fetch_with_retry, RetryPolicy};
