//! Client error taxonomy.
//!
//! Transport failures are retried by the fetch executor and only surface
//! here once retries exhaust with no response at all. Non-success HTTP
//! responses come back as values from the executor and are converted to
//! `HttpStatus` by the client. Parse failures are never retried. Cache and
//! storage failures have no variant on purpose: they are logged and
//! swallowed inside the cache layer.

use thiserror::Error;

/// Longest raw-body excerpt embedded in a parse error.
const PREVIEW_MAX_CHARS: usize = 200;

/// Errors surfaced by [`crate::ContentClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never completed, on any attempt.
    #[error("network error: {0}")]
    Transport(String),

    /// The service answered with a non-success status after retries.
    #[error("content service error (HTTP {status}): {detail}")]
    HttpStatus { status: u16, detail: String },

    /// The response body was not the JSON we expected.
    #[error("malformed response body: {preview}")]
    Parse { preview: String },

    /// The caller's input was rejected before any network call.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Bounded, char-safe excerpt of a response body for diagnostics.
pub(crate) fn preview(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= PREVIEW_MAX_CHARS {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(PREVIEW_MAX_CHARS).collect();
    format!("{}… ({} bytes total)", cut, trimmed.len())
}
