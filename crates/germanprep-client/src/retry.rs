//! Bounded-retry fetch executor.
//!
//! Two failure classes share one attempt budget: transport errors (the
//! request never completed) and non-success HTTP statuses. Both wait a
//! fixed delay between attempts. A non-success response is not fatal: if
//! it is all we ever got, it is returned as the terminal result and the
//! caller branches on status. Only when every attempt raised a transport
//! error does the executor itself fail.
//!
//! No timeout or cancellation lives here; a hanging operation blocks the
//! whole sequence for as long as the underlying transport allows.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::ClientError;

/// Retry budget and pacing for one logical request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (`max_retries + 1` total attempts).
    pub max_retries: u32,
    /// Fixed delay between attempts. Not exponential.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }
}

/// Run `operation` up to `max_retries + 1` times.
///
/// Returns the first success response immediately. Otherwise returns the
/// last non-success response obtained, and only if no response was ever
/// obtained raises the last transport error.
pub async fn fetch_with_retry<F, Fut>(
    mut operation: F,
    policy: &RetryPolicy,
) -> Result<reqwest::Response, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut last_response: Option<reqwest::Response> = None;
    let mut last_error: Option<reqwest::Error> = None;

    for attempt in 0..=policy.max_retries {
        match operation().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => {
                warn!(
                    attempt = attempt + 1,
                    status = %response.status(),
                    "request returned non-success status"
                );
                last_response = Some(response);
            }
            Err(e) => {
                warn!(attempt = attempt + 1, error = %e, "request failed");
                last_error = Some(e);
            }
        }
        if attempt < policy.max_retries {
            tokio::time::sleep(policy.delay).await;
        }
    }

    if let Some(response) = last_response {
        return Ok(response);
    }
    Err(match last_error {
        Some(e) => ClientError::Transport(e.to_string()),
        None => ClientError::Transport("request failed after all retries".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(5))
    }

    /// A loopback URL nothing is listening on (bind, read the port, drop).
    fn refused_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{port}/")
    }

    #[tokio::test]
    async fn returns_success_immediately() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let response = fetch_with_retry(|| client.get(server.uri()).send(), &test_policy(2))
            .await
            .unwrap();
        assert!(response.status().is_success());
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn recovers_after_transport_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let bad = refused_url();
        let good = server.uri();
        let calls = AtomicU32::new(0);

        // Rejects on the first two attempts, succeeds on the third.
        let response = fetch_with_retry(
            || {
                let attempt = calls.fetch_add(1, Ordering::SeqCst);
                let url = if attempt < 2 { bad.clone() } else { good.clone() };
                client.get(url).send()
            },
            &test_policy(2),
        )
        .await
        .unwrap();

        assert!(response.status().is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhaustion_raises_last_transport_error() {
        let client = reqwest::Client::new();
        let bad = refused_url();
        let calls = AtomicU32::new(0);

        let err = fetch_with_retry(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                client.get(bad.clone()).send()
            },
            &test_policy(2),
        )
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[tokio::test]
    async fn non_success_is_returned_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let response = fetch_with_retry(|| client.get(server.uri()).send(), &test_policy(1))
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 500);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }
}
