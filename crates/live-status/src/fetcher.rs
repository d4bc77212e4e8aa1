//! Timeout-bounded fetching.

use std::time::Duration;

use tracing::debug;

use crate::error::FetchError;
use crate::transport::{FetchResponse, HttpTransport};

/// Deadline for full page loads (profile and live pages).
pub const PAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Deadline for lightweight status endpoints.
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(5);

/// Issue a single request that fails with [`FetchError::Timeout`] once
/// `timeout` elapses.
///
/// When the deadline fires the request future is dropped, which cancels it.
/// Non-2xx responses are returned as-is; callers decide what counts as
/// success. No retries happen here.
pub async fn fetch_bounded(
    transport: &dyn HttpTransport,
    url: &str,
    timeout: Duration,
) -> Result<FetchResponse, FetchError> {
    match tokio::time::timeout(timeout, transport.get(url)).await {
        Ok(result) => result,
        Err(_) => {
            debug!(url, timeout_ms = timeout.as_millis() as u64, "Request timed out");
            Err(FetchError::Timeout {
                url: url.to_string(),
                timeout,
            })
        }
    }
}
