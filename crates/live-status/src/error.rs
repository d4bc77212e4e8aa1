use std::time::Duration;

use thiserror::Error;

/// Failure of a single fetch or of a whole relay run.
///
/// These errors stay inside the probing layer; probes turn every one of them
/// into [`LiveSignal::Unknown`](crate::LiveSignal::Unknown).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out after {}ms", timeout.as_millis())]
    Timeout { url: String, timeout: Duration },

    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("transport error for {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("request failed with HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("operation cancelled")]
    Cancelled,

    #[error("no relay returned usable content after {attempts} attempt(s)")]
    RelaysExhausted { attempts: u32 },
}

impl FetchError {
    pub fn transport(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error came from the deadline rather than the network.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Network(e) => e.is_timeout(),
            _ => false,
        }
    }
}
