//! Proxy relay resolution.
//!
//! Direct requests to the platforms are blocked or rate-limited, so pages are
//! fetched through third-party relays. Relays are unreliable: every attempt
//! walks the templates in priority order and the first plausible body wins.
//! Running out of relays is a normal outcome and yields `None`.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::fetcher::{PAGE_TIMEOUT, fetch_bounded};
use crate::retry::{RetryAction, RetryPolicy, retry_with_backoff};
use crate::transport::HttpTransport;

/// Bodies shorter than this are relay error stubs or rate-limit pages.
pub const MIN_BODY_LEN: usize = 50;

/// How a relay expects the target URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayKind {
    /// `prefix` followed by the percent-encoded target URL.
    Query,
    /// `prefix` followed by the target URL with its scheme removed.
    Path,
}

/// One relay endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayTemplate {
    pub name: String,
    pub kind: RelayKind,
    pub prefix: String,
}

impl RelayTemplate {
    pub fn new(name: impl Into<String>, kind: RelayKind, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            prefix: prefix.into(),
        }
    }

    /// Raw-HTML relay.
    pub fn allorigins() -> Self {
        Self::new("allorigins", RelayKind::Query, "https://api.allorigins.win/raw?url=")
    }

    /// Readability/extraction relay.
    pub fn jina() -> Self {
        Self::new("jina", RelayKind::Path, "https://r.jina.ai/http://")
    }

    /// Default relays in priority order.
    pub fn defaults() -> Vec<Self> {
        vec![Self::allorigins(), Self::jina()]
    }

    /// Rewrite `target_url` into this relay's request shape.
    pub fn build_url(&self, target_url: &str) -> String {
        let target = normalize_target(target_url);
        match self.kind {
            RelayKind::Query => format!("{}{}", self.prefix, urlencoding::encode(&target)),
            RelayKind::Path => format!("{}{}", self.prefix, strip_scheme(&target)),
        }
    }
}

fn normalize_target(url: &str) -> String {
    let url = url.trim();
    if has_scheme(url) {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

fn has_scheme(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn strip_scheme(url: &str) -> &str {
    url.find("://").map(|idx| &url[idx + 3..]).unwrap_or(url)
}

/// Fetches remote content through an ordered list of relays.
#[derive(Clone)]
pub struct RelayResolver {
    transport: Arc<dyn HttpTransport>,
    templates: Vec<RelayTemplate>,
    timeout: Duration,
    min_body_len: usize,
    policy: RetryPolicy,
    cancel: CancellationToken,
}

impl RelayResolver {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            templates: RelayTemplate::defaults(),
            timeout: PAGE_TIMEOUT,
            min_body_len: MIN_BODY_LEN,
            policy: RetryPolicy::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_templates(mut self, templates: Vec<RelayTemplate>) -> Self {
        self.templates = templates;
        self
    }

    /// Per-relay request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_min_body_len(mut self, min_body_len: usize) -> Self {
        self.min_body_len = min_body_len;
        self
    }

    /// Retry count and backoff unit used by [`RelayResolver::fetch`].
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Stop retrying (and sleeping) once `token` fires.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn templates(&self) -> &[RelayTemplate] {
        &self.templates
    }

    pub fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }

    /// [`fetch_via_relay`](Self::fetch_via_relay) with the configured retry count.
    pub async fn fetch(&self, target_url: &str) -> Option<String> {
        self.fetch_via_relay(target_url, self.policy.max_retries)
            .await
    }

    /// Retrieve `target_url` through the relays, making `max_retries + 1`
    /// passes over the whole template list.
    ///
    /// Never fails: `None` means no relay produced usable content.
    pub async fn fetch_via_relay(&self, target_url: &str, max_retries: u32) -> Option<String> {
        if self.templates.is_empty() {
            warn!("No relay endpoints configured");
            return None;
        }

        let policy = RetryPolicy {
            max_retries,
            ..self.policy.clone()
        };

        match retry_with_backoff(&policy, &self.cancel, move |attempt| {
            self.try_relays(target_url, attempt)
        })
        .await
        {
            Ok(body) => Some(body),
            Err(e) => {
                debug!(target_url, error = %e, "Relay resolution gave up");
                None
            }
        }
    }

    async fn try_relays(&self, target_url: &str, attempt: u32) -> RetryAction<String> {
        for template in &self.templates {
            let url = template.build_url(target_url);
            match fetch_bounded(self.transport.as_ref(), &url, self.timeout).await {
                Ok(response) if response.is_success() => {
                    let len = response.body.chars().count();
                    if len >= self.min_body_len {
                        debug!(relay = %template.name, target_url, len, "Relay returned content");
                        return RetryAction::Success(response.body);
                    }
                    debug!(relay = %template.name, target_url, len, "Relay body too short");
                }
                Ok(response) => {
                    debug!(
                        relay = %template.name,
                        target_url,
                        status = response.status,
                        "Relay returned error status"
                    );
                }
                Err(e) => {
                    debug!(relay = %template.name, target_url, error = %e, "Relay request failed");
                }
            }
        }

        RetryAction::Retry(FetchError::RelaysExhausted {
            attempts: attempt + 1,
        })
    }
}

impl std::fmt::Debug for RelayResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayResolver")
            .field("templates", &self.templates)
            .field("timeout", &self.timeout)
            .field("min_body_len", &self.min_body_len)
            .field("policy", &self.policy)
            .finish()
    }
}
