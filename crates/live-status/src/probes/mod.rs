//! Platform probe set.
//!
//! One [`LiveProbe`] per platform, registered in a [`ProbeSet`] that
//! dispatches on [`Platform`]. Each probe pairs a fetch plan (which URLs, in
//! which order, through which path) with pure classification functions over
//! the raw payloads, so the heuristics can be exercised without a network.
//!
//! Classification matches literal markers in raw text before attempting any
//! structured parse. Responses are frequently partial, relay-mangled or not
//! the shape they claim to be, and a substring hit survives all of that.

pub mod kick;
pub mod tiktok;
pub mod twitch;
pub mod youtube;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::fetcher::STATUS_TIMEOUT;
use crate::platform::Platform;
use crate::relay::RelayResolver;
use crate::signal::{LiveSignal, ProbeResult};

/// Live check strategy for one platform.
///
/// Implementations never fail: every network, timeout or parse problem
/// becomes [`LiveSignal::Unknown`].
#[async_trait]
pub trait LiveProbe: Send + Sync {
    fn platform(&self) -> Platform;

    /// Extract a username from a profile URL on this platform.
    fn username_from_url(&self, url: &str) -> Option<String>;

    /// Check whether `username` is live. `username` is already normalized.
    async fn probe(&self, username: &str) -> ProbeResult;
}

/// Settings shared by the probes.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Deadline for direct requests to lightweight status endpoints.
    pub status_timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            status_timeout: STATUS_TIMEOUT,
        }
    }
}

/// Registry of probes keyed by platform.
pub struct ProbeSet {
    probes: HashMap<Platform, Arc<dyn LiveProbe>>,
}

impl ProbeSet {
    /// An empty set. Every lookup resolves to `Unknown`.
    pub fn empty() -> Self {
        Self {
            probes: HashMap::new(),
        }
    }

    /// The standard set: Twitch, Kick, TikTok and YouTube.
    pub fn new(relay: RelayResolver, config: ProbeConfig) -> Self {
        Self::empty()
            .with_probe(Arc::new(twitch::TwitchProbe::new(
                relay.clone(),
                config.status_timeout,
            )))
            .with_probe(Arc::new(kick::KickProbe::new(relay.clone())))
            .with_probe(Arc::new(tiktok::TikTokProbe::new(relay.clone())))
            .with_probe(Arc::new(youtube::YouTubeProbe::new(relay)))
    }

    /// Register (or replace) the probe for its platform.
    pub fn with_probe(mut self, probe: Arc<dyn LiveProbe>) -> Self {
        self.probes.insert(probe.platform(), probe);
        self
    }

    pub fn supports(&self, platform: Platform) -> bool {
        self.probes.contains_key(&platform)
    }

    /// Username to probe for an account: the stored username if present,
    /// otherwise whatever the platform's URL pattern yields.
    pub fn resolve_username(
        &self,
        platform: Platform,
        username: &str,
        url: Option<&str>,
    ) -> Option<String> {
        let normalized = normalize_username(username);
        if !normalized.is_empty() {
            return Some(normalized.to_string());
        }
        let probe = self.probes.get(&platform)?;
        url.and_then(|u| probe.username_from_url(u))
            .map(|u| normalize_username(&u).to_string())
            .filter(|u| !u.is_empty())
    }

    /// Run the probe for `platform`. Unsupported platforms and blank
    /// usernames resolve to `Unknown` without touching the network.
    pub async fn probe(&self, platform: Platform, username: &str) -> ProbeResult {
        let Some(probe) = self.probes.get(&platform) else {
            debug!(%platform, "No live probe for platform");
            return ProbeResult::unknown();
        };
        let username = normalize_username(username);
        if username.is_empty() {
            debug!(%platform, "Blank username, skipping probe");
            return ProbeResult::unknown();
        }

        let result = probe.probe(username).await;
        debug!(
            %platform,
            username,
            signal = %result.signal,
            evidence = result.evidence.as_deref().unwrap_or(""),
            "Probe finished"
        );
        result
    }

    pub async fn probe_live(&self, platform: Platform, username: &str) -> LiveSignal {
        self.probe(platform, username).await.signal
    }
}

impl std::fmt::Debug for ProbeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut platforms: Vec<_> = self.probes.keys().map(|p| p.as_str()).collect();
        platforms.sort_unstable();
        f.debug_struct("ProbeSet")
            .field("platforms", &platforms)
            .finish()
    }
}

/// Trim whitespace and a leading `@`.
pub fn normalize_username(username: &str) -> &str {
    username.trim().trim_start_matches('@').trim()
}

/// First marker from `markers` that occurs verbatim in `body`.
pub(crate) fn find_marker<'a>(body: &str, markers: &[&'a str]) -> Option<&'a str> {
    markers.iter().copied().find(|m| body.contains(m))
}

#[inline]
pub(crate) fn capture_group_1_owned(re: &Regex, input: &str) -> Option<String> {
    re.captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}
