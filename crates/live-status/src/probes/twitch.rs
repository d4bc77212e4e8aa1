use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use super::{LiveProbe, capture_group_1_owned, find_marker};
use crate::fetcher::fetch_bounded;
use crate::platform::Platform;
use crate::relay::RelayResolver;
use crate::signal::ProbeResult;

pub static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.|m\.)?twitch\.tv/([A-Za-z0-9_]+)").unwrap()
});

static DURATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\d+[hms]|\d+ (?:hour|minute|second)").unwrap()
});

/// Plain-text uptime lookup by login.
const UPTIME_URL: &str = "https://decapi.me/twitch/uptime/";
const PROFILE_URL: &str = "https://www.twitch.tv/";

/// Uptime replies at least this long are not status strings.
const MAX_STATUS_LEN: usize = 50;

const ERROR_HINTS: &[&str] = &[
    "error",
    "invalid",
    "rate limit",
    "too many",
    "unavailable",
    "could not",
    "cannot",
];

const PROFILE_LIVE_MARKERS: &[&str] = &[
    "\"isLiveBroadcast\":true",
    "\"isLive\":true",
    "\"type\":\"live\"",
];

const PROFILE_OFFLINE_MARKERS: &[&str] = &[
    "\"isLive\":false",
    "\"isLiveBroadcast\":false",
    "channel-status-info--offline",
    "offline-player",
];

/// Classify an uptime reply.
///
/// `None` means the reply is empty, an error or otherwise unusable and the
/// profile page should be consulted instead.
pub fn classify_uptime(text: &str) -> Option<ProbeResult> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lower = trimmed.to_lowercase();
    if lower.contains("offline") || lower.contains("not found") {
        return Some(ProbeResult::offline(trimmed));
    }

    if trimmed.starts_with(['<', '{', '[']) || ERROR_HINTS.iter().any(|h| lower.contains(h)) {
        return None;
    }

    if DURATION_REGEX.is_match(trimmed) {
        return Some(ProbeResult::live(trimmed));
    }

    // Any other short reply is a live status string.
    if trimmed.chars().count() < MAX_STATUS_LEN {
        return Some(ProbeResult::live(trimmed));
    }

    None
}

/// Classify a relay-fetched channel page.
pub fn classify_profile_html(body: &str) -> ProbeResult {
    if let Some(marker) = find_marker(body, PROFILE_LIVE_MARKERS) {
        return ProbeResult::live(marker);
    }
    if let Some(marker) = find_marker(body, PROFILE_OFFLINE_MARKERS) {
        return ProbeResult::offline(marker);
    }
    ProbeResult::unknown()
}

pub struct TwitchProbe {
    relay: RelayResolver,
    status_timeout: Duration,
}

impl TwitchProbe {
    pub fn new(relay: RelayResolver, status_timeout: Duration) -> Self {
        Self {
            relay,
            status_timeout,
        }
    }

    async fn check_uptime(&self, username: &str) -> Option<ProbeResult> {
        let url = format!("{UPTIME_URL}{}", urlencoding::encode(username));
        match fetch_bounded(self.relay.transport().as_ref(), &url, self.status_timeout)
            .await
            .and_then(|response| response.error_for_status(&url))
        {
            Ok(response) => classify_uptime(&response.body),
            Err(e) => {
                debug!(username, error = %e, "Uptime lookup failed");
                None
            }
        }
    }
}

#[async_trait]
impl LiveProbe for TwitchProbe {
    fn platform(&self) -> Platform {
        Platform::Twitch
    }

    fn username_from_url(&self, url: &str) -> Option<String> {
        capture_group_1_owned(&URL_REGEX, url.trim())
    }

    async fn probe(&self, username: &str) -> ProbeResult {
        if let Some(result) = self.check_uptime(username).await {
            return result;
        }

        let profile_url = format!("{PROFILE_URL}{username}");
        match self.relay.fetch(&profile_url).await {
            Some(body) => classify_profile_html(&body),
            None => ProbeResult::unknown(),
        }
    }
}
