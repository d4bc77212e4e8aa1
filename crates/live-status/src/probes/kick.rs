use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::{LiveProbe, capture_group_1_owned};
use crate::platform::Platform;
use crate::relay::RelayResolver;
use crate::signal::ProbeResult;

pub static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.)?kick\.com/([A-Za-z0-9_-]+)").unwrap()
});

static IS_LIVE_TRUE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""is_live"\s*:\s*true"#).unwrap());

static IS_LIVE_FALSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""is_live"\s*:\s*false"#).unwrap());

static LIVESTREAM_NULL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""livestream"\s*:\s*null"#).unwrap());

const API_URL: &str = "https://kick.com/api/v2/channels/";
const PROFILE_URL: &str = "https://kick.com/";

/// Raw-text checks shared by the API payload and the profile page.
///
/// A true `is_live` flag anywhere in the text wins over any false one, even
/// when the surrounding JSON is truncated or malformed. Past-stream entries
/// carry their own `is_live:false` and may come first.
pub fn classify_text(body: &str) -> Option<ProbeResult> {
    if let Some(m) = IS_LIVE_TRUE_REGEX.find(body) {
        return Some(ProbeResult::live(m.as_str()));
    }
    if let Some(m) = IS_LIVE_FALSE_REGEX.find(body) {
        return Some(ProbeResult::offline(m.as_str()));
    }
    if let Some(m) = LIVESTREAM_NULL_REGEX.find(body) {
        return Some(ProbeResult::offline(m.as_str()));
    }
    None
}

/// Classify the channel API payload: raw-text checks first, then a
/// structured look at the `livestream` object.
pub fn classify_channel_api(body: &str) -> Option<ProbeResult> {
    if let Some(result) = classify_text(body) {
        return Some(result);
    }

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "Kick channel payload is not JSON");
            return None;
        }
    };

    match value.get("livestream") {
        Some(Value::Null) => Some(ProbeResult::offline("livestream: null")),
        Some(livestream) => match livestream.get("is_live").and_then(Value::as_bool) {
            Some(true) => Some(ProbeResult::live("livestream.is_live: true")),
            Some(false) => Some(ProbeResult::offline("livestream.is_live: false")),
            None => None,
        },
        None => None,
    }
}

pub struct KickProbe {
    relay: RelayResolver,
}

impl KickProbe {
    pub fn new(relay: RelayResolver) -> Self {
        Self { relay }
    }
}

#[async_trait]
impl LiveProbe for KickProbe {
    fn platform(&self) -> Platform {
        Platform::Kick
    }

    fn username_from_url(&self, url: &str) -> Option<String> {
        capture_group_1_owned(&URL_REGEX, url.trim())
    }

    async fn probe(&self, username: &str) -> ProbeResult {
        let api_url = format!("{API_URL}{username}");
        if let Some(result) = self
            .relay
            .fetch(&api_url)
            .await
            .and_then(|body| classify_channel_api(&body))
        {
            return result;
        }

        let profile_url = format!("{PROFILE_URL}{username}");
        self.relay
            .fetch(&profile_url)
            .await
            .and_then(|body| classify_text(&body))
            .unwrap_or_default()
    }
}
