use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::{LiveProbe, capture_group_1_owned, find_marker};
use crate::platform::Platform;
use crate::relay::RelayResolver;
use crate::signal::ProbeResult;

pub static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.|m\.)?youtube\.com/@([A-Za-z0-9_.-]+)").unwrap()
});

const BASE_URL: &str = "https://www.youtube.com/@";

const LIVE_MARKERS: &[&str] = &[
    r#""isLive":true"#,
    r#""isLiveBroadcast":true"#,
    r#""isLiveNow":true"#,
    "BADGE_STYLE_TYPE_LIVE_NOW",
    "LIVE NOW",
];

const OFFLINE_MARKERS: &[&str] = &[r#""isLive":false"#, "No live stream"];

/// Live markers are checked before offline ones; the `/live` page of an
/// idle channel still embeds `"isLive":false` entries for past videos.
pub fn classify_live_page(body: &str) -> ProbeResult {
    if let Some(marker) = find_marker(body, LIVE_MARKERS) {
        return ProbeResult::live(marker);
    }
    if let Some(marker) = find_marker(body, OFFLINE_MARKERS) {
        return ProbeResult::offline(marker);
    }
    ProbeResult::unknown()
}

pub struct YouTubeProbe {
    relay: RelayResolver,
}

impl YouTubeProbe {
    pub fn new(relay: RelayResolver) -> Self {
        Self { relay }
    }
}

#[async_trait]
impl LiveProbe for YouTubeProbe {
    fn platform(&self) -> Platform {
        Platform::Youtube
    }

    fn username_from_url(&self, url: &str) -> Option<String> {
        capture_group_1_owned(&URL_REGEX, url.trim())
    }

    async fn probe(&self, username: &str) -> ProbeResult {
        let url = format!("{BASE_URL}{username}/live");
        self.relay
            .fetch(&url)
            .await
            .map(|body| classify_live_page(&body))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::rstest;

    use super::*;
    use crate::signal::LiveSignal;
    use crate::testing::{Reply, ScriptedTransport};

    #[rstest]
    #[case(r#"<meta itemprop="isLiveBroadcast"> {"isLiveBroadcast":true}"#, LiveSignal::Live)]
    #[case(r#"{"videoDetails":{"isLive":true,"isLiveContent":true}}"#, LiveSignal::Live)]
    #[case(r#""style":"BADGE_STYLE_TYPE_LIVE_NOW""#, LiveSignal::Live)]
    #[case(r#"{"isLive":false,"isLiveContent":true}"#, LiveSignal::Offline)]
    #[case("<p>No live stream right now</p>", LiveSignal::Offline)]
    #[case("<html>consent.youtube.com</html>", LiveSignal::Unknown)]
    fn test_classify_live_page(#[case] body: &str, #[case] expected: LiveSignal) {
        assert_eq!(classify_live_page(body).signal, expected);
    }

    #[test]
    fn test_live_marker_checked_first() {
        let body = r#"{"isLive":false} ... {"isLiveNow":true}"#;
        assert_eq!(classify_live_page(body).signal, LiveSignal::Live);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_uses_live_sub_path() {
        let body = format!("<p>No live stream</p>{}", "-".repeat(60));
        let transport = Arc::new(
            ScriptedTransport::new().route("https://api.allorigins.win/", Reply::ok(body)),
        );
        let probe = YouTubeProbe::new(RelayResolver::new(transport.clone()));

        assert_eq!(probe.probe("mkbhd").await.signal, LiveSignal::Offline);
        let requested = transport.requests();
        assert_eq!(requested.len(), 1);
        assert!(requested[0].ends_with(&*urlencoding::encode("https://www.youtube.com/@mkbhd/live")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_relay_failure_is_unknown() {
        let probe = YouTubeProbe::new(RelayResolver::new(Arc::new(ScriptedTransport::new())));
        assert_eq!(probe.probe("mkbhd").await.signal, LiveSignal::Unknown);
    }
}
