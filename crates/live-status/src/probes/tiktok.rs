use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::{LiveProbe, capture_group_1_owned, find_marker};
use crate::platform::Platform;
use crate::relay::RelayResolver;
use crate::signal::ProbeResult;

pub static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.|m\.)?tiktok\.com/@([A-Za-z0-9_.]+)").unwrap()
});

static ROOM_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""roomId"\s*:\s*"(\d+)""#).unwrap());

static STATUS_LIVE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""status"\s*:\s*4\s*[,}]"#).unwrap());

const BASE_URL: &str = "https://www.tiktok.com/@";

const LIVE_MARKERS: &[&str] = &[
    r#""liveRoom":{"#,
    r#""isLiveStreaming":true"#,
    r#""isLive":true"#,
    "LIVE NOW",
];

const OFFLINE_MARKERS: &[&str] = &[
    "LIVE_UNAVAILABLE",
    "live_unavailable",
    "LIVE has ended",
    r#""isLiveStreaming":false"#,
    r#""isLive":false"#,
];

/// Classify a `/@user/live` page.
///
/// Offline markers take precedence: a page carrying both is never reported
/// as live, since cached room fragments linger after a stream ends.
pub fn classify_live_page(body: &str) -> ProbeResult {
    if let Some(marker) = find_marker(body, OFFLINE_MARKERS) {
        return ProbeResult::offline(marker);
    }
    if let Some(marker) = find_marker(body, LIVE_MARKERS) {
        return ProbeResult::live(marker);
    }
    // Room status 4 is live; `"status":404` and friends are error stubs.
    if let Some(m) = STATUS_LIVE_REGEX.find(body) {
        return ProbeResult::live(m.as_str().trim_end_matches([',', '}']).trim_end());
    }
    if let Some(room_id) = ROOM_ID_REGEX
        .captures(body)
        .and_then(|caps| caps.get(1))
        .filter(|m| m.as_str() != "0")
    {
        return ProbeResult::live(format!("roomId {}", room_id.as_str()));
    }
    ProbeResult::unknown()
}

pub struct TikTokProbe {
    relay: RelayResolver,
}

impl TikTokProbe {
    pub fn new(relay: RelayResolver) -> Self {
        Self { relay }
    }
}

#[async_trait]
impl LiveProbe for TikTokProbe {
    fn platform(&self) -> Platform {
        Platform::Tiktok
    }

    fn username_from_url(&self, url: &str) -> Option<String> {
        capture_group_1_owned(&URL_REGEX, url.trim())
    }

    async fn probe(&self, username: &str) -> ProbeResult {
        let url = format!("{BASE_URL}{username}/live");
        match self.relay.fetch(&url).await {
            Some(body) => classify_live_page(&body),
            None => ProbeResult::unknown(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::rstest;

    use super::*;
    use crate::relay::RelayTemplate;
    use crate::signal::LiveSignal;
    use crate::testing::{Reply, ScriptedTransport};

    #[rstest]
    #[case(r#"{"LiveRoom":{"liveRoomUserInfo":{"user":{"status":4}}}}"#, LiveSignal::Live)]
    #[case(r#"<script>{"liveRoom":{"title":"late night"}}</script>"#, LiveSignal::Live)]
    #[case(r#"{"user":{"roomId":"7301234567890"}}"#, LiveSignal::Live)]
    #[case(r#"{"user":{"roomId":"0"}}"#, LiveSignal::Unknown)]
    #[case("<div>LIVE has ended</div>", LiveSignal::Offline)]
    #[case(r#"{"code":"LIVE_UNAVAILABLE"}"#, LiveSignal::Offline)]
    #[case("<html><title>TikTok</title></html>", LiveSignal::Unknown)]
    #[case(r#"{"statusCode":10222,"status":404,"message":"user not found"}"#, LiveSignal::Unknown)]
    #[case(r#"{"status":40,"msg":"rate limited"}"#, LiveSignal::Unknown)]
    #[case(r#"{"room":{"status" : 4 ,"id":1}}"#, LiveSignal::Live)]
    fn test_classify_live_page(#[case] body: &str, #[case] expected: LiveSignal) {
        assert_eq!(classify_live_page(body).signal, expected);
    }

    #[rstest]
    #[case(r#"{"liveRoom":{"status":4},"isLive":false}"#)]
    #[case(r#"{"isLiveStreaming":true} LIVE has ended"#)]
    #[case(r#"LIVE NOW <span>live_unavailable</span>"#)]
    fn test_offline_marker_beats_live_marker(#[case] body: &str) {
        assert_ne!(classify_live_page(body).signal, LiveSignal::Live);
    }

    #[test]
    fn test_not_found_stub_is_not_live() {
        let result = classify_live_page(r#"{"statusCode":10222,"status":404,"message":"user not found"}"#);
        assert_eq!(result.signal, LiveSignal::Unknown);
        assert_eq!(result.evidence, None);

        let result = classify_live_page(r#"{"user":{"status":4}}"#);
        assert_eq!(result.signal, LiveSignal::Live);
        assert_eq!(result.evidence.as_deref(), Some(r#""status":4"#));
    }

    #[test]
    fn test_username_from_url() {
        let probe = TikTokProbe::new(RelayResolver::new(Arc::new(ScriptedTransport::new())));
        assert_eq!(
            probe.username_from_url("https://www.tiktok.com/@the.rock?lang=en"),
            Some("the.rock".to_string())
        );
        assert_eq!(probe.username_from_url("https://www.tiktok.com/tag/cats"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_fetches_live_sub_path() {
        let body = format!(r#"{{"liveRoom":{{"status":4}}}}{}"#, " ".repeat(50));
        let transport = Arc::new(
            ScriptedTransport::new().route("https://r.jina.ai/http://www.tiktok.com/@", Reply::ok(body)),
        );
        let relay = RelayResolver::new(transport.clone()).with_templates(vec![RelayTemplate::jina()]);
        let probe = TikTokProbe::new(relay);

        assert_eq!(probe.probe("gamer").await.signal, LiveSignal::Live);
        assert_eq!(
            transport.requests(),
            vec!["https://r.jina.ai/http://www.tiktok.com/@gamer/live".to_string()]
        );
    }
}
