//! Profile-picture lookup from a creator's linked accounts.
//!
//! Pages are fetched through the relays with a single pass and scanned for
//! an `og:image` meta tag or an `image_src` link.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::platform::Platform;
use crate::relay::RelayResolver;

static OG_IMAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s+(?:property|name)="og:image"\s+content="([^"]+)""#).unwrap()
});

static IMAGE_SRC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<link\s+rel="image_src"\s+href="([^"]+)""#).unwrap());

pub const FALLBACK_AVATAR_BASE: &str = "https://api.dicebear.com/7.x/pixel-art/svg?seed=";

/// Platforms whose profile pages carry the most reliable avatars come first.
pub const PLATFORM_PRIORITY: [Platform; 6] = [
    Platform::Instagram,
    Platform::Youtube,
    Platform::Tiktok,
    Platform::Twitch,
    Platform::Kick,
    Platform::Other,
];

/// Pull an absolute image URL out of a profile page.
pub fn extract_og_image(html: &str) -> Option<String> {
    if let Some(url) = OG_IMAGE_REGEX
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().split('?').next().unwrap_or_default())
        .filter(|url| url.starts_with("http"))
    {
        return Some(url.to_string());
    }

    IMAGE_SRC_REGEX
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|url| url.starts_with("http"))
        .map(str::to_string)
}

/// Deterministic generated avatar used when no profile image is found.
pub fn fallback_avatar_url(seed: &str) -> String {
    format!("{FALLBACK_AVATAR_BASE}{}", urlencoding::encode(seed.trim()))
}

/// Walk `accounts` in [`PLATFORM_PRIORITY`] order and return the first
/// avatar found. Accounts without a URL are skipped.
pub async fn grab_avatar<'a, I>(relay: &RelayResolver, accounts: I) -> Option<String>
where
    I: IntoIterator<Item = (Platform, &'a str)>,
{
    let accounts: Vec<(Platform, &str)> = accounts
        .into_iter()
        .filter(|(_, url)| !url.trim().is_empty())
        .collect();

    for platform in PLATFORM_PRIORITY {
        for (_, url) in accounts.iter().filter(|(p, _)| *p == platform) {
            let Some(html) = relay.fetch_via_relay(url, 0).await else {
                debug!(url, "No page retrieved for avatar lookup");
                continue;
            };
            if let Some(avatar) = extract_og_image(&html) {
                debug!(%platform, url, %avatar, "Found avatar");
                return Some(avatar);
            }
        }
    }
    None
}
