//! Short profile blurbs scraped from a creator's linked pages.
//!
//! Descriptive meta tags are preferred; the first long paragraph is the
//! fallback. The result is plain text, whitespace-collapsed and capped at
//! [`SUMMARY_LENGTH`] characters.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::avatar::PLATFORM_PRIORITY;
use crate::platform::Platform;
use crate::relay::RelayResolver;

pub const SUMMARY_LENGTH: usize = 220;

const MIN_META_LENGTH: usize = 30;

fn meta_regex(key: &str) -> Regex {
    Regex::new(&format!(
        r#"(?i)<meta[^>]+(?:property|name)=["']{key}["'][^>]*content=["']([^"']+)["']"#
    ))
    .unwrap()
}

/// Checked in order; the first one long enough wins.
static META_REGEXES: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        meta_regex("og:description"),
        meta_regex("twitter:description"),
        meta_regex("description"),
        meta_regex("og:title"),
    ]
});

static PARAGRAPH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<p[^>]*>([^<]{40,}?)</p>").unwrap());

static NBSP_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)&nbsp;").unwrap());
static AMP_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)&amp;").unwrap());
static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

fn normalize_text(value: &str) -> String {
    let value = NBSP_REGEX.replace_all(value, " ");
    let value = AMP_REGEX.replace_all(&value, "&");
    let value = TAG_REGEX.replace_all(&value, "");
    WHITESPACE_REGEX.replace_all(&value, " ").trim().to_string()
}

/// Cap at [`SUMMARY_LENGTH`] characters, ellipsis included.
fn truncate(value: String) -> String {
    if value.chars().count() <= SUMMARY_LENGTH {
        return value;
    }
    let head: String = value.chars().take(SUMMARY_LENGTH - 3).collect();
    format!("{}…", head.trim_end())
}

fn extract_from_meta(html: &str) -> Option<String> {
    META_REGEXES.iter().find_map(|re| {
        let content = re.captures(html)?.get(1)?.as_str();
        let text = normalize_text(content);
        (text.chars().count() >= MIN_META_LENGTH).then(|| truncate(text))
    })
}

fn extract_paragraph(html: &str) -> Option<String> {
    let text = PARAGRAPH_REGEX.captures(html)?.get(1)?.as_str();
    Some(truncate(normalize_text(text))).filter(|text| !text.is_empty())
}

/// Build a summary from a profile page, or `None` when nothing usable is
/// present.
pub fn extract_summary(html: &str) -> Option<String> {
    extract_from_meta(html).or_else(|| extract_paragraph(html))
}

/// Fetch one profile page through the relays (single pass) and summarise it.
pub async fn fetch_social_summary(relay: &RelayResolver, url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    let Some(html) = relay.fetch_via_relay(url, 0).await else {
        debug!(url, "No page retrieved for summary");
        return None;
    };
    extract_summary(&html)
}

/// Walk `accounts` in [`PLATFORM_PRIORITY`] order and return the first
/// summary found.
pub async fn grab_summary<'a, I>(relay: &RelayResolver, accounts: I) -> Option<String>
where
    I: IntoIterator<Item = (Platform, &'a str)>,
{
    let accounts: Vec<(Platform, &str)> = accounts
        .into_iter()
        .filter(|(_, url)| !url.trim().is_empty())
        .collect();

    for platform in PLATFORM_PRIORITY {
        for (_, url) in accounts.iter().filter(|(p, _)| *p == platform) {
            if let Some(summary) = fetch_social_summary(relay, url).await {
                debug!(%platform, url, "Found summary");
                return Some(summary);
            }
        }
    }
    None
}
