//! Platform tags for social accounts.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Platform a social account lives on.
///
/// Only Twitch, Kick, TikTok and YouTube have a live probe; every other tag
/// resolves to [`LiveSignal::Unknown`](crate::LiveSignal::Unknown) without any
/// network traffic.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Platform {
    Youtube,
    Tiktok,
    Instagram,
    Kick,
    Twitch,
    #[serde(other)]
    Other,
}

impl Platform {
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }

    /// Whether a live probe exists for this platform.
    pub fn supports_live_probe(&self) -> bool {
        matches!(
            self,
            Platform::Twitch | Platform::Kick | Platform::Tiktok | Platform::Youtube
        )
    }

    /// Canonical public profile URL for a username, if the platform has one.
    pub fn profile_url(&self, username: &str) -> Option<String> {
        let username = username.trim().trim_start_matches('@');
        if username.is_empty() {
            return None;
        }
        match self {
            Platform::Youtube => Some(format!("https://www.youtube.com/@{username}")),
            Platform::Tiktok => Some(format!("https://www.tiktok.com/@{username}")),
            Platform::Instagram => Some(format!("https://www.instagram.com/{username}/")),
            Platform::Kick => Some(format!("https://kick.com/{username}")),
            Platform::Twitch => Some(format!("https://www.twitch.tv/{username}")),
            Platform::Other => None,
        }
    }
}
