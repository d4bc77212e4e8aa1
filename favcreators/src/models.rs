//! Creator collection model.
//!
//! Field names follow the JSON layout the collection has always been
//! stored in: camelCase keys and epoch-millisecond timestamps.

use chrono::{DateTime, Utc};
use live_status::{LiveSignal, Platform};
use serde::{Deserialize, Serialize};

/// One presence of a creator on one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "AccountRecord")]
pub struct SocialAccount {
    pub id: String,
    pub platform: Platform,
    pub username: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followers: Option<String>,
    /// Last definitive or unknown signal. `None` until first checked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_status: Option<LiveSignal>,
    #[serde(
        serialize_with = "chrono::serde::ts_milliseconds_option::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_checked: Option<DateTime<Utc>>,
}

impl SocialAccount {
    /// A new account with a fresh id and the platform's canonical profile URL.
    pub fn new(platform: Platform, username: impl Into<String>) -> Self {
        let username = username.into();
        let url = platform.profile_url(&username).unwrap_or_default();
        Self {
            id: new_id(),
            platform,
            username,
            url,
            followers: None,
            live_status: None,
            last_checked: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_live_status(mut self, signal: LiveSignal) -> Self {
        self.live_status = Some(signal);
        self
    }

    pub fn is_live(&self) -> bool {
        self.live_status.is_some_and(|s| s.is_live())
    }
}

/// On-disk account shape. Older files carry a plain `isLive` boolean
/// instead of `liveStatus`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountRecord {
    #[serde(default)]
    id: String,
    platform: Platform,
    #[serde(default)]
    username: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    followers: Option<String>,
    #[serde(default)]
    live_status: Option<LiveSignal>,
    #[serde(default)]
    is_live: Option<bool>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    last_checked: Option<DateTime<Utc>>,
}

impl From<AccountRecord> for SocialAccount {
    fn from(record: AccountRecord) -> Self {
        let live_status = record.live_status.or(match record.is_live {
            Some(true) => Some(LiveSignal::Live),
            Some(false) => Some(LiveSignal::Offline),
            None => None,
        });
        Self {
            id: record.id,
            platform: record.platform,
            username: record.username,
            url: record.url,
            followers: record.followers,
            live_status,
            last_checked: record.last_checked,
        }
    }
}

/// A tracked creator and its linked accounts.
///
/// `is_live` is derived from the accounts and only changes through
/// [`Creator::refresh_is_live`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub accounts: Vec<SocialAccount>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds", default = "Utc::now")]
    pub added_at: DateTime<Utc>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_checked: Option<DateTime<Utc>>,
    /// Written for readers of the file, always derived from `accounts`.
    #[serde(default, skip_deserializing)]
    is_live: bool,
}

impl Creator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            bio: String::new(),
            avatar_url: String::new(),
            accounts: Vec::new(),
            is_favorite: false,
            is_pinned: false,
            note: None,
            category: None,
            reason: None,
            added_at: Utc::now(),
            last_checked: None,
            is_live: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_account(mut self, account: SocialAccount) -> Self {
        self.accounts.push(account);
        self.refresh_is_live();
        self
    }

    pub fn is_live(&self) -> bool {
        self.is_live
    }

    /// Recompute the aggregate flag as the OR over all account signals.
    pub fn refresh_is_live(&mut self) {
        self.is_live = self.accounts.iter().any(SocialAccount::is_live);
    }

    /// Fill in anything a hand-edited or older file may lack: ids,
    /// profile URLs and the aggregate live flag.
    pub fn normalize(&mut self) {
        if self.id.trim().is_empty() {
            self.id = new_id();
        }
        for account in &mut self.accounts {
            if account.id.trim().is_empty() {
                account.id = new_id();
            }
            if account.url.trim().is_empty()
                && let Some(url) = account.platform.profile_url(&account.username)
            {
                account.url = url;
            }
        }
        self.refresh_is_live();
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_is_live_is_or_over_accounts() {
        let creator = Creator::new("Someone")
            .with_account(SocialAccount::new(Platform::Kick, "a").with_live_status(LiveSignal::Offline))
            .with_account(SocialAccount::new(Platform::Twitch, "b").with_live_status(LiveSignal::Unknown));
        assert!(!creator.is_live());

        let creator = creator
            .with_account(SocialAccount::new(Platform::Youtube, "c").with_live_status(LiveSignal::Live));
        assert!(creator.is_live());
    }

    #[test]
    fn test_json_layout() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let mut creator = Creator::new("Someone").with_id("c1").with_account(
            SocialAccount::new(Platform::Twitch, "someone").with_live_status(LiveSignal::Live),
        );
        creator.added_at = at;
        creator.accounts[0].id = "a1".to_string();
        creator.accounts[0].last_checked = Some(at);

        let value = serde_json::to_value(&creator).unwrap();
        assert_eq!(value["avatarUrl"], "");
        assert_eq!(value["isLive"], true);
        assert_eq!(value["addedAt"], 1_700_000_000_000i64);
        assert_eq!(value["accounts"][0]["liveStatus"], "live");
        assert_eq!(value["accounts"][0]["lastChecked"], 1_700_000_000_000i64);
        assert_eq!(value["accounts"][0]["url"], "https://www.twitch.tv/someone");
        assert!(value.get("lastChecked").is_none());
    }

    #[test]
    fn test_accepts_legacy_is_live_flag() {
        let json = r#"{
            "name": "Old",
            "addedAt": 1700000000000,
            "accounts": [
                {"id": "x", "platform": "kick", "username": "old", "url": "", "isLive": true},
                {"platform": "tiktok", "username": "old", "url": "", "isLive": false},
                {"platform": "myspace", "username": "old", "url": "https://myspace.com/old"}
            ]
        }"#;
        let mut creator: Creator = serde_json::from_str(json).unwrap();
        creator.normalize();

        assert!(!creator.id.is_empty());
        assert_eq!(creator.accounts[0].live_status, Some(LiveSignal::Live));
        assert_eq!(creator.accounts[1].live_status, Some(LiveSignal::Offline));
        assert_eq!(creator.accounts[2].platform, Platform::Other);
        assert_eq!(creator.accounts[2].live_status, None);
        assert!(!creator.accounts[1].id.is_empty());
        assert_eq!(creator.accounts[0].url, "https://kick.com/old");
        assert!(creator.is_live());
    }

    #[test]
    fn test_stored_is_live_is_recomputed() {
        let json = r#"{"name": "Stale", "isLive": true, "accounts": []}"#;
        let mut creator: Creator = serde_json::from_str(json).unwrap();
        creator.normalize();
        assert!(!creator.is_live());
    }

    #[test]
    fn test_stored_is_live_is_never_read_back() {
        let json = r#"{"name": "Stale", "isLive": true, "accounts": []}"#;
        let creator: Creator = serde_json::from_str(json).unwrap();
        assert!(!creator.is_live());

        let json = r#"{"name": "Fresh", "isLive": false, "accounts": [
            {"platform": "twitch", "username": "fresh", "url": "", "liveStatus": "live"}
        ]}"#;
        let mut creator: Creator = serde_json::from_str(json).unwrap();
        assert!(!creator.is_live());
        creator.normalize();
        assert!(creator.is_live());
    }
}
