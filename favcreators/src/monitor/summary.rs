use std::fmt;

use live_status::LiveSignal;
use serde::Serialize;

use crate::models::Creator;

/// Counts over a refreshed collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    pub creators: usize,
    pub accounts: usize,
    pub live: usize,
    pub offline: usize,
    pub unknown: usize,
}

impl RefreshSummary {
    /// Tally account signals. Accounts never checked count as unknown.
    pub fn from_creators(creators: &[Creator]) -> Self {
        let mut summary = Self {
            creators: creators.len(),
            ..Self::default()
        };
        for account in creators.iter().flat_map(|c| &c.accounts) {
            summary.accounts += 1;
            match account.live_status.unwrap_or_default() {
                LiveSignal::Live => summary.live += 1,
                LiveSignal::Offline => summary.offline += 1,
                LiveSignal::Unknown => summary.unknown += 1,
            }
        }
        summary
    }
}

impl fmt::Display for RefreshSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} creators, {} accounts: {} live, {} offline, {} unknown",
            self.creators, self.accounts, self.live, self.offline, self.unknown
        )
    }
}
