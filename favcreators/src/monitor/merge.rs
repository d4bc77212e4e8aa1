//! Merge rules for folding probe results into stored state.

use chrono::{DateTime, Utc};
use live_status::ProbeResult;

use crate::models::{Creator, SocialAccount};

/// Apply one probe result to an account.
///
/// A definitive signal replaces the stored one; `Unknown` keeps whatever was
/// there. `last_checked` moves forward either way.
pub fn merge_account(
    account: &SocialAccount,
    result: &ProbeResult,
    checked_at: DateTime<Utc>,
) -> SocialAccount {
    SocialAccount {
        live_status: result.signal.merge(account.live_status),
        last_checked: Some(checked_at),
        ..account.clone()
    }
}

/// Rebuild a creator around its merged accounts.
pub fn merge_creator(
    creator: &Creator,
    accounts: Vec<SocialAccount>,
    checked_at: DateTime<Utc>,
) -> Creator {
    let mut merged = creator.clone();
    merged.accounts = accounts;
    merged.last_checked = Some(checked_at);
    merged.refresh_is_live();
    merged
}
