//! Status monitor service implementation.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use live_status::{ProbeResult, ProbeSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::merge::{merge_account, merge_creator};
use super::summary::RefreshSummary;
use crate::models::{Creator, SocialAccount};
use crate::{Error, Result};

/// Configuration for the status monitor.
#[derive(Debug, Clone)]
pub struct StatusMonitorConfig {
    /// Pause between consecutive creators in a batch.
    pub inter_creator_delay: Duration,
}

impl Default for StatusMonitorConfig {
    fn default() -> Self {
        Self {
            inter_creator_delay: Duration::from_millis(500),
        }
    }
}

/// Drives probes across creators and merges the results.
pub struct StatusMonitor {
    probes: Arc<ProbeSet>,
    clock: Arc<dyn Clock>,
    config: StatusMonitorConfig,
    cancel: CancellationToken,
}

impl StatusMonitor {
    pub fn new(probes: ProbeSet) -> Self {
        Self::with_config(probes, StatusMonitorConfig::default())
    }

    pub fn with_config(probes: ProbeSet, config: StatusMonitorConfig) -> Self {
        Self {
            probes: Arc::new(probes),
            clock: Arc::new(SystemClock),
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Stop a running batch between creators once `token` fires.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn probes(&self) -> &ProbeSet {
        &self.probes
    }

    /// Check every creator in input order and return the merged collection.
    ///
    /// Creators are visited one at a time with `inter_creator_delay` between
    /// them; a creator's accounts are probed concurrently. If the monitor is
    /// cancelled, creators not yet visited are returned as they were.
    pub async fn refresh_all(&self, creators: &[Creator]) -> Vec<Creator> {
        let checked_at = self.clock.now();
        let mut refreshed = Vec::with_capacity(creators.len());

        for (index, creator) in creators.iter().enumerate() {
            if index > 0 && !self.cancel.is_cancelled() {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {}
                    _ = tokio::time::sleep(self.config.inter_creator_delay) => {}
                }
            }
            if self.cancel.is_cancelled() {
                warn!(
                    remaining = creators.len() - index,
                    "Refresh cancelled, keeping remaining creators as they were"
                );
                refreshed.extend_from_slice(&creators[index..]);
                break;
            }
            refreshed.push(self.refresh_creator(creator, checked_at).await);
        }

        info!(
            summary = %RefreshSummary::from_creators(&refreshed),
            "Live status refresh finished"
        );
        refreshed
    }

    /// Check the creator with `id` and return the collection with only that
    /// creator replaced.
    pub async fn refresh_one(&self, creators: &[Creator], id: &str) -> Result<Vec<Creator>> {
        let Some(index) = creators.iter().position(|c| c.id == id) else {
            warn!(id, "Refresh requested for unknown creator");
            return Err(Error::not_found("creator", id));
        };

        let checked_at = self.clock.now();
        let refreshed = self.refresh_creator(&creators[index], checked_at).await;

        let mut result = creators.to_vec();
        result[index] = refreshed;
        Ok(result)
    }

    async fn refresh_creator(&self, creator: &Creator, checked_at: DateTime<Utc>) -> Creator {
        debug!(
            creator = %creator.name,
            accounts = creator.accounts.len(),
            "Checking creator"
        );

        let results = join_all(creator.accounts.iter().map(|a| self.probe_account(a))).await;

        let accounts = creator
            .accounts
            .iter()
            .zip(&results)
            .map(|(account, result)| merge_account(account, result, checked_at))
            .collect();

        merge_creator(creator, accounts, checked_at)
    }

    async fn probe_account(&self, account: &SocialAccount) -> ProbeResult {
        let url = (!account.url.trim().is_empty()).then_some(account.url.as_str());
        match self
            .probes
            .resolve_username(account.platform, &account.username, url)
        {
            Some(username) => self.probes.probe(account.platform, &username).await,
            None => ProbeResult::unknown(),
        }
    }
}

impl std::fmt::Debug for StatusMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusMonitor")
            .field("probes", &self.probes)
            .field("config", &self.config)
            .finish()
    }
}
