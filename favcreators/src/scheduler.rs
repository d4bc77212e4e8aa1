//! Periodic refresh loop.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::Result;
use crate::monitor::{RefreshSummary, StatusMonitor};
use crate::store::CreatorStore;

/// Runs a refresh shortly after start and then on a fixed interval until
/// cancelled. Each pass snapshots the store, refreshes, swaps the result in
/// and saves it.
pub struct RefreshScheduler {
    monitor: Arc<StatusMonitor>,
    store: Arc<CreatorStore>,
    startup_delay: Duration,
    interval: Duration,
    cancel: CancellationToken,
}

impl RefreshScheduler {
    pub fn new(
        monitor: Arc<StatusMonitor>,
        store: Arc<CreatorStore>,
        startup_delay: Duration,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            monitor,
            store,
            startup_delay,
            interval,
            cancel,
        }
    }

    /// One refresh pass over the current snapshot.
    pub async fn tick(&self) -> Result<RefreshSummary> {
        let snapshot = self.store.snapshot();
        let refreshed = self.monitor.refresh_all(&snapshot).await;
        let summary = RefreshSummary::from_creators(&refreshed);
        self.store.replace(refreshed);
        self.store.save().await?;
        Ok(summary)
    }

    /// Loop until the cancellation token fires. Returns the number of
    /// completed passes.
    pub async fn run(&self) -> usize {
        info!(
            startup_delay = ?self.startup_delay,
            interval = ?self.interval,
            "Refresh scheduler started"
        );

        let mut passes = 0;
        let mut wait = self.startup_delay;
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }

            match self.tick().await {
                Ok(summary) => info!(%summary, "Scheduled refresh complete"),
                Err(e) => warn!(error = %e, "Scheduled refresh could not be saved"),
            }
            passes += 1;
            wait = self.interval;
        }

        info!(passes, "Refresh scheduler stopped");
        passes
    }
}
