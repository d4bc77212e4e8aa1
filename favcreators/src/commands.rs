//! CLI command implementations.

use std::path::PathBuf;
use std::sync::Arc;

use live_status::{
    HttpTransport, Platform, ReqwestTransport, fallback_avatar_url, grab_avatar, grab_summary,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::monitor::RefreshSummary;
use crate::output;
use crate::scheduler::RefreshScheduler;
use crate::store::CreatorStore;
use crate::{Error, Result};

pub struct CommandExecutor {
    config: AppConfig,
    data_file: PathBuf,
    transport: Arc<dyn HttpTransport>,
}

impl CommandExecutor {
    /// Executor over a real HTTP client.
    pub fn new(config: AppConfig, data_file: PathBuf) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.http.user_agent)?;
        Ok(Self::with_transport(config, data_file, Arc::new(transport)))
    }

    pub fn with_transport(
        config: AppConfig,
        data_file: PathBuf,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            config,
            data_file,
            transport,
        }
    }

    pub async fn check(&self, platform: &str, username: &str, format: OutputFormat) -> Result<()> {
        let platform: Platform = platform
            .parse()
            .map_err(|_| Error::validation(format!("unknown platform '{platform}'")))?;

        let relay = self
            .config
            .relay_resolver(self.transport.clone(), CancellationToken::new());
        let probes = self.config.probe_set(relay);
        if !probes.supports(platform) {
            warn!(%platform, "No live probe for platform, result will be unknown");
        }

        // Accept a profile URL as well as a bare username.
        let username = probes
            .resolve_username(platform, "", Some(username))
            .or_else(|| probes.resolve_username(platform, username, None))
            .ok_or_else(|| Error::validation("username must not be empty"))?;
        let result = probes.probe(platform, &username).await;

        println!("{}", output::format_probe(platform, &username, &result, format)?);
        Ok(())
    }

    pub async fn refresh(&self, id: Option<&str>, format: OutputFormat) -> Result<()> {
        let store = CreatorStore::open(&self.data_file).await?;
        let monitor = self
            .config
            .status_monitor(self.transport.clone(), CancellationToken::new());

        let snapshot = store.snapshot();
        let refreshed = match id {
            Some(id) => monitor.refresh_one(&snapshot, id).await?,
            None => monitor.refresh_all(&snapshot).await,
        };

        let summary = RefreshSummary::from_creators(&refreshed);
        println!("{}", output::format_refresh(&refreshed, &summary, format)?);

        store.replace(refreshed);
        store.save().await
    }

    /// Run the scheduler until Ctrl-C.
    pub async fn watch(&self) -> Result<()> {
        let cancel = CancellationToken::new();
        let store = Arc::new(CreatorStore::open(&self.data_file).await?);
        let monitor = Arc::new(self.config.status_monitor(self.transport.clone(), cancel.clone()));

        let scheduler = RefreshScheduler::new(
            monitor,
            store,
            self.config.monitor.startup_delay(),
            self.config.monitor.refresh_interval(),
            cancel.clone(),
        );

        let ctrl_c = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                    return;
                }
                info!("Interrupt received, stopping");
                cancel.cancel();
            })
        };

        scheduler.run().await;
        ctrl_c.abort();
        Ok(())
    }

    /// Fill empty avatar URLs from profile pages, falling back to a
    /// generated image.
    pub async fn avatars(&self) -> Result<()> {
        let store = CreatorStore::open(&self.data_file).await?;
        let relay = self
            .config
            .relay_resolver(self.transport.clone(), CancellationToken::new());

        let mut creators = store.snapshot().as_ref().clone();
        let mut updated = 0;
        for creator in creators.iter_mut().filter(|c| c.avatar_url.trim().is_empty()) {
            let accounts = creator
                .accounts
                .iter()
                .map(|a| (a.platform, a.url.as_str()));
            creator.avatar_url = match grab_avatar(&relay, accounts).await {
                Some(url) => url,
                None => {
                    let seed = if creator.name.trim().is_empty() {
                        &creator.id
                    } else {
                        &creator.name
                    };
                    fallback_avatar_url(seed)
                }
            };
            info!(creator = %creator.name, avatar = %creator.avatar_url, "Avatar set");
            updated += 1;
        }

        store.replace(creators);
        store.save().await?;
        println!("Updated {updated} avatar(s)");
        Ok(())
    }

    /// Fill empty bios from profile meta descriptions. Creators with no
    /// usable page keep an empty bio.
    pub async fn bios(&self) -> Result<usize> {
        let store = CreatorStore::open(&self.data_file).await?;
        let relay = self
            .config
            .relay_resolver(self.transport.clone(), CancellationToken::new());

        let mut creators = store.snapshot().as_ref().clone();
        let mut updated = 0;
        for creator in creators.iter_mut().filter(|c| c.bio.trim().is_empty()) {
            let accounts = creator
                .accounts
                .iter()
                .map(|a| (a.platform, a.url.as_str()));
            match grab_summary(&relay, accounts).await {
                Some(bio) => {
                    info!(creator = %creator.name, "Bio set");
                    creator.bio = bio;
                    updated += 1;
                }
                None => debug!(creator = %creator.name, "No bio found"),
            }
        }

        if updated > 0 {
            store.replace(creators);
            store.save().await?;
        }
        println!("Updated {updated} bio(s)");
        Ok(updated)
    }

    /// Print the effective configuration, after file and environment
    /// overrides.
    pub fn config_show(&self) -> Result<()> {
        println!("{}", self.config.show()?);
        Ok(())
    }
}
