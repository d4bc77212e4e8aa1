//! Application configuration loaded from TOML.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use live_status::transport::DEFAULT_USER_AGENT;
use live_status::{
    HttpTransport, ProbeConfig, ProbeSet, RelayResolver, RelayTemplate, RetryPolicy,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::monitor::{StatusMonitor, StatusMonitorConfig};
use crate::{Error, Result};

const APP_DIR: &str = "favcreators";
const CONFIG_FILE: &str = "config.toml";
const DATA_FILE: &str = "creators.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub relay: RelayConfig,
    pub monitor: MonitorConfig,
    /// JSON creator collection. Defaults to the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub page_timeout_ms: u64,
    pub status_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            page_timeout_ms: 10_000,
            status_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Tried in order on every attempt.
    pub endpoints: Vec<RelayTemplate>,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub min_body_len: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            endpoints: RelayTemplate::defaults(),
            max_retries: 2,
            backoff_base_ms: 1_000,
            min_body_len: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub inter_creator_delay_ms: u64,
    pub startup_delay_ms: u64,
    pub refresh_interval_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            inter_creator_delay_ms: 500,
            startup_delay_ms: 2_000,
            refresh_interval_secs: 300,
        }
    }
}

impl MonitorConfig {
    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

impl AppConfig {
    /// `<config_dir>/favcreators/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from `path`, or from the default location, falling back to
    /// built-in defaults when no file exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) if !path.exists() => {
                return Err(Error::config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|p| p.exists()),
        };

        let Some(path) = path else {
            debug!("No config file found, using defaults");
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(&path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Write the defaults to `path` (or the default location) and return
    /// where they went.
    pub fn reset(path: Option<&Path>) -> Result<PathBuf> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(Self::default_path)
            .ok_or_else(|| Error::config("no configuration directory available"))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, Self::default().show()?)?;
        Ok(path)
    }

    pub fn show(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.relay.endpoints.is_empty() {
            return Err(Error::validation("relay.endpoints must not be empty"));
        }
        if let Some(endpoint) = self.relay.endpoints.iter().find(|e| e.prefix.trim().is_empty()) {
            return Err(Error::validation(format!(
                "relay endpoint '{}' has an empty prefix",
                endpoint.name
            )));
        }
        if self.http.page_timeout_ms == 0 || self.http.status_timeout_ms == 0 {
            return Err(Error::validation("http timeouts must be greater than zero"));
        }
        Ok(())
    }

    /// Collection file: `data_file` if set, else the platform data directory.
    pub fn data_file(&self) -> Result<PathBuf> {
        if let Some(path) = &self.data_file {
            return Ok(path.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR).join(DATA_FILE))
            .ok_or_else(|| Error::config("no data directory available, set data_file"))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.relay.max_retries,
            Duration::from_millis(self.relay.backoff_base_ms),
        )
    }

    pub fn relay_resolver(
        &self,
        transport: Arc<dyn HttpTransport>,
        cancel: CancellationToken,
    ) -> RelayResolver {
        RelayResolver::new(transport)
            .with_templates(self.relay.endpoints.clone())
            .with_timeout(Duration::from_millis(self.http.page_timeout_ms))
            .with_min_body_len(self.relay.min_body_len)
            .with_policy(self.retry_policy())
            .with_cancellation(cancel)
    }

    pub fn probe_set(&self, relay: RelayResolver) -> ProbeSet {
        ProbeSet::new(
            relay,
            ProbeConfig {
                status_timeout: Duration::from_millis(self.http.status_timeout_ms),
            },
        )
    }

    /// Fully wired monitor over `transport`.
    pub fn status_monitor(
        &self,
        transport: Arc<dyn HttpTransport>,
        cancel: CancellationToken,
    ) -> StatusMonitor {
        let relay = self.relay_resolver(transport, cancel.clone());
        StatusMonitor::with_config(
            self.probe_set(relay),
            StatusMonitorConfig {
                inter_creator_delay: Duration::from_millis(self.monitor.inter_creator_delay_ms),
            },
        )
        .with_cancellation(cancel)
    }
}
