//! Favorite creators tracker.
//!
//! Keeps a collection of creators with their social accounts and refreshes
//! a best-effort live indicator for each of them using the probes from the
//! `live-status` crate.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod monitor;
pub mod output;
pub mod scheduler;
pub mod store;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use models::{Creator, SocialAccount};
pub use monitor::{RefreshSummary, StatusMonitor, StatusMonitorConfig};
pub use scheduler::RefreshScheduler;
pub use store::CreatorStore;
