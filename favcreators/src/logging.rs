//! Tracing subscriber setup for the CLI.

use clap::ValueEnum;
use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::{Error, Result};

/// Directive used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// `quiet` wins over `verbose`; with neither, `RUST_LOG` decides.
pub fn build_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if quiet {
        EnvFilter::new(Level::ERROR.as_str())
    } else if verbose {
        EnvFilter::new(Level::DEBUG.as_str())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    }
}

pub fn init_logging(verbose: bool, quiet: bool, format: LogFormat) -> Result<()> {
    let registry = tracing_subscriber::registry().with(build_filter(verbose, quiet));

    let result = match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(verbose)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| Error::Other(format!("failed to initialize logging: {e}")))
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::filter::LevelFilter;

    use super::*;

    #[test]
    fn test_quiet_beats_verbose() {
        assert_eq!(build_filter(true, true).max_level_hint(), Some(LevelFilter::ERROR));
        assert_eq!(build_filter(true, false).max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
