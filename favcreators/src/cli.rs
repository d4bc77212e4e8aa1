use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::logging::LogFormat;

#[derive(Parser, Debug)]
#[command(
    name = "favcreators",
    version,
    about = "Track favorite creators and check whether they are live",
    long_about = None
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, env = "FAVCREATORS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Creator collection file (overrides `data_file` from the config)
    #[arg(long, global = true, env = "FAVCREATORS_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe a single account
    Check {
        /// Platform tag (twitch, kick, tiktok, youtube, ...)
        platform: String,

        /// Username or profile URL
        username: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        output: OutputFormat,
    },

    /// Refresh live status for every creator, or one with --id
    Refresh {
        /// Only refresh the creator with this id
        #[arg(long)]
        id: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        output: OutputFormat,
    },

    /// Refresh on a schedule until interrupted
    Watch,

    /// Fill in missing creator avatars
    Avatars,

    /// Fill in missing creator bios from profile descriptions
    Bios,

    /// Show or reset configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Reset configuration to defaults
        #[arg(long, conflicts_with = "show")]
        reset: bool,
    },
}

impl Commands {
    /// Output format requested by the command, if it has one.
    pub fn output_format(&self) -> Option<OutputFormat> {
        match self {
            Commands::Check { output, .. } | Commands::Refresh { output, .. } => Some(*output),
            _ => None,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON output
    Json,
}
