use std::process;

use anyhow::Context;
use clap::Parser;
use favcreators::AppConfig;
use favcreators::cli::{Args, Commands, OutputFormat};
use favcreators::commands::CommandExecutor;
use favcreators::logging::init_logging;
use tracing::{debug, error};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let output_format = args.command.output_format();

    if let Err(e) = run(args).await {
        match output_format {
            Some(OutputFormat::Json) => {
                let error_json = serde_json::json!({
                    "status": "error",
                    "message": format!("{e:#}"),
                });
                println!("{error_json}");
            }
            _ => {
                error!("Application error: {e:#}");
                eprintln!("Error: {e:#}");
            }
        }
        process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    init_logging(args.verbose, args.quiet, args.log_format)?;

    // Reset and usage never touch the collection; `--show` goes through the executor.
    if let Commands::Config { show: false, reset } = args.command {
        if reset {
            let path = AppConfig::reset(args.config.as_deref())?;
            println!("Configuration reset to defaults at {}", path.display());
        } else {
            println!("Use --show to display current configuration or --reset to reset to defaults");
        }
        return Ok(());
    }

    let config =
        AppConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    let data_file = match args.data_file {
        Some(path) => path,
        None => config.data_file()?,
    };
    debug!(?config, data_file = %data_file.display(), "Starting");

    let executor = CommandExecutor::new(config, data_file)?;

    match args.command {
        Commands::Check {
            platform,
            username,
            output,
        } => executor.check(&platform, &username, output).await?,
        Commands::Refresh { id, output } => executor.refresh(id.as_deref(), output).await?,
        Commands::Watch => executor.watch().await?,
        Commands::Avatars => executor.avatars().await?,
        Commands::Bios => {
            executor.bios().await?;
        }
        Commands::Config { .. } => executor.config_show()?,
    }

    Ok(())
}
