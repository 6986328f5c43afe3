//! SSID Logger CLI
//!
//! Reports wireless network changes to an HTTP endpoint until interrupted.

use std::path::PathBuf;

use clap::Parser;
use ssid_logger::{load_config, Config, SsidLoggerBuilder};
use tracing::Level;

#[derive(Parser)]
#[command(name = "ssid-logger")]
#[command(about = "Report wireless SSID changes to an HTTP endpoint")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Endpoint URL to POST events to (overrides config file)
    #[arg(short, long)]
    endpoint_url: Option<String>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, endpoint_url={:?}, log_level={:?}",
        args.config,
        args.endpoint_url,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(endpoint_url) = args.endpoint_url {
        config.endpoint_url = Some(endpoint_url);
    }

    tracing::debug!(
        "Observer: {:?}, delivery: {:?}",
        config.observer,
        config.delivery
    );

    SsidLoggerBuilder::new(config).build()?.start().await?;

    Ok(())
}
