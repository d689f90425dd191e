//! Dashtrack CLI
//!
//! Builds GeoJSON tracks from dashcam video telemetry and GPX files.
//!
//! # Usage
//!
//! ```bash
//! dashtrack video --input Movie/20250226112032_000029A.MP4 --output-dir geojson
//! dashtrack gpx --input Guilin_Rd.gpx --frequency 2
//! dashtrack convert --input-dir Movie --output-dir geojson
//! dashtrack merge --output all.geojson --input-dir geojson
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use dashtrack::cli::{commands, Cli, Commands};
use dashtrack::config::PipelineConfig;
use dashtrack::utils::logging::{LogFormat, LogLevel, LoggingConfig, LoggingSystem};

/// Main entry point for the dashtrack CLI
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = LogLevel::parse(&cli.log_level)
        .ok_or_else(|| anyhow::anyhow!("Invalid log level: {}", cli.log_level))?;
    let format = LogFormat::parse(&cli.log_format)
        .ok_or_else(|| anyhow::anyhow!("Invalid log format: {}", cli.log_format))?;
    let logging = LoggingSystem::new(LoggingConfig {
        level,
        format,
        target: false,
    });
    logging
        .initialize()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    logging.log_system_info();

    let mut config =
        PipelineConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config
        .apply_env()
        .context("Invalid environment configuration")?;

    info!("Executing {} command", cli.command.name());
    match cli.command {
        Commands::Video(args) => commands::video(args, config).await,
        Commands::Gpx(args) => commands::gpx(args, config).await,
        Commands::Convert(args) => commands::convert(args, config).await,
        Commands::Inspect(args) => commands::inspect(args, config).await,
        Commands::Merge(args) => commands::merge(args, config).await,
    }
}
