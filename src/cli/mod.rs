//! CLI module for dashtrack
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

pub use args::{ConvertArgs, GpxArgs, InspectArgs, MergeArgs, VideoArgs};

/// Dashcam GPS track reconstruction
///
/// Reads the GPS stream embedded in dashcam or action-camera video (through
/// exiftool) or an accompanying GPX file, and writes a GeoJSON feature
/// collection with the path and one point per fix.
#[derive(Parser, Debug)]
#[command(name = "dashtrack")]
#[command(about = "Reconstruct GeoJSON tracks from dashcam telemetry and GPX files")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", env = "DASHTRACK_LOG_LEVEL", global = true)]
    pub log_level: String,

    /// Log output format (pretty, compact, json)
    #[arg(long, default_value = "compact", env = "DASHTRACK_LOG_FORMAT", global = true)]
    pub log_format: String,

    /// Configuration file (default: ./dashtrack.toml when present)
    #[arg(long, env = "DASHTRACK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a track from a video's embedded GPS stream
    Video(VideoArgs),
    /// Build a resampled track from a GPX file
    Gpx(GpxArgs),
    /// Convert every video under a directory and merge the results
    Convert(ConvertArgs),
    /// Show the annotated fixes or raw tags of a video
    Inspect(InspectArgs),
    /// Merge GeoJSON feature collections into one
    Merge(MergeArgs),
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Video(_) => "video",
            Commands::Gpx(_) => "gpx",
            Commands::Convert(_) => "convert",
            Commands::Inspect(_) => "inspect",
            Commands::Merge(_) => "merge",
        }
    }
}
