//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use clap_num::number_range;

use crate::config::{PipelineConfig, TIMEOUT_RANGE_SECS};

fn parse_timeout(s: &str) -> Result<u64, String> {
    let (min, max) = TIMEOUT_RANGE_SECS;
    number_range(s, min, max)
}

fn parse_concurrency(s: &str) -> Result<usize, String> {
    number_range(s, 1, 256)
}

/// Feature collection shape, shared by every command that writes GeoJSON
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Assembly mode: all, point or line
    #[arg(long)]
    pub mode: Option<String>,

    /// Timestamp representation: iso8601 or unix
    #[arg(long)]
    pub timestamp_format: Option<String>,

    /// Point properties, comma separated (datetime, speed, azimuth, elevation, frame, sec, projected)
    #[arg(long, value_delimiter = ',')]
    pub properties: Option<Vec<String>>,

    /// Offset for ISO timestamps, e.g. +08:00
    #[arg(long)]
    pub utc_offset: Option<String>,

    /// Write single-line JSON
    #[arg(long)]
    pub compact: bool,
}

impl OutputArgs {
    /// Layer these flags over the configuration
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(mode) = &self.mode {
            config.output.mode = mode.clone();
        }
        if let Some(format) = &self.timestamp_format {
            config.output.timestamp_format = format.clone();
        }
        if let Some(properties) = &self.properties {
            config.output.properties = Some(properties.clone());
        }
        if let Some(offset) = &self.utc_offset {
            config.output.utc_offset = offset.clone();
        }
        if self.compact {
            config.output.pretty = false;
        }
    }
}

/// Metadata tool settings
#[derive(Args, Debug, Clone, Default)]
pub struct ToolArgs {
    /// exiftool executable
    #[arg(long)]
    pub exiftool: Option<String>,

    /// Per-invocation timeout in seconds (1-3600)
    #[arg(long, value_parser = parse_timeout)]
    pub timeout: Option<u64>,

    /// Offset of a CreateDate written without a zone, e.g. +08:00
    #[arg(long)]
    pub create_date_offset: Option<String>,
}

impl ToolArgs {
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(program) = &self.exiftool {
            config.exiftool.program = program.clone();
        }
        if let Some(timeout) = self.timeout {
            config.exiftool.timeout_secs = timeout;
        }
        if let Some(offset) = &self.create_date_offset {
            config.video.create_date_offset = offset.clone();
        }
    }
}

/// Arguments for the video command
#[derive(Args, Debug)]
pub struct VideoArgs {
    /// Input video file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory for <name>.geojson
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub tool: ToolArgs,
}

/// Arguments for the gpx command
#[derive(Args, Debug)]
pub struct GpxArgs {
    /// Input GPX file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Track name (default: GPX file name without extension)
    #[arg(long)]
    pub name: Option<String>,

    /// Samples per second, at least 1
    #[arg(long)]
    pub frequency: Option<f64>,

    /// Directory for <name>.geojson
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for the convert command
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Directory searched recursively for videos
    #[arg(long)]
    pub input_dir: PathBuf,

    /// Directory for the per-source and merged files
    #[arg(long)]
    pub output_dir: PathBuf,

    /// Skip the merged output
    #[arg(long)]
    pub no_merge: bool,

    /// Ignore sibling GPX files and always read embedded telemetry
    #[arg(long)]
    pub no_gpx: bool,

    /// Sources processed in parallel (default: one per CPU)
    #[arg(long, value_parser = parse_concurrency)]
    pub concurrency: Option<usize>,

    /// GPX samples per second
    #[arg(long)]
    pub frequency: Option<f64>,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub tool: ToolArgs,
}

/// Report format for inspect
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Json,
    Yaml,
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Input video file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Json)]
    pub format: ReportFormat,

    /// Dump every tag the tool reports instead of the fix table
    #[arg(long)]
    pub raw: bool,

    #[command(flatten)]
    pub tool: ToolArgs,
}

/// Arguments for the merge command
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Merged output file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Merge every *.geojson under this directory
    #[arg(long, conflicts_with = "files")]
    pub input_dir: Option<PathBuf>,

    /// Files to merge, in order
    #[arg(required_unless_present = "input_dir")]
    pub files: Vec<PathBuf>,

    /// Write single-line JSON
    #[arg(long)]
    pub compact: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_args_override_config() {
        let mut config = PipelineConfig::default();
        let args = OutputArgs {
            mode: Some("point".to_string()),
            properties: Some(vec!["speed".to_string()]),
            compact: true,
            ..OutputArgs::default()
        };
        args.apply(&mut config);

        assert_eq!(config.output.mode, "point");
        assert_eq!(config.output.properties, Some(vec!["speed".to_string()]));
        assert!(!config.output.pretty);
        assert_eq!(config.output.timestamp_format, "iso8601");
    }

    #[test]
    fn test_tool_args_override_config() {
        let mut config = PipelineConfig::default();
        ToolArgs {
            timeout: Some(5),
            create_date_offset: Some("+08:00".to_string()),
            ..ToolArgs::default()
        }
        .apply(&mut config);
        assert_eq!(config.exiftool.timeout_secs, 5);
        assert_eq!(config.exiftool.program, "exiftool");
        assert_eq!(config.video.create_date_offset, "+08:00");
    }

    #[test]
    fn test_number_ranges() {
        assert_eq!(parse_timeout("30"), Ok(30));
        assert!(parse_timeout("0").is_err());
        assert!(parse_concurrency("1000").is_err());
    }
}
