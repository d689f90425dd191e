//! Layered pipeline configuration
//!
//! Precedence: CLI flags > `DASHTRACK_*` environment > TOML file > defaults.
//! The CLI layer is applied by the commands on top of what [`PipelineConfig::load`]
//! and [`PipelineConfig::apply_env`] produce.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::model::{AssemblyMode, PointProperty, SourceKind, TimestampFormat};
use crate::error::{TrackError, TrackResult};
use crate::track::FeatureOptions;
use crate::utils::time::parse_utc_offset;

/// File looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "dashtrack.toml";

/// Prefix of recognized environment variables
pub const ENV_PREFIX: &str = "DASHTRACK_";

fn config_error(message: impl Into<String>) -> TrackError {
    TrackError::Config {
        message: message.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExifToolConfig {
    /// Program to run
    pub program: String,
    /// Arguments placed before every request
    pub args: Vec<String>,
    /// Per-invocation timeout
    pub timeout_secs: u64,
}

impl Default for ExifToolConfig {
    fn default() -> Self {
        Self {
            program: "exiftool".to_string(),
            args: Vec::new(),
            timeout_secs: 30,
        }
    }
}

/// Accepted range for `timeout_secs`, shared with the `--timeout` flag
pub const TIMEOUT_RANGE_SECS: (u64, u64) = (1, 3600);

impl ExifToolConfig {
    /// Per-invocation timeout; values outside 1-3600 s are rejected
    pub fn timeout(&self) -> TrackResult<Duration> {
        let (min, max) = TIMEOUT_RANGE_SECS;
        if !(min..=max).contains(&self.timeout_secs) {
            return Err(config_error(format!(
                "exiftool timeout_secs must be between {} and {}, got {}",
                min, max, self.timeout_secs
            )));
        }
        Ok(Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// `all`, `point` or `line`
    pub mode: String,
    /// `iso8601` or `unix`
    pub timestamp_format: String,
    /// Point properties; unset means the default set for the source kind
    pub properties: Option<Vec<String>>,
    /// Offset used to render ISO timestamps
    pub utc_offset: String,
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            mode: "all".to_string(),
            timestamp_format: "iso8601".to_string(),
            properties: None,
            utc_offset: "+00:00".to_string(),
            pretty: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpxConfig {
    /// Samples per second
    pub frequency: f64,
}

impl Default for GpxConfig {
    fn default() -> Self {
        Self { frequency: 2.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Offset of a `CreateDate` written without a zone
    pub create_date_offset: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            create_date_offset: "+00:00".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub video_extensions: Vec<String>,
    /// Parallel sources; 0 means one per CPU
    pub concurrency: usize,
    /// Merge the produced files after a batch run
    pub merge: bool,
    /// Use `<stem>.gpx` next to a video instead of its embedded telemetry
    pub prefer_gpx: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            video_extensions: vec!["mp4".to_string(), "mov".to_string()],
            concurrency: 0,
            merge: true,
            prefer_gpx: true,
        }
    }
}

/// Complete configuration for every pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub exiftool: ExifToolConfig,
    pub output: OutputConfig,
    pub gpx: GpxConfig,
    pub video: VideoConfig,
    pub batch: BatchConfig,
}

impl PipelineConfig {
    pub fn from_toml_str(content: &str) -> TrackResult<Self> {
        toml::from_str(content).map_err(|e| config_error(format!("invalid TOML: {}", e)))
    }

    pub fn from_file(path: &Path) -> TrackResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            config_error(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Explicit file if given, else `dashtrack.toml` when present, else defaults
    pub fn load(explicit: Option<&Path>) -> TrackResult<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(&fallback)
                } else {
                    debug!("No configuration file; using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> TrackResult<()> {
        self.apply_env_from(std::env::vars())
    }

    /// Apply `DASHTRACK_*` overrides from any key/value source
    pub fn apply_env_from<I, K, V>(&mut self, vars: I) -> TrackResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut applied = 0usize;
        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref().trim();
            let parse_error =
                |what: &str| config_error(format!("{}{} is not a valid {}", ENV_PREFIX, name, what));

            match name {
                "EXIFTOOL" => self.exiftool.program = value.to_string(),
                "EXIFTOOL_TIMEOUT" => {
                    self.exiftool.timeout_secs = value.parse().map_err(|_| parse_error("number"))?
                }
                "MODE" => self.output.mode = value.to_string(),
                "TIMESTAMP_FORMAT" => self.output.timestamp_format = value.to_string(),
                "PROPERTIES" => self.output.properties = Some(split_list(value)),
                "UTC_OFFSET" => self.output.utc_offset = value.to_string(),
                "GPX_FREQUENCY" => {
                    self.gpx.frequency = value.parse().map_err(|_| parse_error("number"))?
                }
                "CREATE_DATE_OFFSET" => self.video.create_date_offset = value.to_string(),
                "CONCURRENCY" => {
                    self.batch.concurrency = value.parse().map_err(|_| parse_error("count"))?
                }
                // consumed by the CLI layer
                "CONFIG" | "LOG_LEVEL" | "LOG_FORMAT" => continue,
                other => {
                    warn!(variable = %format!("{}{}", ENV_PREFIX, other), "Unknown environment override ignored");
                    continue;
                }
            }
            debug!(variable = name, value, "Environment override");
            applied += 1;
        }

        if applied > 0 {
            info!(count = applied, "Applied environment overrides");
        }
        Ok(())
    }

    pub fn assembly_mode(&self) -> TrackResult<AssemblyMode> {
        AssemblyMode::parse(&self.output.mode)
    }

    pub fn display_offset(&self) -> TrackResult<FixedOffset> {
        parse_utc_offset(&self.output.utc_offset)
            .ok_or_else(|| config_error(format!("invalid utc_offset '{}'", self.output.utc_offset)))
    }

    pub fn create_date_offset(&self) -> TrackResult<FixedOffset> {
        parse_utc_offset(&self.video.create_date_offset).ok_or_else(|| {
            config_error(format!(
                "invalid create_date_offset '{}'",
                self.video.create_date_offset
            ))
        })
    }

    /// Feature options for a source kind, validating every output setting
    pub fn feature_options(&self, kind: SourceKind) -> TrackResult<FeatureOptions> {
        let properties = match &self.output.properties {
            Some(names) => PointProperty::parse_list(names)?,
            None => PointProperty::defaults_for(kind),
        };

        Ok(FeatureOptions::default()
            .with_mode(self.assembly_mode()?)
            .with_timestamp_format(TimestampFormat::parse(&self.output.timestamp_format)?)
            .with_properties(properties)
            .with_display_offset(self.display_offset()?))
    }

    /// Worker count for batch runs
    pub fn effective_concurrency(&self) -> usize {
        match self.batch.concurrency {
            0 => num_cpus::get().max(1),
            n => n,
        }
    }
}

/// Split `a, b,c` into trimmed, non-empty items
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
