//! ExifTool adapter for embedded telemetry extraction
//!
//! Runs the external `exiftool` binary as a black box. Every invocation is
//! bounded by a timeout; a hung or failing run becomes a
//! `TelemetryExtraction` error for that one source.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::config::ExifToolConfig;
use crate::error::{TrackError, TrackResult};
use crate::ports::MetadataToolPort;

const GPS_ARGS: &[&str] = &[
    "-ee",
    "-T",
    "-GPSDateTime",
    "-GPSLatitude",
    "-GPSLongitude",
    "-GPSSpeed",
    "-GPSTrack",
];

const TIME_ARGS: &[&str] = &["-s", "-VideoFrameRate", "-CreateDate", "-Duration"];

const JSON_ARGS: &[&str] = &["-j"];

/// ExifTool-backed metadata adapter
#[derive(Debug, Clone)]
pub struct ExifToolAdapter {
    program: String,
    base_args: Vec<String>,
    timeout: Duration,
}

impl ExifToolAdapter {
    /// Create new adapter for the given program
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            base_args: Vec::new(),
            timeout,
        }
    }

    /// Arguments placed before every request, e.g. the script path when
    /// the program is `perl`
    pub fn with_base_args(mut self, base_args: Vec<String>) -> Self {
        self.base_args = base_args;
        self
    }

    pub fn from_config(config: &ExifToolConfig) -> TrackResult<Self> {
        Ok(Self::new(config.program.clone(), config.timeout()?)
            .with_base_args(config.args.clone()))
    }

    async fn run(&self, video: &Path, args: &[&str]) -> TrackResult<String> {
        let failure = |message: String| TrackError::TelemetryExtraction {
            path: video.display().to_string(),
            message,
        };

        let mut command = Command::new(&self.program);
        command
            .args(&self.base_args)
            .args(args)
            .arg(video)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        debug!(program = %self.program, ?args, video = %video.display(), "Running metadata tool");

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Err(_) => {
                return Err(failure(format!(
                    "{} timed out after {:.1}s",
                    self.program,
                    self.timeout.as_secs_f64()
                )))
            }
            Ok(Err(e)) => return Err(failure(format!("failed to run {}: {}", self.program, e))),
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failure(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl MetadataToolPort for ExifToolAdapter {
    async fn embedded_gps(&self, video: &Path) -> TrackResult<String> {
        self.run(video, GPS_ARGS).await
    }

    async fn time_tags(&self, video: &Path) -> TrackResult<String> {
        self.run(video, TIME_ARGS).await
    }

    async fn all_tags(&self, video: &Path) -> TrackResult<serde_json::Value> {
        let stdout = self.run(video, JSON_ARGS).await?;
        let mut documents: Vec<serde_json::Value> =
            serde_json::from_str(&stdout).map_err(|e| TrackError::TelemetryExtraction {
                path: video.display().to_string(),
                message: format!("unreadable JSON tag dump: {}", e),
            })?;

        if documents.is_empty() {
            return Err(TrackError::TelemetryExtraction {
                path: video.display().to_string(),
                message: "tag dump is empty".to_string(),
            });
        }
        Ok(documents.swap_remove(0))
    }
}
