// Batch runner - Directory walk, bounded parallel track builds, merge

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::app::pipeline::{GpxPipeline, VideoPipeline};
use crate::config::BatchConfig;
use crate::error::{TrackError, TrackResult};
use crate::output::{merge_files, merged_file_name, GeoJsonWriter};
use crate::utils::format_duration;
use crate::utils::path::{has_extension, relative_source_name, sibling_gpx, source_name};

/// One unit of batch work
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SourceJob {
    /// Build from the video's embedded telemetry
    Video(PathBuf),
    /// Build from a GPX file, named after the video it accompanies
    Gpx { video: PathBuf, gpx: PathBuf },
}

impl SourceJob {
    pub fn source_path(&self) -> &Path {
        match self {
            SourceJob::Video(video) => video,
            SourceJob::Gpx { video, .. } => video,
        }
    }

    pub fn source_name(&self) -> String {
        source_name(self.source_path())
    }
}

/// A source that was left out of the batch output
#[derive(Debug, Clone, Serialize)]
pub struct SkippedSource {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a batch run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<SkippedSource>,
    pub merged: Option<PathBuf>,
}

/// Output file name for every job.
///
/// Sources whose stems collide (case-insensitively) are named after their
/// path below `input_dir`. A job whose name is still taken by an earlier job
/// is not run and comes back as skipped.
pub fn plan_outputs(
    input_dir: &Path,
    jobs: Vec<SourceJob>,
) -> (Vec<(SourceJob, String)>, Vec<SkippedSource>) {
    let mut stem_counts: HashMap<String, usize> = HashMap::new();
    for job in &jobs {
        *stem_counts.entry(job.source_name().to_lowercase()).or_default() += 1;
    }

    let mut taken = HashSet::new();
    let mut planned = Vec::with_capacity(jobs.len());
    let mut skipped = Vec::new();
    for job in jobs {
        let stem = job.source_name();
        let name = if stem_counts.get(&stem.to_lowercase()).copied().unwrap_or(0) > 1 {
            relative_source_name(input_dir, job.source_path())
        } else {
            stem
        };

        if taken.insert(name.to_lowercase()) {
            planned.push((job, name));
        } else {
            warn!(source = %job.source_path().display(), output = %name, "Output name already used");
            skipped.push(SkippedSource {
                path: job.source_path().to_path_buf(),
                reason: format!("output name '{}' is already used by another source", name),
            });
        }
    }
    (planned, skipped)
}

/// Converts every video under a directory into a GeoJSON file
pub struct BatchRunner {
    video: Arc<VideoPipeline>,
    gpx: Arc<GpxPipeline>,
    writer: GeoJsonWriter,
    settings: BatchConfig,
    concurrency: usize,
}

impl BatchRunner {
    pub fn new(
        video: Arc<VideoPipeline>,
        gpx: Arc<GpxPipeline>,
        writer: GeoJsonWriter,
        settings: BatchConfig,
        concurrency: usize,
    ) -> Self {
        Self {
            video,
            gpx,
            writer,
            settings,
            concurrency: concurrency.max(1),
        }
    }

    /// Video files under `input_dir` in path order, each paired with its
    /// sibling GPX when that is preferred and present
    pub fn discover(&self, input_dir: &Path) -> TrackResult<Vec<SourceJob>> {
        let mut videos = Vec::new();
        for entry in WalkDir::new(input_dir).follow_links(true) {
            let entry = entry.map_err(|e| TrackError::Io(e.into()))?;
            if entry.file_type().is_file()
                && has_extension(entry.path(), &self.settings.video_extensions)
            {
                videos.push(entry.into_path());
            }
        }
        videos.sort();

        Ok(videos
            .into_iter()
            .map(|video| match sibling_gpx(&video) {
                Some(gpx) if self.settings.prefer_gpx => SourceJob::Gpx { video, gpx },
                _ => SourceJob::Video(video),
            })
            .collect())
    }

    /// Run every job, skipping sources whose errors are recoverable.
    ///
    /// A non-recoverable error stops the run after in-flight jobs finish.
    pub async fn run(&self, input_dir: &Path, output_dir: &Path) -> TrackResult<BatchReport> {
        let started = Instant::now();
        let jobs = self.discover(input_dir)?;
        info!(
            input = %input_dir.display(),
            sources = jobs.len(),
            concurrency = self.concurrency,
            "Starting batch conversion"
        );

        let (planned, collisions) = plan_outputs(input_dir, jobs);

        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(planned.len());
        for (job, name) in planned {
            let permits = Arc::clone(&permits);
            let video = Arc::clone(&self.video);
            let gpx = Arc::clone(&self.gpx);
            let writer = self.writer.clone();
            let output_dir = output_dir.to_path_buf();

            handles.push(tokio::spawn(async move {
                let result = match permits.acquire_owned().await {
                    Ok(_permit) => {
                        convert_one(&job, &name, &video, &gpx, &writer, &output_dir).await
                    }
                    Err(e) => Err(TrackError::Io(std::io::Error::other(e))),
                };
                (job, result)
            }));
        }

        let mut report = BatchReport {
            skipped: collisions,
            ..BatchReport::default()
        };
        let mut fatal = None;
        for handle in handles {
            let (job, result) = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(error = %e, "Batch job did not complete");
                    fatal.get_or_insert(TrackError::Io(std::io::Error::other(e)));
                    continue;
                }
            };
            match result {
                Ok(path) => report.written.push(path),
                Err(e) if e.is_recoverable() => {
                    warn!(source = %job.source_path().display(), error = %e, "Skipping source");
                    report.skipped.push(SkippedSource {
                        path: job.source_path().to_path_buf(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    error!(source = %job.source_path().display(), error = %e, "Batch aborted");
                    fatal.get_or_insert(e);
                }
            }
        }
        if let Some(e) = fatal {
            return Err(e);
        }

        if self.settings.merge && !report.written.is_empty() {
            let mut seen = HashSet::new();
            let inputs: Vec<PathBuf> = report
                .written
                .iter()
                .filter(|path| seen.insert(path.as_path()))
                .cloned()
                .collect();
            let merged = merge_files(&inputs)?;
            let name = merged_file_name(&Local::now());
            report.merged = Some(self.writer.write_named(output_dir, &name, &merged)?);
        }

        info!(
            written = report.written.len(),
            skipped = report.skipped.len(),
            elapsed = %format_duration(started.elapsed()),
            "Batch conversion finished"
        );
        Ok(report)
    }
}

async fn convert_one(
    job: &SourceJob,
    name: &str,
    video: &VideoPipeline,
    gpx: &GpxPipeline,
    writer: &GeoJsonWriter,
    output_dir: &Path,
) -> TrackResult<PathBuf> {
    let (_, collection) = match job {
        SourceJob::Video(path) => video.run(path).await?,
        SourceJob::Gpx { video: clip, gpx: file } => gpx.run(file, Some(&source_name(clip))).await?,
    };
    writer.write_named(output_dir, name, &collection)
}
