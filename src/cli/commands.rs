//! Command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::app::AppContainer;
use crate::cli::args::{
    ConvertArgs, GpxArgs, InspectArgs, MergeArgs, ReportFormat, VideoArgs,
};
use crate::config::PipelineConfig;
use crate::output::{exclude_output, find_geojson_files, merge_files, GeoJsonWriter};

fn ensure_input(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(anyhow::anyhow!("Input does not exist: {}", path.display()));
    }
    Ok(())
}

/// Execute the video command
pub async fn video(args: VideoArgs, mut config: PipelineConfig) -> Result<()> {
    info!(input = %args.input.display(), "Starting video conversion");
    ensure_input(&args.input)?;

    args.output.apply(&mut config);
    args.tool.apply(&mut config);
    let container = AppContainer::new(config).context("Invalid configuration")?;

    let (track, collection) = container
        .video_pipeline()
        .run(&args.input)
        .await
        .with_context(|| format!("Failed to build track from {}", args.input.display()))?;

    let path = container
        .writer()
        .write_named(&args.output_dir, track.source_name(), &collection)
        .context("Failed to write GeoJSON")?;

    println!("{}", path.display());
    Ok(())
}

/// Execute the gpx command
pub async fn gpx(args: GpxArgs, mut config: PipelineConfig) -> Result<()> {
    info!(input = %args.input.display(), "Starting GPX conversion");
    ensure_input(&args.input)?;

    args.output.apply(&mut config);
    if let Some(frequency) = args.frequency {
        config.gpx.frequency = frequency;
    }
    let container = AppContainer::new(config).context("Invalid configuration")?;

    let (track, collection) = container
        .gpx_pipeline()
        .run(&args.input, args.name.as_deref())
        .await
        .with_context(|| format!("Failed to build track from {}", args.input.display()))?;

    let path = container
        .writer()
        .write_named(&args.output_dir, track.source_name(), &collection)
        .context("Failed to write GeoJSON")?;

    println!("{}", path.display());
    Ok(())
}

/// Execute the convert command
pub async fn convert(args: ConvertArgs, mut config: PipelineConfig) -> Result<()> {
    ensure_input(&args.input_dir)?;

    args.output.apply(&mut config);
    args.tool.apply(&mut config);
    if args.no_merge {
        config.batch.merge = false;
    }
    if args.no_gpx {
        config.batch.prefer_gpx = false;
    }
    if let Some(concurrency) = args.concurrency {
        config.batch.concurrency = concurrency;
    }
    if let Some(frequency) = args.frequency {
        config.gpx.frequency = frequency;
    }
    let container = AppContainer::new(config).context("Invalid configuration")?;

    let report = container
        .batch_runner()
        .run(&args.input_dir, &args.output_dir)
        .await
        .context("Batch conversion failed")?;

    for skipped in &report.skipped {
        warn!(source = %skipped.path.display(), reason = %skipped.reason, "Skipped");
    }
    println!(
        "converted {} source(s), skipped {}",
        report.written.len(),
        report.skipped.len()
    );
    if let Some(merged) = &report.merged {
        println!("merged: {}", merged.display());
    }
    Ok(())
}

/// Execute the inspect command
pub async fn inspect(args: InspectArgs, mut config: PipelineConfig) -> Result<()> {
    ensure_input(&args.input)?;

    args.tool.apply(&mut config);
    let container = AppContainer::new(config).context("Invalid configuration")?;
    let interactor = container.inspect_interactor();

    let rendered = if args.raw {
        let tags = interactor
            .raw_tags(&args.input)
            .await
            .context("Failed to read tags")?;
        render(&tags, args.format)?
    } else {
        let report = interactor
            .inspect(&args.input)
            .await
            .context("Failed to inspect video")?;
        render(&report, args.format)?
    };

    println!("{}", rendered);
    Ok(())
}

fn render<T: serde::Serialize>(value: &T, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Json => {
            serde_json::to_string_pretty(value).context("Failed to serialize report to JSON")
        }
        ReportFormat::Yaml => {
            serde_yaml::to_string(value).context("Failed to serialize report to YAML")
        }
    }
}

/// Execute the merge command
pub async fn merge(args: MergeArgs, config: PipelineConfig) -> Result<()> {
    let files: Vec<PathBuf> = match &args.input_dir {
        Some(dir) => {
            ensure_input(dir)?;
            let found = find_geojson_files(dir)
                .with_context(|| format!("Failed to list {}", dir.display()))?;
            exclude_output(found, &args.output)
        }
        None => args.files.clone(),
    };
    if files.is_empty() {
        return Err(anyhow::anyhow!("No GeoJSON files to merge"));
    }

    let merged = merge_files(&files).context("Failed to merge feature collections")?;
    let pretty = config.output.pretty && !args.compact;
    GeoJsonWriter::new(pretty)
        .write(&args.output, &merged)
        .context("Failed to write merged GeoJSON")?;

    info!(files = files.len(), output = %args.output.display(), "Merge complete");
    println!("{}", args.output.display());
    Ok(())
}
