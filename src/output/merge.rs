//! Structural merge of single-track feature collections

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use geojson::{FeatureCollection, GeoJson};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{TrackError, TrackResult};

pub const GEOJSON_EXTENSION: &str = "geojson";

/// Concatenate `features` arrays in encounter order. Features are moved
/// as-is; nothing is deduplicated or reprojected.
pub fn merge_collections<I>(collections: I) -> FeatureCollection
where
    I: IntoIterator<Item = FeatureCollection>,
{
    let features = collections
        .into_iter()
        .flat_map(|collection| collection.features)
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Read one file that must hold a feature collection
pub fn read_collection(path: &Path) -> TrackResult<FeatureCollection> {
    let text = fs::read_to_string(path)?;
    let merge_error = |message: String| TrackError::MergeInput {
        path: path.display().to_string(),
        message,
    };

    match text.parse::<GeoJson>() {
        Ok(GeoJson::FeatureCollection(collection)) => Ok(collection),
        Ok(GeoJson::Feature(_)) => Err(merge_error("a single Feature, not a FeatureCollection".into())),
        Ok(GeoJson::Geometry(_)) => Err(merge_error("a bare Geometry, not a FeatureCollection".into())),
        Err(e) => Err(merge_error(e.to_string())),
    }
}

/// Read and merge files in the given order
pub fn merge_files(paths: &[PathBuf]) -> TrackResult<FeatureCollection> {
    let mut collections = Vec::with_capacity(paths.len());
    for path in paths {
        let collection = read_collection(path)?;
        debug!(path = %path.display(), features = collection.features.len(), "Read collection");
        collections.push(collection);
    }

    let merged = merge_collections(collections);
    info!(
        files = paths.len(),
        features = merged.features.len(),
        "Merged feature collections"
    );
    Ok(merged)
}

/// All `*.geojson` files under `dir`, sorted by path
pub fn find_geojson_files(dir: &Path) -> TrackResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| TrackError::Io(e.into()))?;
        let is_geojson = entry
            .path()
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case(GEOJSON_EXTENSION))
            .unwrap_or(false);
        if entry.file_type().is_file() && is_geojson {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Drop every entry that names the same file as `output`, however it is
/// spelled. A missing `output` cannot be among the inputs.
pub fn exclude_output(files: Vec<PathBuf>, output: &Path) -> Vec<PathBuf> {
    let Ok(target) = fs::canonicalize(output) else {
        return files;
    };

    files
        .into_iter()
        .filter(|path| match fs::canonicalize(path) {
            Ok(resolved) => resolved != target,
            Err(_) => true,
        })
        .collect()
}

/// `<YYYYmmddHHMMSS>` name for a merged output
pub fn merged_file_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%Y%m%d%H%M%S").to_string()
}
