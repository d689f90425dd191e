//! GeoJSON file writer

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use geojson::FeatureCollection;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::TrackResult;
use crate::utils::path::geojson_path;

/// Writes feature collections with a temp-file-then-rename step, so a reader
/// never observes a partially written file.
#[derive(Debug, Clone)]
pub struct GeoJsonWriter {
    pretty: bool,
}

impl Default for GeoJsonWriter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl GeoJsonWriter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Serialize a collection to a JSON string
    pub fn to_string(&self, collection: &FeatureCollection) -> TrackResult<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(collection)?
        } else {
            serde_json::to_string(collection)?
        };
        Ok(json)
    }

    /// Write `<dir>/<name>.geojson`, creating `dir` if needed
    pub fn write_named(
        &self,
        dir: &Path,
        name: &str,
        collection: &FeatureCollection,
    ) -> TrackResult<PathBuf> {
        let path = geojson_path(dir, name);
        self.write(&path, collection)?;
        Ok(path)
    }

    /// Write a collection to `path`, replacing any existing file
    pub fn write(&self, path: &Path, collection: &FeatureCollection) -> TrackResult<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let temp = NamedTempFile::new_in(&dir)?;
        debug!(temp = %temp.path().display(), "Writing to temporary file");
        {
            let mut writer = BufWriter::new(temp.as_file());
            if self.pretty {
                serde_json::to_writer_pretty(&mut writer, collection)?;
            } else {
                serde_json::to_writer(&mut writer, collection)?;
            }
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| e.error)?;

        info!(
            path = %path.display(),
            features = collection.features.len(),
            "GeoJSON written"
        );
        Ok(())
    }
}
