//! Path helpers for sources and outputs

use std::path::{Component, Path, PathBuf};

/// Base file name without extension, used as the track's source name
pub fn source_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Source name built from the path below `root`, directories joined with `_`
/// (`day1/clip.mp4` becomes `day1_clip`)
pub fn relative_source_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path).with_extension("");
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        source_name(path)
    } else {
        parts.join("_")
    }
}

/// `<output_dir>/<source_name>.geojson`
pub fn geojson_path(output_dir: &Path, source_name: &str) -> PathBuf {
    output_dir.join(format!("{}.geojson", source_name))
}

/// Case-insensitive extension check against a list such as `["mp4", "mov"]`
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .map(|ext| {
            extensions
                .iter()
                .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(&ext))
        })
        .unwrap_or(false)
}

/// A GPX file sharing the video's stem in the same directory, if any
pub fn sibling_gpx(video: &Path) -> Option<PathBuf> {
    ["gpx", "GPX"]
        .iter()
        .map(|ext| video.with_extension(ext))
        .find(|candidate| candidate.is_file())
}
