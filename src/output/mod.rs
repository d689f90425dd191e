//! GeoJSON output: atomic file writing and collection merging

pub mod merge;
pub mod writer;

pub use merge::{exclude_output, find_geojson_files, merge_collections, merge_files, merged_file_name, read_collection};
pub use writer::GeoJsonWriter;
