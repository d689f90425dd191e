// Adapters - External system implementations

pub mod exiftool;
pub mod fixture;

// Re-export adapters
pub use exiftool::ExifToolAdapter;
pub use fixture::FixtureToolAdapter;
