//! WGS84 (EPSG:4326) to spherical Web Mercator (EPSG:3857)

use std::f64::consts::PI;

use crate::domain::model::{Fix, ProjectedPoint};

/// Sphere radius used by EPSG:3857, in meters
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude at which the projection becomes square
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Project a geographic coordinate to EPSG:3857 meters.
///
/// Latitudes beyond the Mercator limit are clamped to it.
pub fn to_web_mercator(longitude: f64, latitude: f64) -> ProjectedPoint {
    let latitude = latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = EARTH_RADIUS * longitude.to_radians();
    let y = EARTH_RADIUS * (PI / 4.0 + latitude.to_radians() / 2.0).tan().ln();
    ProjectedPoint { x, y }
}

/// Fill in the projected coordinates of every fix
pub fn annotate(fixes: &mut [Fix]) {
    for fix in fixes {
        fix.projected = Some(to_web_mercator(fix.longitude, fix.latitude));
    }
}
