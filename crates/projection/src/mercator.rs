//! Web Mercator (EPSG:3857), spherical.
//!
//! ```text
//! x = R * lon
//! y = R * ln(tan(pi/4 + lat/2))
//! ```

use std::f64::consts::PI;

use crate::{Projection, ProjectionError, ProjectionResult};

/// Sphere radius (WGS84 semi-major axis), meters.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude where the projection becomes a square, degrees.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Half the width of the projected world, meters.
pub const MAX_EXTENT: f64 = 20_037_508.342_789_244;

#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl Projection for WebMercator {
    fn forward(&self, lon: f64, lat: f64) -> ProjectionResult<(f64, f64)> {
        if !lon.is_finite() || !lat.is_finite() {
            return Err(ProjectionError::NonFinite { x: lon, y: lat });
        }
        if lat.abs() > MAX_LATITUDE {
            return Err(ProjectionError::LatitudeOutOfRange { lat });
        }

        let to_rad = PI / 180.0;
        let x = EARTH_RADIUS * lon * to_rad;
        let y = EARTH_RADIUS * (PI / 4.0 + lat * to_rad / 2.0).tan().ln();
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> ProjectionResult<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ProjectionError::NonFinite { x, y });
        }

        let to_deg = 180.0 / PI;
        let lon = x / EARTH_RADIUS * to_deg;
        let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0) * to_deg;
        Ok((lon, lat))
    }
}
