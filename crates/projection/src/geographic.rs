//! Geographic (longitude/latitude) coordinates as a pass-through projection.

use crate::{Projection, ProjectionError, ProjectionResult};

/// Plate carrée in degrees: forward and inverse are the identity, with
/// latitude checked against the poles.
#[derive(Debug, Clone, Copy, Default)]
pub struct Geographic;

impl Projection for Geographic {
    fn forward(&self, lon: f64, lat: f64) -> ProjectionResult<(f64, f64)> {
        if !lon.is_finite() || !lat.is_finite() {
            return Err(ProjectionError::NonFinite { x: lon, y: lat });
        }
        if lat.abs() > 90.0 {
            return Err(ProjectionError::LatitudeOutOfRange { lat });
        }
        Ok((lon, lat))
    }

    fn inverse(&self, x: f64, y: f64) -> ProjectionResult<(f64, f64)> {
        self.forward(x, y)
    }
}
