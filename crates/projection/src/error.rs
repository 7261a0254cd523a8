//! Projection errors.

use grid_common::GridError;
use thiserror::Error;

pub type ProjectionResult<T> = Result<T, ProjectionError>;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("latitude {lat} is outside of the projection's domain")]
    LatitudeOutOfRange { lat: f64 },

    #[error("non-finite coordinate ({x}, {y})")]
    NonFinite { x: f64, y: f64 },

    #[error("point ({x}, {y}) is outside of the projection's valid area")]
    OutsideProjection { x: f64, y: f64 },
}

impl From<ProjectionError> for GridError {
    fn from(err: ProjectionError) -> Self {
        GridError::projection(err.to_string())
    }
}
