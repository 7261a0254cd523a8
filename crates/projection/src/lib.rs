//! Coordinate reference system transformations.
//!
//! Implements the handful of map projections the tile grids are defined in,
//! from scratch without external dependencies. All angles at the
//! [`Projection`] boundary are degrees.

pub mod albers;
pub mod error;
pub mod geographic;
pub mod mercator;
pub mod transform;

pub use albers::AlbersEqualArea;
pub use error::{ProjectionError, ProjectionResult};
pub use geographic::Geographic;
pub use mercator::WebMercator;
pub use transform::{projection_for, CrsTransformer};

/// A map projection between geographic and projected coordinates.
pub trait Projection: Send + Sync {
    /// `(lon, lat)` in degrees to projected `(x, y)`.
    fn forward(&self, lon: f64, lat: f64) -> ProjectionResult<(f64, f64)>;

    /// Projected `(x, y)` to `(lon, lat)` in degrees.
    fn inverse(&self, x: f64, y: f64) -> ProjectionResult<(f64, f64)>;
}
