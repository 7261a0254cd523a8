//! Affine geotransforms.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Mul;

use crate::{GridError, GridResult};

/// A 2D affine transform mapping pixel coordinates to map coordinates.
///
/// ```text
/// x = a * col + b * row + c
/// y = d * col + e * row + f
/// ```
///
/// Coefficients follow the rasterio/`affine` ordering `(a, b, c, d, e, f)`.
/// The GDAL geotransform ordering is `(c, a, b, f, d, e)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0)
    }

    /// Pure translation by `(xoff, yoff)`.
    pub const fn translation(xoff: f64, yoff: f64) -> Self {
        Self::new(1.0, 0.0, xoff, 0.0, 1.0, yoff)
    }

    /// Pure scale by `(sx, sy)`.
    pub const fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, 0.0, sy, 0.0)
    }

    /// Build a north-up transform from an upper-left corner and pixel size.
    pub fn from_origin(west: f64, north: f64, xsize: f64, ysize: f64) -> Self {
        Self::translation(west, north) * Self::scale(xsize, -ysize)
    }

    /// Create from a GDAL-style geotransform `[c, a, b, f, d, e]`.
    pub fn from_gdal(gt: &[f64; 6]) -> Self {
        Self::new(gt[1], gt[2], gt[0], gt[4], gt[5], gt[3])
    }

    /// Convert to a GDAL-style geotransform `[c, a, b, f, d, e]`.
    pub fn to_gdal(&self) -> [f64; 6] {
        [self.c, self.a, self.b, self.f, self.d, self.e]
    }

    /// Coefficients in `(a, b, c, d, e, f)` order.
    pub fn coefficients(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }

    /// True when the transform has no rotation or shear terms.
    pub fn is_rectilinear(&self) -> bool {
        self.b == 0.0 && self.d == 0.0
    }

    /// Fail with a usage error if this transform is rotated or sheared.
    pub fn ensure_rectilinear(&self) -> GridResult<()> {
        if self.is_rectilinear() {
            Ok(())
        } else {
            Err(GridError::RotatedTransform(self.to_string()))
        }
    }

    /// Apply the transform: `(col, row) -> (x, y)`.
    pub fn forward(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        )
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.e - self.b * self.d
    }

    /// Compute the inverse transform: `(x, y) -> (col, row)`.
    pub fn inverse(&self) -> GridResult<Affine> {
        let det = self.determinant();
        if det.abs() < f64::EPSILON {
            return Err(GridError::RotatedTransform(format!(
                "singular transform (determinant is zero): {}",
                self
            )));
        }
        let inv_det = 1.0 / det;
        Ok(Affine {
            a: self.e * inv_det,
            b: -self.b * inv_det,
            c: (self.b * self.f - self.e * self.c) * inv_det,
            d: -self.d * inv_det,
            e: self.a * inv_det,
            f: (self.d * self.c - self.a * self.f) * inv_det,
        })
    }

    /// Compare coefficients within an absolute tolerance.
    pub fn almost_equals(&self, other: &Affine, precision: f64) -> bool {
        self.coefficients()
            .iter()
            .zip(other.coefficients().iter())
            .all(|(lhs, rhs)| (lhs - rhs).abs() < precision)
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::identity()
    }
}

/// From coefficients in `(a, b, c, d, e, f)` order.
impl From<[f64; 6]> for Affine {
    fn from(c: [f64; 6]) -> Self {
        Self::new(c[0], c[1], c[2], c[3], c[4], c[5])
    }
}

/// Composition: `(self * rhs)` applies `rhs` first, then `self`.
impl Mul for Affine {
    type Output = Affine;

    fn mul(self, rhs: Affine) -> Affine {
        Affine {
            a: self.a * rhs.a + self.b * rhs.d,
            b: self.a * rhs.b + self.b * rhs.e,
            c: self.a * rhs.c + self.b * rhs.f + self.c,
            d: self.d * rhs.a + self.e * rhs.d,
            e: self.d * rhs.b + self.e * rhs.e,
            f: self.d * rhs.c + self.e * rhs.f + self.f,
        }
    }
}

impl Mul<(f64, f64)> for Affine {
    type Output = (f64, f64);

    fn mul(self, (col, row): (f64, f64)) -> (f64, f64) {
        self.forward(col, row)
    }
}

impl fmt::Display for Affine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Affine({}, {}, {}, {}, {}, {})",
            self.a, self.b, self.c, self.d, self.e, self.f
        )
    }
}
