//! Conversions between affine transforms, coordinate arrays and bounds.
//!
//! Coordinate arrays are plain 1-D slices of pixel positions along one
//! axis. When `center` is true they hold pixel centers, otherwise pixel
//! upper-left edges. Transforms always describe pixel edges.

use tracing::{debug, warn};

use crate::{Affine, BoundingBox, GridError, GridResult};

/// Tolerance used by [`check_spacing`], in coordinate units.
pub const SPACING_TOLERANCE: f64 = 2e-3;

/// Values within this distance of an integer are treated as that integer
/// before floor/ceil rounding.
pub(crate) const PIXEL_PRECISION: f64 = 1e-6;

/// Snap a pixel count or offset to the nearest integer if it is within
/// [`PIXEL_PRECISION`], so that floor/ceil are not thrown off by float noise.
pub(crate) fn snap(v: f64) -> f64 {
    let rounded = v.round();
    if (v - rounded).abs() < PIXEL_PRECISION {
        rounded
    } else {
        v
    }
}

/// Result of inspecting a pair of coordinate arrays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordsInfo {
    pub transform: Affine,
    pub bounds: BoundingBox,
    /// Number of values along `(x, y)`.
    pub shape: (usize, usize),
}

/// Return the `(y, x)` coordinates for a transform.
///
/// Either `bbox` or both `width` and `height` must be given. With a `bbox`
/// the upper-left corner is first snapped to the pixel grid implied by
/// `transform`, and the height/width are rounded up so the returned
/// coordinates cover all of `bbox`. The first coordinate is therefore not
/// necessarily at `bbox`'s corner.
pub fn transform_to_coords(
    transform: &Affine,
    bbox: Option<&BoundingBox>,
    width: Option<usize>,
    height: Option<usize>,
    center: bool,
) -> GridResult<(Vec<f64>, Vec<f64>)> {
    transform.ensure_rectilinear()?;

    let (transform, height, width) = match (bbox, width, height) {
        (Some(bbox), _, _) => {
            let off_y = snap((bbox.top - transform.f) / transform.e).floor();
            let off_x = snap((bbox.left - transform.c) / transform.a).floor();

            let top = transform.f + off_y * transform.e;
            let left = transform.c + off_x * transform.a;

            let height = snap(((top - bbox.bottom) / transform.e).abs()).ceil() as usize;
            let width = snap(((bbox.right - left) / transform.a).abs()).ceil() as usize;

            (
                *transform * Affine::translation(off_x, off_y),
                height,
                width,
            )
        }
        (None, Some(width), Some(height)) if width > 0 && height > 0 => {
            (*transform, height, width)
        }
        _ => return Err(GridError::MissingShape),
    };

    let offset = if center { 0.5 } else { 0.0 };

    let x = (0..width)
        .map(|col| transform.forward(col as f64 + offset, offset).0)
        .collect();
    let y = (0..height)
        .map(|row| transform.forward(offset, row as f64 + offset).1)
        .collect();

    Ok((y, x))
}

/// Return the `(x, y)` pixel resolution of a transform.
///
/// For a rotated transform this is the length of each column vector, which
/// is always positive.
pub fn transform_to_res(transform: &Affine) -> (f64, f64) {
    let Affine { a, b, d, e, .. } = *transform;
    if transform.is_rectilinear() {
        (a, -e)
    } else {
        ((a * a + d * d).sqrt(), (b * b + e * e).sqrt())
    }
}

/// Return the bounding box of a `height` x `width` raster.
pub fn transform_to_bounds(
    transform: &Affine,
    height: usize,
    width: usize,
) -> GridResult<BoundingBox> {
    transform.ensure_rectilinear()?;

    let Affine { a, c, e, f, .. } = *transform;
    Ok(BoundingBox::new(c, f + e * height as f64, c + a * width as f64, f).normalized())
}

/// Calculate the affine transform of a pair of coordinate arrays.
///
/// Pixel size is inferred from the spacing along each axis, so both `y`
/// and `x` need at least two (unique) values. A single-pixel raster cannot
/// be described by its coordinates alone and yields
/// [`GridError::TooFewCoordinates`].
pub fn coords_to_transform(
    y: &[f64],
    x: &[f64],
    center: bool,
    assume_unique: bool,
) -> GridResult<Affine> {
    inspect_coords(y, x, center, assume_unique).map(|info| info.transform)
}

/// Calculate the bounding box covering the full pixel area of a pair of
/// coordinate arrays.
///
/// Same two-values-per-axis minimum as [`coords_to_transform`].
pub fn coords_to_bounds(
    y: &[f64],
    x: &[f64],
    center: bool,
    assume_unique: bool,
) -> GridResult<BoundingBox> {
    inspect_coords(y, x, center, assume_unique).map(|info| info.bounds)
}

/// Derive transform, bounds and shape from coordinate arrays.
///
/// Spacing is taken from the first and last values of each axis. Uneven
/// spacing is logged but does not stop the computation. Fewer than two
/// values on either axis, counted after deduplication, is an error.
pub fn inspect_coords(
    y: &[f64],
    x: &[f64],
    center: bool,
    assume_unique: bool,
) -> GridResult<CoordsInfo> {
    let (y, x) = if assume_unique {
        (y.to_vec(), x.to_vec())
    } else {
        warn!("Computing unique values of coordinates...");
        (unique_sorted(y), unique_sorted(x))
    };

    if y.len() < 2 {
        return Err(GridError::TooFewCoordinates {
            axis: "y",
            len: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(GridError::TooFewCoordinates {
            axis: "x",
            len: x.len(),
        });
    }

    if !check_spacing(&y, SPACING_TOLERANCE) {
        warn!(axis = "y", "\"y\" coordinate does not have equal spacing");
    }
    if !check_spacing(&x, SPACING_TOLERANCE) {
        warn!(axis = "x", "\"x\" coordinate does not have equal spacing");
    }

    let (nx, ny) = (x.len(), y.len());
    let (x0, x1) = (x[0], x[nx - 1]);
    let (mut y0, mut y1) = (y[0], y[ny - 1]);

    if y0 > y1 {
        warn!("Unreversing y coordinate min/max");
        std::mem::swap(&mut y0, &mut y1);
    }

    let dy = (y0 - y1) / (ny - 1) as f64;
    let dx = (x1 - x0) / (nx - 1) as f64;

    let transform = Affine::new(dx, 0.0, x0, 0.0, dy, y1);

    let (transform, bounds) = if center {
        (
            transform * Affine::translation(-0.5, -0.5),
            BoundingBox::new(x0 - dx / 2.0, y0 + dy / 2.0, x1 + dx / 2.0, y1 - dy / 2.0),
        )
    } else {
        (transform, BoundingBox::new(x0, y0 + dy, x1 + dx, y1))
    };

    debug!(%transform, ?bounds, nx, ny, "inspected coordinates");

    Ok(CoordsInfo {
        transform,
        bounds,
        shape: (nx, ny),
    })
}

/// Check for equal spacing by comparing the first, middle and last
/// intervals of `coord`.
pub fn check_spacing(coord: &[f64], tol: f64) -> bool {
    let n = coord.len();
    if n < 3 {
        return true;
    }

    let beg = coord[1] - coord[0];
    let mid_idx = (n / 2 + 1).min(n - 1);
    let mid = coord[mid_idx] - coord[mid_idx - 1];
    let end = coord[n - 1] - coord[n - 2];

    let cmp = |a: f64, b: f64| (a - b).abs() < tol;
    cmp(beg, mid) && cmp(mid, end) && cmp(beg, end)
}

fn unique_sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.total_cmp(b));
    out.dedup();
    out
}
