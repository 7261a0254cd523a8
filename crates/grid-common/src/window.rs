//! Raster windows and window resolution between differently gridded rasters.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bbox::bounds_intersection;
use crate::coords::snap;
use crate::{Affine, BoundingBox, GridResult};

/// A pixel-space rectangle inside a raster.
///
/// Offsets and lengths are fractional until rounded with
/// [`Window::round_lengths`] and [`Window::round_offsets`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub col_off: f64,
    pub row_off: f64,
    pub width: f64,
    pub height: f64,
}

impl Window {
    pub fn new(col_off: f64, row_off: f64, width: f64, height: f64) -> Self {
        Self {
            col_off,
            row_off,
            width,
            height,
        }
    }

    /// The window of `transform`'s pixel grid covering `bounds`.
    pub fn from_bounds(bounds: &BoundingBox, transform: &Affine) -> GridResult<Self> {
        transform.ensure_rectilinear()?;
        let inverse = transform.inverse()?;

        let (col_a, row_a) = inverse.forward(bounds.left, bounds.top);
        let (col_b, row_b) = inverse.forward(bounds.right, bounds.bottom);

        Ok(Self {
            col_off: col_a.min(col_b),
            row_off: row_a.min(row_b),
            width: (col_b - col_a).abs(),
            height: (row_b - row_a).abs(),
        })
    }

    /// Floor width and height to whole pixels.
    pub fn round_lengths(&self) -> Self {
        Self {
            width: snap(self.width).floor().max(0.0),
            height: snap(self.height).floor().max(0.0),
            ..*self
        }
    }

    /// Floor the column and row offsets to whole pixels.
    pub fn round_offsets(&self) -> Self {
        Self {
            col_off: snap(self.col_off).floor(),
            row_off: snap(self.row_off).floor(),
            ..*self
        }
    }

    /// Geographic bounds of this window in `transform`'s pixel grid.
    pub fn bounds(&self, transform: &Affine) -> BoundingBox {
        let (x0, y0) = transform.forward(self.col_off, self.row_off);
        let (x1, y1) = transform.forward(self.col_off + self.width, self.row_off + self.height);
        BoundingBox::new(x0, y1, x1, y0).normalized()
    }

    /// Integer `(col_off, row_off)`; meaningful after rounding.
    pub fn offsets(&self) -> (i64, i64) {
        (self.col_off as i64, self.row_off as i64)
    }

    /// Integer `(height, width)`; meaningful after rounding.
    pub fn shape(&self) -> (usize, usize) {
        (self.height as usize, self.width as usize)
    }
}

/// Calculate the window of a source raster that overlaps `dst_bounds`.
///
/// The overlap is rounded to whole pixels (lengths first, then offsets),
/// so it can extend slightly past the exact overlap. The ground footprint
/// of the rounded window is returned alongside it. Disjoint inputs yield a
/// zero-sized window.
pub fn calculate_src_window(
    src_bounds: &BoundingBox,
    src_transform: &Affine,
    dst_bounds: &BoundingBox,
) -> GridResult<(Window, BoundingBox)> {
    let overlap = bounds_intersection([src_bounds, dst_bounds])?;
    if overlap.is_empty() {
        debug!(?src_bounds, ?dst_bounds, "source and destination bounds do not overlap");
        let corner = BoundingBox::new(overlap.left, overlap.top, overlap.left, overlap.top);
        let window = Window::from_bounds(&corner, src_transform)?.round_offsets();
        return Ok((window, window.bounds(src_transform)));
    }

    let window = Window::from_bounds(&overlap, src_transform)?
        .round_lengths()
        .round_offsets();
    let bounds = window.bounds(src_transform);
    Ok((window, bounds))
}

/// Calculate where `src_bounds` lands in the pixel grid of `dst_transform`.
pub fn calculate_dst_window(src_bounds: &BoundingBox, dst_transform: &Affine) -> GridResult<Window> {
    Ok(Window::from_bounds(src_bounds, dst_transform)?
        .round_lengths()
        .round_offsets())
}
