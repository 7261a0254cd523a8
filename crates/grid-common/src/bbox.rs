//! Bounding box types and operations.

use geo::{coord, BoundingRect, Geometry, Polygon, Rect};
use serde::{Deserialize, Serialize};

use crate::coords::{snap, transform_to_res};
use crate::{Affine, GridError, GridResult};

/// Relative tolerance when comparing pixel resolutions.
const RESOLUTION_TOLERANCE: f64 = 1e-9;

/// An axis-aligned bounding box `(left, bottom, right, top)`.
///
/// For geographic CRS coordinates are in degrees, for projected CRS in the
/// projection's linear unit. A box with `left > right` or `bottom > top`
/// is how an empty intersection is reported, see [`BoundingBox::is_empty`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(left: f64, bottom: f64, right: f64, top: f64) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// True when the box violates `left <= right` or `bottom <= top`.
    pub fn is_empty(&self) -> bool {
        self.left > self.right || self.bottom > self.top
    }

    /// Sort each axis so that `left <= right` and `bottom <= top`.
    pub fn normalized(&self) -> Self {
        Self {
            left: self.left.min(self.right),
            bottom: self.bottom.min(self.top),
            right: self.left.max(self.right),
            top: self.bottom.max(self.top),
        }
    }

    /// Check if this bbox shares area with another.
    ///
    /// Boxes that only share an edge or a corner do not intersect.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.left < other.right
            && self.right > other.left
            && self.bottom < other.top
            && self.top > other.bottom
    }

    /// Check if a point is contained within this bbox (edges included).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right && y >= self.bottom && y <= self.top
    }

    /// The box as a closed, counter-clockwise polygon.
    pub fn to_polygon(&self) -> Polygon<f64> {
        self.to_rect().to_polygon()
    }

    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.left, y: self.bottom },
            coord! { x: self.right, y: self.top },
        )
    }

    pub fn from_rect(rect: Rect<f64>) -> Self {
        Self::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }

    /// Bounding box of a geometry, `None` for empty geometries.
    pub fn from_geometry(geometry: &Geometry<f64>) -> Option<Self> {
        geometry.bounding_rect().map(Self::from_rect)
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.left, self.bottom, self.right, self.top]
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<(f64, f64, f64, f64)> for BoundingBox {
    fn from(v: (f64, f64, f64, f64)) -> Self {
        Self::new(v.0, v.1, v.2, v.3)
    }
}

impl From<&BoundingBox> for BoundingBox {
    fn from(b: &BoundingBox) -> Self {
        *b
    }
}

impl TryFrom<&[f64]> for BoundingBox {
    type Error = GridError;

    fn try_from(v: &[f64]) -> GridResult<Self> {
        match v {
            [left, bottom, right, top] => Ok(Self::new(*left, *bottom, *right, *top)),
            _ => Err(GridError::InvalidBounds(v.len())),
        }
    }
}

/// Return the union of one or more bounding boxes.
///
/// Each input may list its corners in either order; the union takes the
/// minimum and maximum over every x and every y.
pub fn bounds_union<I, B>(boxes: I) -> GridResult<BoundingBox>
where
    I: IntoIterator<Item = B>,
    B: Into<BoundingBox>,
{
    let mut iter = boxes.into_iter().map(Into::into);
    let first = iter.next().ok_or(GridError::EmptyInput)?.normalized();

    Ok(iter.fold(first, |acc, b| {
        let b = b.normalized();
        BoundingBox::new(
            acc.left.min(b.left),
            acc.bottom.min(b.bottom),
            acc.right.max(b.right),
            acc.top.max(b.top),
        )
    }))
}

/// Return the intersection of one or more bounding boxes.
///
/// This does not fail when the boxes are disjoint: the result then has
/// `left > right` and/or `bottom > top`. Callers check
/// [`BoundingBox::is_empty`].
///
/// Unlike [`bounds_union`], inputs are taken as given. A box whose corners
/// are reversed is an empty box and keeps the result empty, so a previous
/// empty intersection can be chained back in.
pub fn bounds_intersection<I, B>(boxes: I) -> GridResult<BoundingBox>
where
    I: IntoIterator<Item = B>,
    B: Into<BoundingBox>,
{
    let mut iter = boxes.into_iter().map(Into::into);
    let first = iter.next().ok_or(GridError::EmptyInput)?;

    Ok(iter.fold(first, |acc, b| {
        BoundingBox::new(
            acc.left.max(b.left),
            acc.bottom.max(b.bottom),
            acc.right.min(b.right),
            acc.top.min(b.top),
        )
    }))
}

/// Union a set of boxes onto one pixel grid.
///
/// The new transform is anchored at the union's upper-left corner and uses
/// the resolution of `reference`; every input is assumed to share that
/// resolution (see [`bounds_transform_union_checked`]). Width and height are
/// rounded up to whole pixels and the returned bounds' right and bottom
/// edges are moved to match, so they can be slightly larger than the raw
/// union but never smaller.
///
/// Returns `(bounds, transform, (height, width))`.
pub fn bounds_transform_union<I, B>(
    boxes: I,
    reference: &Affine,
) -> GridResult<(BoundingBox, Affine, (usize, usize))>
where
    I: IntoIterator<Item = B>,
    B: Into<BoundingBox>,
{
    reference.ensure_rectilinear()?;
    let union = bounds_union(boxes)?;

    let (resx, resy) = transform_to_res(reference);
    let (resx, resy) = (resx.abs(), resy.abs());
    let transform = Affine::new(resx, 0.0, union.left, 0.0, -resy, union.top);

    let width = snap(union.width() / resx).ceil() as usize;
    let height = snap(union.height() / resy).ceil() as usize;

    let bounds = BoundingBox::new(
        union.left,
        union.top - height as f64 * resy,
        union.left + width as f64 * resx,
        union.top,
    );

    Ok((bounds, transform, (height, width)))
}

/// Like [`bounds_transform_union`], but verifies that every `(bounds,
/// transform)` pair shares the first pair's resolution.
pub fn bounds_transform_union_checked(
    rasters: &[(BoundingBox, Affine)],
) -> GridResult<(BoundingBox, Affine, (usize, usize))> {
    let (_, reference) = rasters.first().ok_or(GridError::EmptyInput)?;
    let expected = transform_to_res(reference);

    for (_, transform) in &rasters[1..] {
        let actual = transform_to_res(transform);
        let close = |a: f64, b: f64| (a - b).abs() <= RESOLUTION_TOLERANCE * a.abs().max(b.abs());
        if !close(expected.0, actual.0) || !close(expected.1, actual.1) {
            return Err(GridError::ResolutionMismatch { expected, actual });
        }
    }

    bounds_transform_union(rasters.iter().map(|(b, _)| *b), reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_and_intersection() {
        let a = [0.0, 0.0, 10.0, 10.0];
        let b = [-5.0, -5.0, 5.0, 5.0];

        let union = bounds_union([a, b]).unwrap();
        assert_eq!(union, BoundingBox::new(-5.0, -5.0, 10.0, 10.0));

        let intersection = bounds_intersection([a, b]).unwrap();
        assert_eq!(intersection, BoundingBox::new(0.0, 0.0, 5.0, 5.0));
    }

    #[test]
    fn test_strict_intersects() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
        let touching = BoundingBox::new(10.0, 0.0, 20.0, 10.0);

        assert!(a.intersects(&b));
        assert!(!a.intersects(&touching));
    }

    #[test]
    fn test_polygon_roundtrip() {
        let bbox = BoundingBox::new(-74.0, 41.0, -69.0, 44.0);
        let poly = bbox.to_polygon();
        let back = BoundingBox::from_geometry(&Geometry::Polygon(poly)).unwrap();
        assert_eq!(back, bbox);
    }

    #[test]
    fn test_transform_union_snaps_to_reference_grid() {
        let reference = Affine::new(5.0, 0.0, 0.0, 0.0, -5.0, 10.0);
        let (bounds, transform, shape) = bounds_transform_union(
            [[0.0, 0.0, 10.0, 10.0], [-5.0, -5.0, 5.0, 5.0]],
            &reference,
        )
        .unwrap();

        assert_eq!(bounds, BoundingBox::new(-5.0, -5.0, 10.0, 10.0));
        assert_eq!(transform, Affine::new(5.0, 0.0, -5.0, 0.0, -5.0, 10.0));
        assert_eq!(shape, (3, 3));
    }

    #[test]
    fn test_transform_union_grows_to_whole_pixels() {
        let reference = Affine::new(4.0, 0.0, 0.0, 0.0, -4.0, 0.0);
        let (bounds, _, shape) =
            bounds_transform_union([[0.0, 0.0, 10.0, 10.0]], &reference).unwrap();

        assert_eq!(shape, (3, 3));
        assert_eq!(bounds, BoundingBox::new(0.0, -2.0, 12.0, 10.0));
    }

    #[test]
    fn test_transform_union_checked_rejects_mixed_resolution() {
        let rasters = [
            (
                BoundingBox::new(0.0, 0.0, 10.0, 10.0),
                Affine::new(1.0, 0.0, 0.0, 0.0, -1.0, 10.0),
            ),
            (
                BoundingBox::new(-5.0, -5.0, 5.0, 5.0),
                Affine::new(5.0, 0.0, -5.0, 0.0, -5.0, 5.0),
            ),
        ];
        let err = bounds_transform_union_checked(&rasters).unwrap_err();
        assert!(matches!(err, GridError::ResolutionMismatch { .. }));
        assert!(matches!(
            bounds_transform_union_checked(&[]),
            Err(GridError::EmptyInput)
        ));
    }
}
