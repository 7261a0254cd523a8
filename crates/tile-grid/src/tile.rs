//! A single cell of a tile grid.

use std::fmt;
use std::hash::{Hash, Hasher};

use geo::Polygon;
use grid_common::{
    transform_to_coords, Affine, BoundingBox, Crs, Feature, Geometry, GridError, GridResult,
    TileProperties,
};
use projection::CrsTransformer;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A `(row, col)` tile index. Rows count down from the grid's upper-left
/// corner, columns count right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(i64, i64)", into = "(i64, i64)")]
pub struct TileIndex {
    pub row: i64,
    pub col: i64,
}

impl TileIndex {
    pub const fn new(row: i64, col: i64) -> Self {
        Self { row, col }
    }

    /// Build an index from untyped numeric components.
    ///
    /// Exactly two components are required, and each must be a whole
    /// number. `[3.0, 4.0]` is accepted, `[3.5, 4.0]` and `[3.0]` are not.
    pub fn from_values(values: &[f64]) -> GridResult<Self> {
        let [row, col] = values else {
            return Err(GridError::IndexShape { len: values.len() });
        };

        let as_int = |v: f64| -> GridResult<i64> {
            if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
                Ok(v as i64)
            } else {
                Err(GridError::IndexType(v.to_string()))
            }
        };

        Ok(Self::new(as_int(*row)?, as_int(*col)?))
    }
}

impl From<(i64, i64)> for TileIndex {
    fn from((row, col): (i64, i64)) -> Self {
        Self::new(row, col)
    }
}

impl From<TileIndex> for (i64, i64) {
    fn from(index: TileIndex) -> Self {
        (index.row, index.col)
    }
}

impl fmt::Display for TileIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A tile: one fixed-size rectangular cell of a [`TileGrid`](crate::TileGrid).
///
/// Tiles are immutable values. They are created by a grid, which resolves
/// the bounds from the index; a tile never derives its own bounds.
#[derive(Debug, Clone)]
pub struct Tile {
    index: TileIndex,
    crs: Crs,
    bounds: BoundingBox,
    res: (f64, f64),
    size: (usize, usize),
}

impl Tile {
    pub fn new(
        index: TileIndex,
        crs: Crs,
        bounds: BoundingBox,
        res: (f64, f64),
        size: (usize, usize),
    ) -> Self {
        Self {
            index,
            crs,
            bounds,
            res,
            size,
        }
    }

    pub fn index(&self) -> TileIndex {
        self.index
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Pixel `(x, y)` resolution.
    pub fn res(&self) -> (f64, f64) {
        self.res
    }

    /// Pixel `(ncols, nrows)`.
    pub fn size(&self) -> (usize, usize) {
        self.size
    }

    /// Row index of this tile in its grid.
    pub fn vertical(&self) -> i64 {
        self.index.row
    }

    /// Column index of this tile in its grid.
    pub fn horizontal(&self) -> i64 {
        self.index.col
    }

    /// Number of pixel columns.
    pub fn width(&self) -> usize {
        self.size.0
    }

    /// Number of pixel rows.
    pub fn height(&self) -> usize {
        self.size.1
    }

    pub fn transform(&self) -> Affine {
        Affine::new(
            self.res.0,
            0.0,
            self.bounds.left,
            0.0,
            -self.res.1,
            self.bounds.top,
        )
    }

    /// The tile footprint as a polygon in the tile's CRS.
    pub fn bbox(&self) -> Polygon<f64> {
        self.bounds.to_polygon()
    }

    /// `(y, x)` pixel coordinates, centers by default.
    pub fn coords(&self, center: bool) -> GridResult<(Vec<f64>, Vec<f64>)> {
        transform_to_coords(
            &self.transform(),
            None,
            Some(self.width()),
            Some(self.height()),
            center,
        )
    }

    /// The tile as a GeoJSON feature.
    ///
    /// The footprint is reprojected into `crs`; `None` keeps the tile's own
    /// CRS. GeoJSON consumers expect [`Crs::wgs84`].
    pub fn geojson(&self, crs: Option<&Crs>) -> GridResult<Feature> {
        let bbox = self.bbox();
        let footprint = match crs {
            Some(dst) => {
                let transformer = CrsTransformer::new(&self.crs, dst);
                if transformer.is_identity() {
                    debug!(index = %self.index, "not reprojecting GeoJSON, output CRS is the tile CRS");
                    bbox
                } else {
                    transformer.transform_polygon(&bbox)?
                }
            }
            None => bbox,
        };

        Ok(Feature::new(
            Some(Geometry::from(&footprint)),
            TileProperties {
                horizontal: self.horizontal(),
                vertical: self.vertical(),
            },
        ))
    }

    /// Serializable description of this tile.
    pub fn to_spec(&self) -> TileSpec {
        TileSpec {
            index: self.index,
            crs: self.crs.clone(),
            bounds: self.bounds,
            res: self.res,
            size: self.size,
        }
    }

    pub fn from_spec(spec: TileSpec) -> Self {
        Self::new(spec.index, spec.crs, spec.bounds, spec.res, spec.size)
    }
}

impl PartialEq for Tile {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && self.crs == other.crs
            && self.bounds == other.bounds
            && self.res == other.res
            && self.size == other.size
    }
}

impl Eq for Tile {}

impl Hash for Tile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.crs.hash(state);
        self.bounds.to_array().map(f64::to_bits).hash(state);
        [self.res.0.to_bits(), self.res.1.to_bits()].hash(state);
        self.size.hash(state);
    }
}

/// Transport form of a [`Tile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSpec {
    pub index: TileIndex,
    pub crs: Crs,
    pub bounds: BoundingBox,
    pub res: (f64, f64),
    pub size: (usize, usize),
}
