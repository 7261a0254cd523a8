//! Tile grids: a lazily populated mapping from `(row, col)` to [`Tile`].

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::sync::{Arc, Mutex, PoisonError};

use geo::{Geometry, Relate};
use grid_common::{Affine, BoundingBox, Crs, FeatureCollection, GridError, GridResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::GridSpec;
use crate::geom::{fix_antimeridian, is_null};
use crate::tile::{Tile, TileIndex};

/// Rows and columns enumerated for a grid without [`Limits`].
pub const DEFAULT_SPAN: i64 = 50;

/// Name given to grids constructed without one.
pub const DEFAULT_NAME: &str = "Grid";

/// Inclusive row and column index limits of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[[i64; 2]; 2]", into = "[[i64; 2]; 2]")]
pub struct Limits {
    /// `(min, max)` row
    pub rows: (i64, i64),
    /// `(min, max)` column
    pub cols: (i64, i64),
}

impl Limits {
    /// Each pair may be given in either order.
    pub fn new(rows: (i64, i64), cols: (i64, i64)) -> Self {
        Self {
            rows: (rows.0.min(rows.1), rows.0.max(rows.1)),
            cols: (cols.0.min(cols.1), cols.0.max(cols.1)),
        }
    }

    pub fn contains(&self, index: TileIndex) -> bool {
        (self.rows.0..=self.rows.1).contains(&index.row)
            && (self.cols.0..=self.cols.1).contains(&index.col)
    }
}

impl From<[[i64; 2]; 2]> for Limits {
    fn from([rows, cols]: [[i64; 2]; 2]) -> Self {
        Self::new((rows[0], rows[1]), (cols[0], cols[1]))
    }
}

impl From<Limits> for [[i64; 2]; 2] {
    fn from(limits: Limits) -> Self {
        [
            [limits.rows.0, limits.rows.1],
            [limits.cols.0, limits.cols.1],
        ]
    }
}

impl fmt::Display for Limits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(({}, {}), ({}, {}))",
            self.rows.0, self.rows.1, self.cols.0, self.cols.1
        )
    }
}

/// Options for [`TileGrid::geojson`].
#[derive(Debug, Clone)]
pub struct GeoJsonOptions {
    /// Output CRS; `None` keeps the grid's CRS.
    pub crs: Option<Crs>,
    /// Rows to export instead of the grid's rows.
    pub rows: Option<Vec<i64>>,
    /// Columns to export instead of the grid's columns.
    pub cols: Option<Vec<i64>>,
    /// Split polygons at the antimeridian and wind exteriors
    /// counter-clockwise.
    pub rfc7946: bool,
    /// Drop tiles whose geometry could not be reprojected or is degenerate.
    pub skip_invalid: bool,
}

impl Default for GeoJsonOptions {
    fn default() -> Self {
        Self {
            crs: Some(Crs::wgs84()),
            rows: None,
            cols: None,
            rfc7946: false,
            skip_invalid: false,
        }
    }
}

impl GeoJsonOptions {
    pub fn with_crs(mut self, crs: Option<Crs>) -> Self {
        self.crs = crs;
        self
    }

    pub fn with_rows(mut self, rows: impl IntoIterator<Item = i64>) -> Self {
        self.rows = Some(rows.into_iter().collect());
        self
    }

    pub fn with_cols(mut self, cols: impl IntoIterator<Item = i64>) -> Self {
        self.cols = Some(cols.into_iter().collect());
        self
    }

    pub fn with_rfc7946(mut self, rfc7946: bool) -> Self {
        self.rfc7946 = rfc7946;
        self
    }

    pub fn with_skip_invalid(mut self, skip_invalid: bool) -> Self {
        self.skip_invalid = skip_invalid;
        self
    }
}

/// A tiling scheme over a projected or geographic plane.
///
/// Tile `(row, col)` covers `size` pixels of `res` starting `row` tile
/// heights below and `col` tile widths right of `ul`. Tiles are built on
/// first access and cached for the life of the grid, so repeated lookups
/// return the same `Arc<Tile>`.
pub struct TileGrid {
    ul: (f64, f64),
    crs: Crs,
    res: (f64, f64),
    size: (usize, usize),
    limits: Option<Limits>,
    name: String,
    tiles: Mutex<HashMap<TileIndex, Arc<Tile>>>,
}

impl TileGrid {
    /// Create an unlimited grid named [`DEFAULT_NAME`].
    ///
    /// Resolution components must be positive and finite and tile sizes
    /// non-zero.
    pub fn new(
        ul: (f64, f64),
        crs: Crs,
        res: (f64, f64),
        size: (usize, usize),
    ) -> GridResult<Self> {
        if !(ul.0.is_finite() && ul.1.is_finite()) {
            return Err(GridError::config(format!(
                "upper left must be finite, got {:?}",
                ul
            )));
        }
        if !(res.0 > 0.0 && res.1 > 0.0 && res.0.is_finite() && res.1.is_finite()) {
            return Err(GridError::config(format!(
                "resolution must be positive, got {:?}",
                res
            )));
        }
        if size.0 == 0 || size.1 == 0 {
            return Err(GridError::config(format!(
                "tile size must be non-zero, got {:?}",
                size
            )));
        }

        Ok(Self {
            ul,
            crs,
            res,
            size,
            limits: None,
            name: DEFAULT_NAME.to_string(),
            tiles: Mutex::new(HashMap::new()),
        })
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Build a grid from a specification, naming it `spec.name` or
    /// [`DEFAULT_NAME`].
    pub fn from_spec(spec: GridSpec) -> GridResult<Self> {
        let name = spec.name.unwrap_or_else(|| DEFAULT_NAME.to_string());
        let grid = Self::new(spec.ul, spec.crs, spec.res, spec.size)
            .map_err(|e| GridError::config(format!("grid \"{}\": {}", name, e)))?
            .with_name(name);

        Ok(match spec.limits {
            Some(limits) => grid.with_limits(limits),
            None => grid,
        })
    }

    pub fn to_spec(&self) -> GridSpec {
        GridSpec {
            ul: self.ul,
            crs: self.crs.clone(),
            res: self.res,
            size: self.size,
            limits: self.limits,
            name: Some(self.name.clone()),
        }
    }

    pub fn ul(&self) -> (f64, f64) {
        self.ul
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    pub fn res(&self) -> (f64, f64) {
        self.res
    }

    pub fn size(&self) -> (usize, usize) {
        self.size
    }

    pub fn limits(&self) -> Option<Limits> {
        self.limits
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The affine transform of the grid's pixel space.
    pub fn transform(&self) -> Affine {
        Affine::new(self.res.0, 0.0, self.ul.0, 0.0, -self.res.1, self.ul.1)
    }

    /// Real-world `(width, height)` of one tile.
    pub fn tile_footprint(&self) -> (f64, f64) {
        (
            self.size.0 as f64 * self.res.0,
            self.size.1 as f64 * self.res.1,
        )
    }

    // === Enumeration ===

    fn guard_limits(&self) -> Limits {
        match self.limits {
            Some(limits) => limits,
            None => {
                warn!(
                    grid = %self.name,
                    span = DEFAULT_SPAN,
                    "TileGrid '{}' does not specify limits, so has an unlimited number of \
                     rows/columns. Defaulting to {}",
                    self.name,
                    DEFAULT_SPAN
                );
                Limits::new((0, DEFAULT_SPAN - 1), (0, DEFAULT_SPAN - 1))
            }
        }
    }

    /// Row indices of the grid.
    pub fn rows(&self) -> Range<i64> {
        let limits = self.guard_limits();
        limits.rows.0..limits.rows.1 + 1
    }

    /// Column indices of the grid.
    pub fn cols(&self) -> Range<i64> {
        let limits = self.guard_limits();
        limits.cols.0..limits.cols.1 + 1
    }

    pub fn nrow(&self) -> usize {
        self.rows().count()
    }

    pub fn ncol(&self) -> usize {
        self.cols().count()
    }

    /// Number of tiles in the grid.
    pub fn len(&self) -> usize {
        let limits = self.guard_limits();
        let nrow = (limits.rows.1 - limits.rows.0 + 1) as usize;
        let ncol = (limits.cols.1 - limits.cols.0 + 1) as usize;
        nrow * ncol
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every index of the grid, row-major.
    pub fn indices(&self) -> impl Iterator<Item = TileIndex> {
        let limits = self.guard_limits();
        let cols = limits.cols.0..=limits.cols.1;
        (limits.rows.0..=limits.rows.1)
            .flat_map(move |row| cols.clone().map(move |col| TileIndex::new(row, col)))
    }

    /// Every tile of the grid, row-major, materialized lazily.
    pub fn tiles(&self) -> impl Iterator<Item = Arc<Tile>> + '_ {
        self.indices().map(move |index| self.materialize(index))
    }

    /// Number of tiles built so far.
    pub fn cached_len(&self) -> usize {
        self.tiles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    // === Tile access ===

    /// True when `index` lies inside the grid's limits. Unlimited grids
    /// contain every index.
    pub fn contains(&self, index: TileIndex) -> bool {
        self.limits.map_or(true, |limits| limits.contains(index))
    }

    /// Return the tile at `index`, building and caching it on first access.
    pub fn get(&self, index: impl Into<TileIndex>) -> GridResult<Arc<Tile>> {
        let index = index.into();
        if let Some(limits) = self.limits {
            if !limits.contains(index) {
                return Err(GridError::OutOfLimits {
                    row: index.row,
                    col: index.col,
                    grid: self.name.clone(),
                    limits: limits.to_string(),
                });
            }
        }
        Ok(self.materialize(index))
    }

    /// [`TileGrid::get`] for untyped indexes, e.g. parsed from JSON.
    pub fn get_by_values(&self, values: &[f64]) -> GridResult<Arc<Tile>> {
        self.get(TileIndex::from_values(values)?)
    }

    /// The tile containing point `(x, y)`, given in the grid's CRS.
    ///
    /// A point on a tile boundary belongs to the tile right of and below it.
    pub fn point_to_tile(&self, x: f64, y: f64) -> GridResult<Arc<Tile>> {
        let (px, py) = self.tile_footprint();
        let col = ((x - self.ul.0) / px).floor() as i64;
        let row = ((self.ul.1 - y) / py).floor() as i64;
        self.get(TileIndex::new(row, col))
    }

    /// Tiles sharing area with `bounds`, which is in the grid's CRS.
    ///
    /// Tiles that only touch `bounds` along an edge or at a corner are
    /// excluded. The iterator is lazy; only visited tiles are built.
    pub fn bounds_to_tiles(
        &self,
        bounds: &BoundingBox,
    ) -> impl Iterator<Item = Arc<Tile>> + '_ {
        let query = bounds.normalized();
        self.frame(query)
            .filter(move |index| self.index_to_bounds(*index).intersects(&query))
            .map(move |index| self.materialize(index))
    }

    /// Tiles sharing area with a region of interest in the grid's CRS.
    ///
    /// Candidates come from the region's bounding box and are then tested
    /// against the region itself; tiles touching it only along its boundary
    /// are excluded.
    pub fn roi_to_tiles(&self, roi: &Geometry<f64>) -> impl Iterator<Item = Arc<Tile>> + '_ {
        let roi = roi.clone();
        let frame = BoundingBox::from_geometry(&roi);
        if frame.is_none() {
            debug!(grid = %self.name, "empty region of interest");
        }

        frame
            .into_iter()
            .flat_map(move |bounds| self.frame(bounds))
            .filter(move |index| {
                let footprint = Geometry::Polygon(self.index_to_bounds(*index).to_polygon());
                let matrix = footprint.relate(&roi);
                matrix.is_intersects() && !matrix.is_touches()
            })
            .map(move |index| self.materialize(index))
    }

    /// Export tiles as a GeoJSON FeatureCollection.
    ///
    /// Rows and columns default to the grid's own (see [`TileGrid::rows`]).
    /// Explicit rows and columns must lie inside the grid's limits.
    pub fn geojson(&self, options: &GeoJsonOptions) -> GridResult<FeatureCollection> {
        let rows: Vec<i64> = match &options.rows {
            Some(rows) => rows.clone(),
            None => self.rows().collect(),
        };
        let cols: Vec<i64> = match &options.cols {
            Some(cols) => cols.clone(),
            None => self.cols().collect(),
        };

        let mut features = Vec::with_capacity(rows.len() * cols.len());
        for &row in &rows {
            for &col in &cols {
                let tile = self.get(TileIndex::new(row, col))?;
                match tile.geojson(options.crs.as_ref()) {
                    Ok(feature) => {
                        if options.skip_invalid && is_null(feature.geometry.as_ref()) {
                            debug!(index = %tile.index(), "skipping tile with null geometry");
                            continue;
                        }
                        features.push(feature);
                    }
                    Err(e) if options.skip_invalid => {
                        debug!(index = %tile.index(), error = %e, "skipping tile that failed to reproject");
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        let collection = FeatureCollection::new().with_features(features);
        Ok(if options.rfc7946 {
            fix_antimeridian(collection)
        } else {
            collection
        })
    }

    // === Helpers ===

    fn index_to_bounds(&self, index: TileIndex) -> BoundingBox {
        let (ulx, uly) = self.ul;
        let (sx, sy) = (self.size.0 as f64, self.size.1 as f64);
        let (rx, ry) = self.res;
        let (row, col) = (index.row as f64, index.col as f64);

        BoundingBox::new(
            ulx + col * sx * rx,
            uly - (row + 1.0) * sy * ry,
            ulx + (col + 1.0) * sx * rx,
            uly - row * sy * ry,
        )
    }

    /// Build or fetch a tile without checking limits.
    fn materialize(&self, index: TileIndex) -> Arc<Tile> {
        let mut tiles = self.tiles.lock().unwrap_or_else(PoisonError::into_inner);
        tiles
            .entry(index)
            .or_insert_with(|| {
                Arc::new(Tile::new(
                    index,
                    self.crs.clone(),
                    self.index_to_bounds(index),
                    self.res,
                    self.size,
                ))
            })
            .clone()
    }

    /// Candidate indices whose tiles could overlap `bounds`, clamped to the
    /// grid's limits.
    fn frame(&self, bounds: BoundingBox) -> impl Iterator<Item = TileIndex> {
        let (px, py) = self.tile_footprint();
        let mut cols = (
            ((bounds.left - self.ul.0) / px).floor() as i64,
            ((bounds.right - self.ul.0) / px).floor() as i64,
        );
        let mut rows = (
            ((self.ul.1 - bounds.top) / py).floor() as i64,
            ((self.ul.1 - bounds.bottom) / py).floor() as i64,
        );

        if let Some(limits) = self.limits {
            rows = (rows.0.max(limits.rows.0), rows.1.min(limits.rows.1));
            cols = (cols.0.max(limits.cols.0), cols.1.min(limits.cols.1));
        }

        (rows.0..=rows.1).flat_map(move |row| {
            (cols.0..=cols.1).map(move |col| TileIndex::new(row, col))
        })
    }
}

impl fmt::Debug for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileGrid")
            .field("name", &self.name)
            .field("ul", &self.ul)
            .field("crs", &self.crs)
            .field("res", &self.res)
            .field("size", &self.size)
            .field("limits", &self.limits)
            .field("cached", &self.cached_len())
            .finish()
    }
}

impl fmt::Display for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<TileGrid at {:p}>", self)?;
        writeln!(f, "    * name: {}", self.name)?;
        writeln!(f, "    * ul=({}, {})", self.ul.0, self.ul.1)?;
        writeln!(f, "    * crs={}", self.crs)?;
        writeln!(f, "    * res=({}, {})", self.res.0, self.res.1)?;
        writeln!(f, "    * size=({}, {})", self.size.0, self.size.1)?;
        match &self.limits {
            Some(limits) => write!(f, "    * limits={}", limits),
            None => write!(f, "    * limits=None"),
        }
    }
}
