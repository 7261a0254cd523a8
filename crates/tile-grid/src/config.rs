//! Tile grid specifications and the packaged grid definitions.
//!
//! A specification file is a YAML mapping from grid key to [`GridSpec`]:
//!
//! ```yaml
//! LANDSAT_ARD_CU:
//!   ul: [-2565585.0, 3314805.0]
//!   crs: EPSG:5070
//!   res: [30.0, 30.0]
//!   size: [5000, 5000]
//!   limits: [[0, 21], [0, 32]]
//!   name: Landsat ARD - CONUS
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use grid_common::{Crs, GridError, GridResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::grid::{Limits, TileGrid};

/// Environment variable naming a specification file to use instead of the
/// packaged one.
pub const SPEC_PATH_ENV: &str = "TILE_GRID_SPEC_PATH";

const PACKAGED_SPEC: &str = include_str!("../data/tilegrids.yaml");

/// Parameters of one tile grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Upper-left `(x, y)` of tile `(0, 0)`.
    pub ul: (f64, f64),
    pub crs: Crs,
    /// Pixel `(x, y)` resolution.
    pub res: (f64, f64),
    /// Pixels per tile, `(ncols, nrows)`.
    pub size: (usize, usize),
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<Limits>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl GridSpec {
    /// Check the numeric parameters, naming `key` in any error.
    pub fn validate(&self, key: &str) -> GridResult<()> {
        let fail = |msg: String| Err(GridError::config(format!("grid \"{}\": {}", key, msg)));

        if !(self.ul.0.is_finite() && self.ul.1.is_finite()) {
            return fail(format!("upper left must be finite, got {:?}", self.ul));
        }
        if !(self.res.0 > 0.0 && self.res.1 > 0.0) || !self.res.0.is_finite() || !self.res.1.is_finite() {
            return fail(format!("resolution must be positive, got {:?}", self.res));
        }
        if self.size.0 == 0 || self.size.1 == 0 {
            return fail(format!("tile size must be non-zero, got {:?}", self.size));
        }
        Ok(())
    }
}

/// Parse a specification document into grids keyed by their map key.
pub fn load_grids_from_str(yaml: &str) -> GridResult<BTreeMap<String, TileGrid>> {
    let specs: BTreeMap<String, GridSpec> = serde_yaml::from_str(yaml)?;

    let mut grids = BTreeMap::new();
    for (key, mut spec) in specs {
        spec.validate(&key)?;
        if spec.name.is_none() {
            spec.name = Some(key.clone());
        }
        debug!(grid = %key, "loaded tile grid specification");
        grids.insert(key, TileGrid::from_spec(spec)?);
    }

    Ok(grids)
}

/// Load grids from a YAML file.
pub fn load_grids_from_path<P: AsRef<Path>>(path: P) -> GridResult<BTreeMap<String, TileGrid>> {
    let path = path.as_ref();
    info!(path = ?path, "loading tile grids");
    let content = fs::read_to_string(path)?;
    load_grids_from_str(&content)
}

/// Load the grids packaged with this crate.
pub fn load_grids() -> GridResult<BTreeMap<String, TileGrid>> {
    load_grids_from_str(PACKAGED_SPEC)
}

/// Load grids from `$TILE_GRID_SPEC_PATH` when set, else the packaged grids.
pub fn load_grids_from_env() -> GridResult<BTreeMap<String, TileGrid>> {
    match std::env::var(SPEC_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => load_grids_from_path(path.trim()),
        _ => load_grids(),
    }
}

/// Load a single packaged grid by key.
pub fn load_grid(key: &str) -> GridResult<TileGrid> {
    load_grids()?
        .remove(key)
        .ok_or_else(|| GridError::GridNotFound(key.to_string()))
}
