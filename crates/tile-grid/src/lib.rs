//! Tile grids over projected and geographic coordinate systems.
//!
//! A [`TileGrid`] divides a plane into fixed-size tiles addressed by
//! `(row, col)`. Tiles are built lazily and cached, so a grid with millions
//! of potential tiles only holds the ones that were asked for.
//!
//! ```no_run
//! use tile_grid::{load_grid, GeoJsonOptions};
//! use grid_common::BoundingBox;
//!
//! let grid = load_grid("GEOG_10DEG")?;
//! let tile = grid.point_to_tile(-72.5, 42.0)?;
//! println!("h{:02}v{:02}", tile.horizontal(), tile.vertical());
//!
//! let n = grid
//!     .bounds_to_tiles(&BoundingBox::new(-74.0, 41.0, -69.0, 44.0))
//!     .count();
//! let collection = grid.geojson(&GeoJsonOptions::default().with_rows(0..2))?;
//! # let _ = (n, collection);
//! # Ok::<(), grid_common::GridError>(())
//! ```

pub mod config;
pub mod geom;
pub mod grid;
pub mod tile;

pub use config::{
    load_grid, load_grids, load_grids_from_env, load_grids_from_path, load_grids_from_str,
    GridSpec, SPEC_PATH_ENV,
};
pub use geom::{fix_antimeridian, is_null};
pub use grid::{GeoJsonOptions, Limits, TileGrid, DEFAULT_NAME, DEFAULT_SPAN};
pub use grid_common::{GridError, GridResult};
pub use tile::{Tile, TileIndex, TileSpec};
