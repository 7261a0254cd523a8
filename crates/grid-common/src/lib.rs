//! Transform, bounding box and window algebra shared by the tile grid crates.

pub mod affine;
pub mod bbox;
pub mod coords;
pub mod crs;
pub mod error;
pub mod geojson;
pub mod window;

pub use affine::Affine;
pub use bbox::{
    bounds_intersection, bounds_transform_union, bounds_transform_union_checked, bounds_union,
    BoundingBox,
};
pub use coords::{
    check_spacing, coords_to_bounds, coords_to_transform, inspect_coords, transform_to_bounds,
    transform_to_coords, transform_to_res, CoordsInfo,
};
pub use crs::{AlbersParams, Crs, CrsCode, Ellipsoid};
pub use error::{ErrorKind, GridError, GridResult};
pub use geojson::{Feature, FeatureCollection, Geometry, TileProperties};
pub use window::{calculate_dst_window, calculate_src_window, Window};
