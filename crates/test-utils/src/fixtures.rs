//! Common test fixtures for tile grid tests.
//!
//! Boxes are `(left, bottom, right, top)`, transforms are
//! `(a, b, c, d, e, f)`, grid limits are `((row_min, row_max), (col_min, col_max))`.

/// Common bounding box definitions for testing.
pub mod bbox {
    /// 10x10 box at the origin.
    pub const BOX_1: [f64; 4] = [0.0, 0.0, 10.0, 10.0];

    /// Overlaps the lower-left quarter of [`BOX_1`].
    pub const BOX_2: [f64; 4] = [-5.0, -5.0, 5.0, 5.0];

    /// Overlaps the upper-right quarter of [`BOX_1`].
    pub const BOX_3: [f64; 4] = [5.0, 5.0, 15.0, 15.0];

    /// Shares only the right edge of [`BOX_1`].
    pub const BOX_1_RIGHT_NEIGHBOR: [f64; 4] = [10.0, 0.0, 20.0, 10.0];

    /// Disjoint from [`BOX_1`].
    pub const FAR_AWAY: [f64; 4] = [100.0, 100.0, 110.0, 110.0];

    /// Part of New England, in degrees.
    pub const NEW_ENGLAND: [f64; 4] = [-74.0, 41.0, -69.0, 44.0];
}

/// Common transform definitions for testing.
pub mod transform {
    /// 1 unit pixels with the upper-left at `(0, 10)`.
    pub const AFFINE_1M: [f64; 6] = [1.0, 0.0, 0.0, 0.0, -1.0, 10.0];

    /// 5 unit pixels with the upper-left at `(0, 10)`.
    pub const AFFINE_5M: [f64; 6] = [5.0, 0.0, 0.0, 0.0, -5.0, 10.0];

    /// 30m Landsat pixel grid.
    pub const LANDSAT_30M: [f64; 6] = [30.0, 0.0, -2565585.0, 0.0, -30.0, 3314805.0];

    /// A transform with rotation terms.
    pub const ROTATED: [f64; 6] = [1.0, 0.5, 0.0, 0.5, -1.0, 0.0];
}

/// Common tile grid parameters for testing.
pub mod grid {
    /// Plain tile grid parameters.
    #[derive(Debug, Clone, Copy)]
    pub struct GridParams {
        pub ul: (f64, f64),
        pub res: (f64, f64),
        pub size: (usize, usize),
        pub limits: Option<((i64, i64), (i64, i64))>,
    }

    /// A small grid: 50x50 unit tiles, 12 rows and 8 columns.
    pub const SMALL: GridParams = GridParams {
        ul: (0.0, 100.0),
        res: (5.0, 5.0),
        size: (10, 10),
        limits: Some(((0, 11), (0, 7))),
    };

    /// 10 degree geographic tiles.
    pub const GEOG: GridParams = GridParams {
        ul: (-180.0, 80.0),
        res: (0.00025, 0.00025),
        size: (40000, 40000),
        limits: Some(((0, 13), (0, 36))),
    };

    /// Landsat ARD CONUS (Albers, 30m, 150km tiles).
    pub const AEA_CONUS: GridParams = GridParams {
        ul: (-2565585.0, 3314805.0),
        res: (30.0, 30.0),
        size: (5000, 5000),
        limits: Some(((0, 21), (0, 32))),
    };

    /// No limits.
    pub const UNLIMITED: GridParams = GridParams {
        ul: (0.0, 0.0),
        res: (1.0, 1.0),
        size: (100, 100),
        limits: None,
    };

    impl GridParams {
        /// Real-world `(width, height)` of one tile.
        pub fn footprint(&self) -> (f64, f64) {
            (
                self.size.0 as f64 * self.res.0,
                self.size.1 as f64 * self.res.1,
            )
        }
    }
}

/// Common CRS identifiers.
pub mod crs {
    pub const EPSG_4326: &str = "EPSG:4326";
    pub const EPSG_3857: &str = "EPSG:3857";
    pub const EPSG_5070: &str = "EPSG:5070";
    pub const CRS_84: &str = "CRS:84";
}

/// Grid specification documents.
pub mod spec {
    /// A YAML document with two grids.
    pub const TWO_GRIDS_YAML: &str = r#"
SMALL:
  ul: [0.0, 100.0]
  crs: EPSG:5070
  res: [5.0, 5.0]
  size: [10, 10]
  limits: [[0, 11], [0, 7]]
  name: Small test grid
GLOBAL:
  ul: [-180.0, 90.0]
  crs: EPSG:4326
  res: [0.5, 0.5]
  size: [20, 20]
  limits: [[0, 17], [0, 35]]
"#;

    /// A grid with a negative resolution.
    pub const INVALID_RES_YAML: &str = r#"
BAD:
  ul: [0.0, 0.0]
  crs: EPSG:4326
  res: [-1.0, 1.0]
  size: [10, 10]
"#;
}
