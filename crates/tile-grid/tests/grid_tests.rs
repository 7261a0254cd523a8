//! Tests for tile grid indexing, spatial queries and GeoJSON export.

use std::sync::Arc;

use geo::{polygon, Area, Geometry as GeoGeometry};
use grid_common::{BoundingBox, Crs, CrsCode, ErrorKind, Geometry, GridError};
use test_utils::bbox::NEW_ENGLAND;
use test_utils::grid::{GridParams, GEOG, SMALL, UNLIMITED};
use test_utils::{assert_approx_eq, capture_logs, init_tracing};
use tile_grid::{GeoJsonOptions, Limits, TileGrid, TileIndex, DEFAULT_SPAN};

fn build(params: GridParams, crs: Crs) -> TileGrid {
    let grid = TileGrid::new(params.ul, crs, params.res, params.size).unwrap();
    match params.limits {
        Some((rows, cols)) => grid.with_limits(Limits::new(rows, cols)),
        None => grid,
    }
}

fn small() -> TileGrid {
    build(SMALL, Crs::Epsg(CrsCode::Epsg5070))
}

fn geog() -> TileGrid {
    build(GEOG, Crs::wgs84()).with_name("GEOG")
}

fn roi(left: f64, bottom: f64, right: f64, top: f64) -> GeoGeometry<f64> {
    GeoGeometry::Polygon(BoundingBox::new(left, bottom, right, top).to_polygon())
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_grid_properties() {
    let grid = small();
    assert_eq!(grid.nrow(), 12);
    assert_eq!(grid.ncol(), 8);
    assert_eq!(grid.len(), 96);
    assert!(!grid.is_empty());
    assert_eq!(grid.rows(), 0..12);
    assert_eq!(grid.cols(), 0..8);
    assert_eq!(grid.name(), "Grid");
    assert_eq!(grid.tile_footprint(), (50.0, 50.0));
}

#[test]
fn test_grid_transform() {
    let grid = small();
    let transform = grid.transform();
    assert_eq!(transform.forward(0.0, 0.0), (0.0, 100.0));
    assert_eq!(transform.forward(10.0, 10.0), (50.0, 50.0));
}

#[test]
fn test_spec_roundtrip() {
    let grid = small().with_name("Small");
    let spec = grid.to_spec();
    assert_eq!(spec.name.as_deref(), Some("Small"));
    assert_eq!(spec.limits, Some(Limits::new((0, 11), (0, 7))));

    let rebuilt = TileGrid::from_spec(spec.clone()).unwrap();
    assert_eq!(rebuilt.to_spec(), spec);
    assert_eq!(
        rebuilt.get((3, 4)).unwrap().bounds(),
        grid.get((3, 4)).unwrap().bounds()
    );
}

// ============================================================================
// Tile access
// ============================================================================

#[test]
fn test_first_tile_bounds() {
    let grid = small();
    let tile = grid.get((0, 0)).unwrap();
    assert_eq!(tile.bounds(), BoundingBox::new(0.0, 50.0, 50.0, 100.0));
    assert_eq!(tile.crs(), grid.crs());
    assert_eq!(tile.res(), grid.res());
    assert_eq!(tile.size(), grid.size());
}

#[test]
fn test_get_within_and_outside_limits() {
    let grid = small();
    assert!(grid.get((11, 7)).is_ok());
    assert!(grid.contains(TileIndex::new(11, 7)));
    assert!(!grid.contains(TileIndex::new(12, 8)));

    let err = grid.get((12, 8)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Domain);
    let msg = err.to_string();
    assert!(msg.contains("outside of"), "{}", msg);
    assert!(msg.contains("limits"), "{}", msg);
    assert!(msg.contains("Grid"), "{}", msg);
}

#[test]
fn test_get_out_of_limits_negative_index() {
    let grid = small();
    assert!(matches!(
        grid.get((-1, 0)),
        Err(GridError::OutOfLimits { row: -1, col: 0, .. })
    ));
}

#[test]
fn test_get_by_values() {
    let grid = small();
    assert_eq!(grid.get_by_values(&[2.0, 3.0]).unwrap().index(), TileIndex::new(2, 3));
    assert!(matches!(
        grid.get_by_values(&[1.0, 2.0, 3.0]),
        Err(GridError::IndexShape { len: 3 })
    ));
    assert!(matches!(
        grid.get_by_values(&[1.5, 2.0]),
        Err(GridError::IndexType(_))
    ));
}

#[test]
fn test_tiles_are_cached() {
    let grid = small();
    assert_eq!(grid.cached_len(), 0);

    let a = grid.get((1, 1)).unwrap();
    let b = grid.get(TileIndex::new(1, 1)).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(grid.cached_len(), 1);

    let c = grid.point_to_tile(75.0, 25.0).unwrap();
    assert!(Arc::ptr_eq(&a, &c));
    assert_eq!(grid.cached_len(), 1);
}

#[test]
fn test_unlimited_grid_accepts_any_index() {
    let grid = build(UNLIMITED, Crs::wgs84());
    let tile = grid.get((-3, 1000)).unwrap();
    assert_eq!(
        tile.bounds(),
        BoundingBox::new(100_000.0, 200.0, 100_100.0, 300.0)
    );
}

#[test]
fn test_concurrent_access_shares_tiles() {
    let grid = Arc::new(small());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let grid = Arc::clone(&grid);
            std::thread::spawn(move || grid.get((5, 5)).unwrap())
        })
        .collect();

    let tiles: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for tile in &tiles[1..] {
        assert!(Arc::ptr_eq(&tiles[0], tile));
    }
    assert_eq!(grid.cached_len(), 1);
}

// ============================================================================
// Enumeration
// ============================================================================

#[test]
fn test_indices_row_major() {
    let grid = small();
    let indices: Vec<_> = grid.indices().collect();
    assert_eq!(indices.len(), 96);
    assert_eq!(indices[0], TileIndex::new(0, 0));
    assert_eq!(indices[1], TileIndex::new(0, 1));
    assert_eq!(indices[8], TileIndex::new(1, 0));
    assert_eq!(indices[95], TileIndex::new(11, 7));
}

#[test]
fn test_tiles_iterator_materializes() {
    let grid = small();
    assert_eq!(grid.tiles().take(3).count(), 3);
    assert_eq!(grid.cached_len(), 3);
    assert_eq!(grid.tiles().count(), 96);
    assert_eq!(grid.cached_len(), 96);
}

#[test]
fn test_default_span_without_limits() {
    let grid = build(UNLIMITED, Crs::wgs84()).with_name("Unlimited");
    let (rows, logs) = capture_logs(|| grid.rows());
    assert_eq!(rows, 0..DEFAULT_SPAN);
    assert!(logs.contains("WARN"), "no warning logged: {logs:?}");
    assert!(logs.contains("TileGrid 'Unlimited' does not specify limits"));

    let (_, logs) = capture_logs(|| small().rows());
    assert!(!logs.contains("does not specify limits"));

    assert_eq!(grid.rows(), 0..DEFAULT_SPAN);
    assert_eq!(grid.cols(), 0..DEFAULT_SPAN);
    assert_eq!(grid.nrow(), 50);
    assert_eq!(grid.len(), 2500);
    assert_eq!(grid.indices().last(), Some(TileIndex::new(49, 49)));
}

#[test]
fn test_every_tile_matches_its_grid_offset() {
    init_tracing();
    for (params, grid) in [(SMALL, small()), (GEOG, geog())] {
        let (width, height) = (
            params.size.0 as f64 * params.res.0,
            params.size.1 as f64 * params.res.1,
        );
        let tol = width.max(height) * 1e-9;

        for index in grid.indices() {
            let bounds = grid.get(index).unwrap().bounds();
            let left = params.ul.0 + index.col as f64 * width;
            let top = params.ul.1 - index.row as f64 * height;

            assert_approx_eq!(bounds.left, left, tol);
            assert_approx_eq!(bounds.top, top, tol);
            assert_approx_eq!(bounds.right, left + width, tol);
            assert_approx_eq!(bounds.bottom, top - height, tol);
            assert_approx_eq!(bounds.width(), width, tol);
            assert_approx_eq!(bounds.height(), height, tol);
        }
        assert_eq!(grid.cached_len(), grid.len());
    }
}

#[test]
fn test_offset_limits() {
    let grid = small().with_limits(Limits::new((2, 4), (5, 6)));
    assert_eq!(grid.rows(), 2..5);
    assert_eq!(grid.cols(), 5..7);
    assert_eq!(grid.len(), 6);
    assert_eq!(grid.indices().next(), Some(TileIndex::new(2, 5)));
    assert!(grid.get((0, 0)).is_err());
}

// ============================================================================
// Spatial queries
// ============================================================================

#[test]
fn test_point_to_tile() {
    let grid = geog();

    let tile = grid.point_to_tile(-165.0, 30.00001).unwrap();
    assert_eq!(tile.horizontal(), 1);
    assert_eq!(tile.vertical(), 4);

    // Boundary points belong to the tile below
    let tile = grid.point_to_tile(-165.0, 30.0).unwrap();
    assert_eq!(tile.horizontal(), 1);
    assert_eq!(tile.vertical(), 5);
}

#[test]
fn test_point_to_tile_outside_limits() {
    let grid = geog();
    assert!(matches!(
        grid.point_to_tile(-165.0, 85.0),
        Err(GridError::OutOfLimits { row: -1, .. })
    ));
}

#[test]
fn test_out_of_bounds_index() {
    let grid = geog();
    assert!(grid.get((13, 36)).is_ok());
    assert!(matches!(
        grid.get((14, 37)),
        Err(GridError::OutOfLimits { row: 14, col: 37, .. })
    ));
}

#[test]
fn test_bounds_to_tiles() {
    let grid = geog();
    let mut tiles: Vec<_> = grid
        .bounds_to_tiles(&BoundingBox::from(NEW_ENGLAND))
        .map(|t| t.index())
        .collect();
    tiles.sort();
    assert_eq!(tiles, vec![TileIndex::new(3, 10), TileIndex::new(3, 11)]);
}

#[test]
fn test_bounds_to_tiles_excludes_touching() {
    let grid = small();
    let tiles: Vec<_> = grid
        .bounds_to_tiles(&BoundingBox::new(0.0, 50.0, 50.0, 100.0))
        .collect();
    assert_eq!(tiles.len(), 1);
    assert_eq!(tiles[0].index(), TileIndex::new(0, 0));
}

#[test]
fn test_bounds_to_tiles_clamped_to_limits() {
    let grid = small();
    let count = grid
        .bounds_to_tiles(&BoundingBox::new(-1e6, -1e6, 1e6, 1e6))
        .count();
    assert_eq!(count, 96);

    let outside = grid
        .bounds_to_tiles(&BoundingBox::new(1000.0, 1000.0, 2000.0, 2000.0))
        .count();
    assert_eq!(outside, 0);
}

#[test]
fn test_roi_to_tiles_straddling() {
    let grid = geog();
    let tiles: Vec<_> = grid.roi_to_tiles(&roi(0.5, 0.5, 10.5, 10.5)).collect();
    assert_eq!(tiles.len(), 4);
}

#[test]
fn test_roi_to_tiles_exact_tile() {
    let grid = geog();
    let query = roi(0.0, 0.0, 10.0, 10.0);
    let tiles: Vec<_> = grid.roi_to_tiles(&query).collect();

    assert_eq!(tiles.len(), 1);
    assert_eq!(tiles[0].index(), TileIndex::new(7, 18));
    assert_approx_eq!(
        tiles[0].bbox().unsigned_area(),
        query.unsigned_area(),
        1e-9
    );
}

#[test]
fn test_roi_to_tiles_uses_geometry_not_envelope() {
    let grid = small();
    // Triangle over the top-left 2x2 tiles, missing tile (1, 1)
    let triangle = GeoGeometry::Polygon(geo::polygon![
        (x: 0.0, y: 100.0),
        (x: 90.0, y: 100.0),
        (x: 0.0, y: 10.0),
        (x: 0.0, y: 100.0),
    ]);
    let mut tiles: Vec<_> = grid.roi_to_tiles(&triangle).map(|t| t.index()).collect();
    tiles.sort();
    assert_eq!(
        tiles,
        vec![TileIndex::new(0, 0), TileIndex::new(0, 1), TileIndex::new(1, 0)]
    );
}

#[test]
fn test_roi_to_tiles_empty_geometry() {
    let grid = small();
    let empty = GeoGeometry::MultiPolygon(geo::MultiPolygon::<f64>(vec![]));
    assert_eq!(grid.roi_to_tiles(&empty).count(), 0);
}

// ============================================================================
// GeoJSON
// ============================================================================

#[test]
fn test_geojson_subset_in_grid_crs() {
    let grid = small();
    let options = GeoJsonOptions::default()
        .with_crs(None)
        .with_rows([0])
        .with_cols([0, 1]);
    let fc = grid.geojson(&options).unwrap();

    assert_eq!(fc.len(), 2);
    assert_eq!(fc.features[1].properties.horizontal, 1);
    assert_eq!(fc.features[1].properties.vertical, 0);
    match &fc.features[0].geometry {
        Some(Geometry::Polygon { coordinates }) => {
            assert!(coordinates[0].contains(&[0.0, 100.0]));
            assert!(coordinates[0].contains(&[50.0, 50.0]));
        }
        other => panic!("unexpected geometry: {:?}", other),
    }

    let json: serde_json::Value = serde_json::from_str(&fc.to_json().unwrap()).unwrap();
    assert_eq!(json["type"], "FeatureCollection");
    assert_eq!(json["features"][0]["type"], "Feature");
}

#[test]
fn test_geojson_rejects_rows_outside_limits() {
    let grid = small();
    let options = GeoJsonOptions::default().with_rows([12]);
    assert!(matches!(
        grid.geojson(&options),
        Err(GridError::OutOfLimits { row: 12, .. })
    ));
}

#[test]
fn test_geojson_reprojects_to_wgs84() {
    let grid = small();
    let options = GeoJsonOptions::default().with_rows([0]).with_cols([0]);
    let fc = grid.geojson(&options).unwrap();

    match &fc.features[0].geometry {
        Some(Geometry::Polygon { coordinates }) => {
            for [lon, lat] in &coordinates[0] {
                assert_approx_eq!(*lon, -96.0, 0.01);
                assert_approx_eq!(*lat, 23.0, 0.01);
            }
        }
        other => panic!("unexpected geometry: {:?}", other),
    }
}

#[test]
fn test_geojson_whole_grid() {
    let grid = geog();
    let fc = grid.geojson(&GeoJsonOptions::default()).unwrap();
    assert_eq!(fc.len(), 14 * 37);
}

#[test]
fn test_geojson_skip_invalid() {
    init_tracing();
    // Row 0 reaches the pole, which Web Mercator cannot represent
    let grid = TileGrid::new((-180.0, 90.0), Crs::wgs84(), (10.0, 10.0), (1, 1))
        .unwrap()
        .with_limits(Limits::new((0, 1), (0, 0)));
    let mercator = Some(Crs::Epsg(CrsCode::Epsg3857));

    let err = grid
        .geojson(&GeoJsonOptions::default().with_crs(mercator.clone()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Projection);

    let fc = grid
        .geojson(
            &GeoJsonOptions::default()
                .with_crs(mercator)
                .with_skip_invalid(true),
        )
        .unwrap();
    assert_eq!(fc.len(), 1);
    assert_eq!(fc.features[0].properties.vertical, 1);
}

#[test]
fn test_geojson_rfc7946_wraps_past_antimeridian() {
    let grid = geog();
    let options = GeoJsonOptions::default()
        .with_rows([0])
        .with_cols([36])
        .with_rfc7946(true);
    let fc = grid.geojson(&options).unwrap();

    match &fc.features[0].geometry {
        Some(Geometry::Polygon { coordinates }) => {
            for [lon, _] in &coordinates[0] {
                assert!((-180.0..=-170.0).contains(lon), "lon = {}", lon);
            }
        }
        other => panic!("unexpected geometry: {:?}", other),
    }
}

// ============================================================================
// Display
// ============================================================================

#[test]
fn test_display_summary() {
    let text = geog().to_string();
    assert!(text.starts_with("<TileGrid at "));
    assert!(text.contains("* name: GEOG"));
    assert!(text.contains("* crs=EPSG:4326"));
    assert!(text.contains("* size=(40000, 40000)"));
    assert!(text.contains("* limits=((0, 13), (0, 36))"));
}
