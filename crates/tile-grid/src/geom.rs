//! Geometry checks and RFC 7946 repair for tile GeoJSON.

use geo::orient::{Direction, Orient};
use geo::{Area, BooleanOps, BoundingRect, Coord, LineString, MultiPolygon, Polygon, Rect};
use grid_common::{Feature, FeatureCollection, Geometry};
use tracing::debug;

/// True when a feature geometry is missing, empty, non-finite or has no
/// area.
pub fn is_null(geometry: Option<&Geometry>) -> bool {
    let Some(geometry) = geometry else {
        return true;
    };

    let finite = match geometry {
        Geometry::Polygon { coordinates } => {
            !coordinates.is_empty() && all_finite(coordinates.iter().flatten())
        }
        Geometry::MultiPolygon { coordinates } => {
            !coordinates.is_empty() && all_finite(coordinates.iter().flatten().flatten())
        }
    };

    !finite || geometry.to_geo().unsigned_area() == 0.0
}

fn all_finite<'a>(mut positions: impl Iterator<Item = &'a [f64; 2]>) -> bool {
    positions.all(|[x, y]| x.is_finite() && y.is_finite())
}

/// Make a collection of lon/lat features RFC 7946 compliant.
///
/// Polygons crossing the antimeridian are split into a MultiPolygon with
/// one part on each side of ±180°, and every exterior ring is wound
/// counter-clockwise. Features without geometry pass through untouched.
pub fn fix_antimeridian(collection: FeatureCollection) -> FeatureCollection {
    let features = collection
        .features
        .into_iter()
        .map(|feature| match feature.geometry {
            Some(geometry) => Feature {
                geometry: Some(fix_geometry(&geometry)),
                ..feature
            },
            None => feature,
        })
        .collect::<Vec<_>>();

    FeatureCollection::new().with_features(features)
}

fn fix_geometry(geometry: &Geometry) -> Geometry {
    let polygons: Vec<Polygon<f64>> = match geometry.to_geo() {
        geo::Geometry::Polygon(p) => vec![p],
        geo::Geometry::MultiPolygon(mp) => mp.0,
        _ => return geometry.clone(),
    };

    let parts: Vec<Polygon<f64>> = polygons
        .iter()
        .flat_map(split_polygon)
        .map(|p| p.orient(Direction::Default))
        .collect();

    match parts.as_slice() {
        [single] => Geometry::from(single),
        _ => Geometry::from(&MultiPolygon(parts)),
    }
}

/// Split one polygon at ±180°.
fn split_polygon(polygon: &Polygon<f64>) -> Vec<Polygon<f64>> {
    let unwrapped = Polygon::new(
        unwrap_ring(polygon.exterior()),
        polygon.interiors().iter().map(unwrap_ring).collect(),
    );

    let Some(rect) = unwrapped.bounding_rect() else {
        return vec![polygon.clone()];
    };
    if rect.min().x >= -180.0 && rect.max().x <= 180.0 {
        return vec![unwrapped];
    }

    debug!(
        min_x = rect.min().x,
        max_x = rect.max().x,
        "splitting polygon crossing the antimeridian"
    );

    let (min_y, max_y) = (rect.min().y, rect.max().y);
    [-360.0, 0.0, 360.0]
        .into_iter()
        .flat_map(|shift: f64| {
            let window = Rect::new(
                Coord { x: -180.0 + shift, y: min_y },
                Coord { x: 180.0 + shift, y: max_y },
            )
            .to_polygon();
            unwrapped
                .intersection(&window)
                .0
                .into_iter()
                .map(move |part| shift_polygon(&part, -shift))
        })
        .filter(|part| part.unsigned_area() > 0.0)
        .collect()
}

/// Make consecutive longitudes differ by at most 180°.
fn unwrap_ring(ring: &LineString<f64>) -> LineString<f64> {
    let mut out: Vec<Coord<f64>> = Vec::with_capacity(ring.0.len());
    for c in ring.coords() {
        let mut x = c.x;
        if let Some(prev) = out.last() {
            while x - prev.x > 180.0 {
                x -= 360.0;
            }
            while x - prev.x < -180.0 {
                x += 360.0;
            }
        }
        out.push(Coord { x, y: c.y });
    }
    LineString(out)
}

fn shift_polygon(polygon: &Polygon<f64>, dx: f64) -> Polygon<f64> {
    let shift = |ring: &LineString<f64>| {
        LineString(
            ring.coords()
                .map(|c| Coord { x: c.x + dx, y: c.y })
                .collect(),
        )
    };
    Polygon::new(
        shift(polygon.exterior()),
        polygon.interiors().iter().map(shift).collect(),
    )
}
