//! Reprojection of points and polygons between two [`Crs`] values.

use geo::{Coord, LineString, Polygon};
use grid_common::{AlbersParams, Crs, CrsCode};
use tracing::debug;

use crate::albers::AlbersEqualArea;
use crate::geographic::Geographic;
use crate::mercator::WebMercator;
use crate::{Projection, ProjectionResult};

/// Build the projection for a CRS.
///
/// NAD83 and WGS84 are treated as the same datum.
pub fn projection_for(crs: &Crs) -> Box<dyn Projection> {
    match crs {
        Crs::Epsg(CrsCode::Epsg4326) | Crs::Epsg(CrsCode::Epsg4269) => Box::new(Geographic),
        Crs::Epsg(CrsCode::Epsg3857) => Box::new(WebMercator),
        Crs::Epsg(CrsCode::Epsg5070) => Box::new(AlbersEqualArea::new(&AlbersParams::CONUS)),
        Crs::Albers { params, .. } => Box::new(AlbersEqualArea::new(params)),
    }
}

/// Moves coordinates from a source CRS to a destination CRS through
/// geographic longitude/latitude.
pub struct CrsTransformer {
    src: Box<dyn Projection>,
    dst: Box<dyn Projection>,
    identity: bool,
}

impl CrsTransformer {
    pub fn new(src: &Crs, dst: &Crs) -> Self {
        let identity = src == dst;
        if identity {
            debug!(crs = %src.identifier(), "source and destination CRS match, skipping reprojection");
        }
        Self {
            src: projection_for(src),
            dst: projection_for(dst),
            identity,
        }
    }

    /// True when source and destination are the same CRS.
    pub fn is_identity(&self) -> bool {
        self.identity
    }

    pub fn transform_point(&self, x: f64, y: f64) -> ProjectionResult<(f64, f64)> {
        if self.identity {
            return Ok((x, y));
        }
        let (lon, lat) = self.src.inverse(x, y)?;
        self.dst.forward(lon, lat)
    }

    pub fn transform_ring(&self, ring: &LineString<f64>) -> ProjectionResult<LineString<f64>> {
        ring.coords()
            .map(|c| {
                self.transform_point(c.x, c.y)
                    .map(|(x, y)| Coord { x, y })
            })
            .collect::<ProjectionResult<Vec<_>>>()
            .map(LineString)
    }

    pub fn transform_polygon(&self, polygon: &Polygon<f64>) -> ProjectionResult<Polygon<f64>> {
        let exterior = self.transform_ring(polygon.exterior())?;
        let interiors = polygon
            .interiors()
            .iter()
            .map(|ring| self.transform_ring(ring))
            .collect::<ProjectionResult<Vec<_>>>()?;
        Ok(Polygon::new(exterior, interiors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_common::BoundingBox;

    #[test]
    fn test_identity_is_exact() {
        let t = CrsTransformer::new(&Crs::wgs84(), &Crs::wgs84());
        assert!(t.is_identity());
        assert_eq!(t.transform_point(1.5, 2.5).unwrap(), (1.5, 2.5));
    }

    #[test]
    fn test_nad83_to_wgs84_passes_through() {
        let t = CrsTransformer::new(&Crs::Epsg(CrsCode::Epsg4269), &Crs::wgs84());
        assert!(!t.is_identity());
        let (x, y) = t.transform_point(-100.0, 40.0).unwrap();
        assert!((x + 100.0).abs() < 1e-12 && (y - 40.0).abs() < 1e-12);
    }

    #[test]
    fn test_polygon_roundtrip_through_albers() {
        let albers = Crs::Epsg(CrsCode::Epsg5070);
        let to_albers = CrsTransformer::new(&Crs::wgs84(), &albers);
        let to_geog = CrsTransformer::new(&albers, &Crs::wgs84());

        let poly = BoundingBox::new(-100.0, 35.0, -95.0, 40.0).to_polygon();
        let projected = to_albers.transform_polygon(&poly).unwrap();
        let back = to_geog.transform_polygon(&projected).unwrap();

        for (a, b) in poly.exterior().coords().zip(back.exterior().coords()) {
            assert!((a.x - b.x).abs() < 1e-8);
            assert!((a.y - b.y).abs() < 1e-8);
        }
    }

    #[test]
    fn test_failure_propagates() {
        let t = CrsTransformer::new(&Crs::wgs84(), &Crs::Epsg(CrsCode::Epsg3857));
        let ring = LineString::from(vec![(0.0, 0.0), (0.0, 89.9), (1.0, 0.0), (0.0, 0.0)]);
        assert!(t.transform_ring(&ring).is_err());
    }
}
