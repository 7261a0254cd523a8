//! GeoJSON types for tile footprints.
//!
//! Only the subset needed to describe tiles is modelled: polygonal
//! geometries and the tile index properties.
//!
//! See: <https://datatracker.ietf.org/doc/html/rfc7946>

use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

use crate::GridResult;

/// A GeoJSON FeatureCollection of tiles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureCollection {
    /// Type identifier (always "FeatureCollection").
    #[serde(rename = "type")]
    pub type_: String,

    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Create a new empty FeatureCollection.
    pub fn new() -> Self {
        Self {
            type_: "FeatureCollection".to_string(),
            features: Vec::new(),
        }
    }

    pub fn with_features(mut self, features: impl IntoIterator<Item = Feature>) -> Self {
        self.features.extend(features);
        self
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Serialize to a GeoJSON document.
    pub fn to_json(&self) -> GridResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> GridResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a GeoJSON document written by [`FeatureCollection::to_json`].
    pub fn from_json(json: &str) -> GridResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new()
    }
}

/// A GeoJSON Feature describing one tile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    /// Type identifier (always "Feature").
    #[serde(rename = "type")]
    pub type_: String,

    /// The footprint, `null` when it could not be computed.
    pub geometry: Option<Geometry>,

    pub properties: TileProperties,
}

impl Feature {
    pub fn new(geometry: Option<Geometry>, properties: TileProperties) -> Self {
        Self {
            type_: "Feature".to_string(),
            geometry,
            properties,
        }
    }
}

/// Tile index carried by each feature.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TileProperties {
    /// Column index.
    pub horizontal: i64,
    /// Row index.
    pub vertical: i64,
}

/// GeoJSON polygonal geometries.
///
/// Coordinates are `[x, y]` pairs; rings are closed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
}

impl Geometry {
    /// Convert to a `geo` geometry for predicates and measurement.
    pub fn to_geo(&self) -> geo::Geometry<f64> {
        match self {
            Geometry::Polygon { coordinates } => geo::Geometry::Polygon(rings_to_polygon(coordinates)),
            Geometry::MultiPolygon { coordinates } => geo::Geometry::MultiPolygon(MultiPolygon(
                coordinates.iter().map(|p| rings_to_polygon(p)).collect(),
            )),
        }
    }
}

impl From<&Polygon<f64>> for Geometry {
    fn from(polygon: &Polygon<f64>) -> Self {
        Geometry::Polygon {
            coordinates: polygon_to_rings(polygon),
        }
    }
}

impl From<&MultiPolygon<f64>> for Geometry {
    fn from(multi: &MultiPolygon<f64>) -> Self {
        Geometry::MultiPolygon {
            coordinates: multi.0.iter().map(polygon_to_rings).collect(),
        }
    }
}

fn ring_to_positions(ring: &LineString<f64>) -> Vec<[f64; 2]> {
    ring.coords().map(|c| [c.x, c.y]).collect()
}

fn polygon_to_rings(polygon: &Polygon<f64>) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(ring_to_positions)
        .collect()
}

fn positions_to_ring(positions: &[[f64; 2]]) -> LineString<f64> {
    LineString(positions.iter().map(|[x, y]| Coord { x: *x, y: *y }).collect())
}

fn rings_to_polygon(rings: &[Vec<[f64; 2]>]) -> Polygon<f64> {
    let mut rings = rings.iter().map(|r| positions_to_ring(r));
    let exterior = rings.next().unwrap_or_else(|| LineString(Vec::new()));
    Polygon::new(exterior, rings.collect())
}
