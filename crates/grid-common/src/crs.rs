//! Coordinate Reference System types and utilities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::{GridError, GridResult};

/// Well-known CRS codes that can be named by authority string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrsCode {
    /// WGS84 Geographic (lon/lat in degrees)
    Epsg4326,
    /// NAD83 Geographic
    Epsg4269,
    /// Web Mercator (meters)
    Epsg3857,
    /// NAD83 / CONUS Albers Equal Area (meters)
    Epsg5070,
}

impl CrsCode {
    /// Parse an authority string.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326"
    /// - "epsg:4326"
    /// - "CRS:84" (equivalent to EPSG:4326 with lon/lat axis order)
    pub fn from_authority_string(s: &str) -> GridResult<Self> {
        let normalized = s.trim().to_uppercase();

        match normalized.as_str() {
            "EPSG:4326" | "CRS:84" | "OGC:CRS84" => Ok(CrsCode::Epsg4326),
            "EPSG:4269" => Ok(CrsCode::Epsg4269),
            "EPSG:3857" | "EPSG:900913" => Ok(CrsCode::Epsg3857),
            "EPSG:5070" => Ok(CrsCode::Epsg5070),
            _ => Err(GridError::UnsupportedCrs(s.to_string())),
        }
    }

    pub fn epsg(&self) -> u32 {
        match self {
            CrsCode::Epsg4326 => 4326,
            CrsCode::Epsg4269 => 4269,
            CrsCode::Epsg3857 => 3857,
            CrsCode::Epsg5070 => 5070,
        }
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CrsCode::Epsg4326 | CrsCode::Epsg4269)
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

/// Reference ellipsoid of a projected CRS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ellipsoid {
    #[default]
    Wgs84,
    Grs80,
}

impl Ellipsoid {
    pub fn semi_major(&self) -> f64 {
        6_378_137.0
    }

    pub fn inverse_flattening(&self) -> f64 {
        match self {
            Ellipsoid::Wgs84 => 298.257_223_563,
            Ellipsoid::Grs80 => 298.257_222_101,
        }
    }

    /// First eccentricity.
    pub fn eccentricity(&self) -> f64 {
        let f = 1.0 / self.inverse_flattening();
        (2.0 * f - f * f).sqrt()
    }
}

/// Parameters of an Albers Equal Area Conic projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlbersParams {
    /// First standard parallel (degrees)
    pub lat_1: f64,
    /// Second standard parallel (degrees)
    pub lat_2: f64,
    /// Latitude of origin (degrees)
    pub lat_0: f64,
    /// Central meridian (degrees)
    pub lon_0: f64,
    #[serde(default)]
    pub x_0: f64,
    #[serde(default)]
    pub y_0: f64,
    #[serde(default)]
    pub ellipsoid: Ellipsoid,
}

impl AlbersParams {
    /// USGS CONUS Albers (the parameters behind EPSG:5070).
    pub const CONUS: AlbersParams = AlbersParams {
        lat_1: 29.5,
        lat_2: 45.5,
        lat_0: 23.0,
        lon_0: -96.0,
        x_0: 0.0,
        y_0: 0.0,
        ellipsoid: Ellipsoid::Grs80,
    };

    fn bits(&self) -> [u64; 6] {
        [
            self.lat_1.to_bits(),
            self.lat_2.to_bits(),
            self.lat_0.to_bits(),
            self.lon_0.to_bits(),
            self.x_0.to_bits(),
            self.y_0.to_bits(),
        ]
    }
}

/// A coordinate reference system.
///
/// Either a well-known authority code or a named Albers definition. Two
/// values are equal when they are structurally identical; `EPSG:5070` and an
/// inline Albers with the same parameters are different CRS values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CrsSpec", into = "CrsSpec")]
pub enum Crs {
    Epsg(CrsCode),
    Albers { name: String, params: AlbersParams },
}

impl Crs {
    /// Geographic WGS84, the default output CRS for GeoJSON.
    pub fn wgs84() -> Self {
        Crs::Epsg(CrsCode::Epsg4326)
    }

    pub fn from_authority_string(s: &str) -> GridResult<Self> {
        CrsCode::from_authority_string(s).map(Crs::Epsg)
    }

    pub fn albers(name: impl Into<String>, params: AlbersParams) -> Self {
        Crs::Albers {
            name: name.into(),
            params,
        }
    }

    pub fn is_geographic(&self) -> bool {
        match self {
            Crs::Epsg(code) => code.is_geographic(),
            Crs::Albers { .. } => false,
        }
    }

    pub fn is_projected(&self) -> bool {
        !self.is_geographic()
    }

    /// Authority string for coded CRS, name otherwise.
    pub fn identifier(&self) -> String {
        match self {
            Crs::Epsg(code) => code.to_string(),
            Crs::Albers { name, .. } => name.clone(),
        }
    }

    pub fn epsg(&self) -> Option<u32> {
        match self {
            Crs::Epsg(code) => Some(code.epsg()),
            Crs::Albers { .. } => None,
        }
    }

    /// Names of the x and y coordinate variables for data in this CRS.
    pub fn xy_coord_names(&self) -> (&'static str, &'static str) {
        if self.is_geographic() {
            ("longitude", "latitude")
        } else {
            ("x", "y")
        }
    }
}

impl Default for Crs {
    fn default() -> Self {
        Crs::wgs84()
    }
}

impl PartialEq for Crs {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Crs::Epsg(a), Crs::Epsg(b)) => a == b,
            (
                Crs::Albers {
                    name: n1,
                    params: p1,
                },
                Crs::Albers {
                    name: n2,
                    params: p2,
                },
            ) => n1 == n2 && p1.bits() == p2.bits() && p1.ellipsoid == p2.ellipsoid,
            _ => false,
        }
    }
}

impl Eq for Crs {}

impl Hash for Crs {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Crs::Epsg(code) => {
                0u8.hash(state);
                code.hash(state);
            }
            Crs::Albers { name, params } => {
                1u8.hash(state);
                name.hash(state);
                params.bits().hash(state);
                params.ellipsoid.hash(state);
            }
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::Epsg(code) => write!(f, "{}", code),
            Crs::Albers { name, params } => write!(
                f,
                "{} (+proj=aea +lat_1={} +lat_2={} +lat_0={} +lon_0={} +x_0={} +y_0={} +ellps={:?})",
                name,
                params.lat_1,
                params.lat_2,
                params.lat_0,
                params.lon_0,
                params.x_0,
                params.y_0,
                params.ellipsoid
            ),
        }
    }
}

impl From<CrsCode> for Crs {
    fn from(code: CrsCode) -> Self {
        Crs::Epsg(code)
    }
}

/// Serialized form of a [`Crs`]: an authority string or an inline Albers
/// definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum CrsSpec {
    Authority(String),
    Albers { name: String, albers: AlbersParams },
}

impl TryFrom<CrsSpec> for Crs {
    type Error = GridError;

    fn try_from(spec: CrsSpec) -> GridResult<Self> {
        match spec {
            CrsSpec::Authority(s) => Crs::from_authority_string(&s),
            CrsSpec::Albers { name, albers } => Ok(Crs::albers(name, albers)),
        }
    }
}

impl From<Crs> for CrsSpec {
    fn from(crs: Crs) -> Self {
        match crs {
            Crs::Epsg(code) => CrsSpec::Authority(code.to_string()),
            Crs::Albers { name, params } => CrsSpec::Albers {
                name,
                albers: params,
            },
        }
    }
}
