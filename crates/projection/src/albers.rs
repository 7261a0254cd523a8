//! Albers Equal Area Conic projection (ellipsoidal).
//!
//! Used by the Landsat ARD grids and EPSG:5070. The cone constant `n`,
//! `C` and `rho0` are computed once from the standard parallels:
//!
//! ```text
//! m(lat) = cos(lat) / sqrt(1 - e^2 sin^2(lat))
//! q(lat) = (1 - e^2) * (sin(lat) / (1 - e^2 sin^2(lat))
//!          - 1/(2e) * ln((1 - e sin(lat)) / (1 + e sin(lat))))
//! n      = (m1^2 - m2^2) / (q2 - q1)
//! C      = m1^2 + n q1
//! rho    = a * sqrt(C - n q) / n
//! ```

use std::f64::consts::PI;

use grid_common::{AlbersParams, Ellipsoid};

use crate::{Projection, ProjectionError, ProjectionResult};

const MAX_ITERATIONS: usize = 15;
const CONVERGENCE: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct AlbersEqualArea {
    /// Semi-major axis (meters)
    a: f64,
    /// First eccentricity
    e: f64,
    /// Central meridian in radians
    lon0: f64,
    n: f64,
    c: f64,
    rho0: f64,
    x_0: f64,
    y_0: f64,
}

impl AlbersEqualArea {
    pub fn new(params: &AlbersParams) -> Self {
        let to_rad = PI / 180.0;
        let ellipsoid: Ellipsoid = params.ellipsoid;

        let a = ellipsoid.semi_major();
        let e = ellipsoid.eccentricity();

        let lat0 = params.lat_0 * to_rad;
        let lat1 = params.lat_1 * to_rad;
        let lat2 = params.lat_2 * to_rad;

        let m1 = msfn(lat1, e);
        let m2 = msfn(lat2, e);
        let q0 = qsfn(lat0, e);
        let q1 = qsfn(lat1, e);
        let q2 = qsfn(lat2, e);

        // Tangent cone when both parallels coincide
        let n = if (lat1 - lat2).abs() > 1e-10 {
            (m1 * m1 - m2 * m2) / (q2 - q1)
        } else {
            lat1.sin()
        };

        let c = m1 * m1 + n * q1;
        let rho0 = a * (c - n * q0).abs().sqrt() / n;

        Self {
            a,
            e,
            lon0: params.lon_0 * to_rad,
            n,
            c,
            rho0,
            x_0: params.x_0,
            y_0: params.y_0,
        }
    }

    /// Invert `q(lat)` by Newton iteration.
    fn lat_from_q(&self, q: f64) -> f64 {
        let e2 = self.e * self.e;
        let mut lat = (q / 2.0).clamp(-1.0, 1.0).asin();

        for _ in 0..MAX_ITERATIONS {
            let sin_lat = lat.sin();
            let one_minus = 1.0 - e2 * sin_lat * sin_lat;
            let delta = (q - qsfn(lat, self.e)) * one_minus * one_minus / (2.0 * (1.0 - e2) * lat.cos());
            lat += delta;
            if delta.abs() < CONVERGENCE {
                break;
            }
        }
        lat
    }
}

impl Projection for AlbersEqualArea {
    fn forward(&self, lon: f64, lat: f64) -> ProjectionResult<(f64, f64)> {
        if !lon.is_finite() || !lat.is_finite() {
            return Err(ProjectionError::NonFinite { x: lon, y: lat });
        }
        if lat.abs() > 90.0 {
            return Err(ProjectionError::LatitudeOutOfRange { lat });
        }

        let to_rad = PI / 180.0;

        // Normalize longitude difference to [-π, π]
        let mut dlon = lon * to_rad - self.lon0;
        while dlon > PI {
            dlon -= 2.0 * PI;
        }
        while dlon < -PI {
            dlon += 2.0 * PI;
        }

        let q = qsfn(lat * to_rad, self.e);
        let rho = self.a * (self.c - self.n * q).abs().sqrt() / self.n;
        let theta = self.n * dlon;

        let x = rho * theta.sin() + self.x_0;
        let y = self.rho0 - rho * theta.cos() + self.y_0;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> ProjectionResult<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ProjectionError::NonFinite { x, y });
        }

        let to_deg = 180.0 / PI;
        let xp = x - self.x_0;
        let yp = self.rho0 - (y - self.y_0);
        let (xn, yn) = if self.n < 0.0 { (-xp, -yp) } else { (xp, yp) };

        let rho = (xn * xn + yn * yn).sqrt();
        let theta = xn.atan2(yn);
        let q = (self.c - (rho * self.n / self.a).powi(2)) / self.n;

        // |q| can not exceed its value at the poles
        let q_pole = qsfn(PI / 2.0, self.e);
        if q.abs() > q_pole + 1e-9 {
            return Err(ProjectionError::OutsideProjection { x, y });
        }

        let lat = self.lat_from_q(q.clamp(-q_pole, q_pole));
        let lon = self.lon0 + theta / self.n;
        if !lat.is_finite() || !lon.is_finite() {
            return Err(ProjectionError::OutsideProjection { x, y });
        }
        Ok((lon * to_deg, lat * to_deg))
    }
}

fn msfn(lat: f64, e: f64) -> f64 {
    let sin_lat = lat.sin();
    lat.cos() / (1.0 - e * e * sin_lat * sin_lat).sqrt()
}

fn qsfn(lat: f64, e: f64) -> f64 {
    let sin_lat = lat.sin();
    let e_sin = e * sin_lat;
    (1.0 - e * e)
        * (sin_lat / (1.0 - e_sin * e_sin)
            - (1.0 / (2.0 * e)) * ((1.0 - e_sin) / (1.0 + e_sin)).ln())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conus() -> AlbersEqualArea {
        AlbersEqualArea::new(&AlbersParams::CONUS)
    }

    #[test]
    fn test_origin() {
        let (x, y) = conus().forward(-96.0, 23.0).unwrap();
        assert!(x.abs() < 1e-6, "x = {}", x);
        assert!(y.abs() < 1e-6, "y = {}", y);
    }

    #[test]
    fn test_symmetric_about_central_meridian() {
        let proj = conus();
        let (x_east, y_east) = proj.forward(-86.0, 40.0).unwrap();
        let (x_west, y_west) = proj.forward(-106.0, 40.0).unwrap();
        assert!((x_east + x_west).abs() < 1e-6);
        assert!((y_east - y_west).abs() < 1e-6);
        assert!(x_east > 0.0);
    }

    #[test]
    fn test_roundtrip() {
        let proj = conus();
        let cases = [
            (-96.0, 39.0),
            (-74.0, 40.7),
            (-87.6, 41.9),
            (-118.2, 34.0),
            (-122.4, 37.8),
        ];
        for (lon, lat) in cases {
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert!((lon - lon2).abs() < 1e-9, "{} != {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-9, "{} != {}", lat, lat2);
        }
    }

    #[test]
    fn test_false_origin() {
        let params = AlbersParams {
            x_0: 1000.0,
            y_0: -500.0,
            ..AlbersParams::CONUS
        };
        let (x, y) = AlbersEqualArea::new(&params).forward(-96.0, 23.0).unwrap();
        assert!((x - 1000.0).abs() < 1e-6);
        assert!((y + 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_far_point_is_outside() {
        assert!(matches!(
            conus().inverse(0.0, 1e9),
            Err(ProjectionError::OutsideProjection { .. })
        ));
    }
}
