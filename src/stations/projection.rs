//! Albers equal-area conic projection on the GRS 80 ellipsoid, used to measure
//! buffer distances in meters.

use geo::{Coord, MapCoords, MultiPolygon, Point};

/// Forward Albers equal-area conic projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlbersEqualArea {
    semi_major_axis: f64,
    eccentricity: f64,
    n: f64,
    c: f64,
    rho_0: f64,
    lon_0: f64,
}

impl AlbersEqualArea {
    /// GRS 80 semi-major axis in meters.
    pub const GRS80_A: f64 = 6_378_137.0;
    /// GRS 80 first eccentricity squared.
    pub const GRS80_E2: f64 = 0.006_694_380_022_90;

    /// Builds the projection from standard parallels, latitude and longitude of
    /// origin (all in degrees) and the ellipsoid.
    pub fn new(
        lat_1: f64,
        lat_2: f64,
        lat_0: f64,
        lon_0: f64,
        semi_major_axis: f64,
        eccentricity_squared: f64,
    ) -> Self {
        let e = eccentricity_squared.sqrt();
        let (phi_1, phi_2, phi_0) = (lat_1.to_radians(), lat_2.to_radians(), lat_0.to_radians());
        let m_1 = m(phi_1, eccentricity_squared);
        let m_2 = m(phi_2, eccentricity_squared);
        let q_1 = q(phi_1, e);
        let q_2 = q(phi_2, e);
        let q_0 = q(phi_0, e);
        let n = if (phi_1 - phi_2).abs() < 1e-10 {
            phi_1.sin()
        } else {
            (m_1 * m_1 - m_2 * m_2) / (q_2 - q_1)
        };
        let c = m_1 * m_1 + n * q_1;
        let rho_0 = semi_major_axis * (c - n * q_0).max(0.0).sqrt() / n;
        Self {
            semi_major_axis,
            eccentricity: e,
            n,
            c,
            rho_0,
            lon_0: lon_0.to_radians(),
        }
    }

    /// CONUS Albers (EPSG:5070): parallels 29.5 and 45.5, origin 23N 96W.
    pub fn conus() -> Self {
        Self::new(29.5, 45.5, 23.0, -96.0, Self::GRS80_A, Self::GRS80_E2)
    }

    /// Projects a longitude/latitude pair in degrees to `(x, y)` meters.
    pub fn project(&self, longitude: f64, latitude: f64) -> (f64, f64) {
        let phi = latitude.to_radians();
        let q = q(phi, self.eccentricity);
        let rho = self.semi_major_axis * (self.c - self.n * q).max(0.0).sqrt() / self.n;
        let theta = self.n * (longitude.to_radians() - self.lon_0);
        (rho * theta.sin(), self.rho_0 - rho * theta.cos())
    }

    pub fn project_point(&self, point: Point<f64>) -> Point<f64> {
        let (x, y) = self.project(point.x(), point.y());
        Point::new(x, y)
    }

    pub fn project_multipolygon(&self, area: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        area.map_coords(|Coord { x, y }| {
            let (x, y) = self.project(x, y);
            Coord { x, y }
        })
    }
}

fn m(phi: f64, e2: f64) -> f64 {
    let sin = phi.sin();
    phi.cos() / (1.0 - e2 * sin * sin).sqrt()
}

fn q(phi: f64, e: f64) -> f64 {
    let sin = phi.sin();
    let e_sin = e * sin;
    (1.0 - e * e)
        * (sin / (1.0 - e_sin * e_sin) - (1.0 / (2.0 * e)) * ((1.0 - e_sin) / (1.0 + e_sin)).ln())
}
