//! Geographic coordinate type and spatial utilities.
//!
//! `GeoPoint` uses `f64` latitude/longitude.  Coordinates are formatted into
//! routing-service URLs, where single precision would shift points by up to
//! a metre and change which road segment the service snaps to.

use serde::{Deserialize, Serialize};

/// Mean Earth radius, metres.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Spherical-mercator sphere radius (EPSG:3857), metres.
const MERCATOR_RADIUS_M: f64 = 6_378_137.0;

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Approximate bounding-box check, much cheaper than `distance_m` for
    /// quick rejection when cropping a graph to a radius.
    #[inline]
    pub fn within_bbox(self, center: GeoPoint, half_deg: f64) -> bool {
        (self.lat - center.lat).abs() <= half_deg
            && (self.lon - center.lon).abs() <= half_deg
    }

    /// Spherical-mercator `(x, y)` in metres, used for rendering.
    pub fn to_mercator(self) -> (f64, f64) {
        let x = MERCATOR_RADIUS_M * self.lon.to_radians();
        let y = MERCATOR_RADIUS_M
            * (std::f64::consts::FRAC_PI_4 + self.lat.to_radians() * 0.5).tan().ln();
        (x, y)
    }

    /// `lon,lat` as expected by OSRM-style URL paths.
    pub fn lon_lat(self) -> String {
        format!("{:.6},{:.6}", self.lon, self.lat)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
