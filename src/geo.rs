//! Great-circle geometry.
//!
//! Platform-agnostic distance and bearing computations. All coordinates
//! use WGS84 (lat/lon in degrees). Nothing here validates its input:
//! out-of-range or NaN coordinates produce whatever the formulas yield.

use serde::{Deserialize, Serialize};

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    #[serde(alias = "lng")]
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// True if latitude is within [-90, 90] and longitude within [-180, 180].
    pub fn is_valid(&self) -> bool {
        self.is_finite() && (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between two coordinates in meters.
pub fn distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    // Rounding can push h slightly above 1 for antipodal points.
    // clamp keeps NaN, min would turn it into 1.0.
    2.0 * EARTH_RADIUS_M * h.sqrt().clamp(0.0, 1.0).asin()
}

/// Initial bearing from `a` to `b` in degrees [0, 360).
pub fn bearing(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Map a compass reading into [0, 360). Returns None for NaN or infinity.
pub fn normalize_heading(degrees: f64) -> Option<f64> {
    if !degrees.is_finite() {
        return None;
    }
    let h = degrees.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    Some(if h >= 360.0 { 0.0 } else { h })
}

/// Signed difference `to - from` between two angles, in (-180, 180].
pub fn angle_between(from: f64, to: f64) -> f64 {
    let d = (to - from).rem_euclid(360.0);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}
