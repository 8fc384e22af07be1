//! Geographic coordinate type and distance functions.
//!
//! Segment lengths feed straight into the passenger-car emission model, so
//! `GeoPoint` is double precision and the default distance is the WGS-84
//! geodesic from the `geo` crate (Karney's algorithm, which also converges for
//! antipodal pairs).

use ::geo::{Distance, Geodesic, Haversine, Point};

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// `[lat, lon]`, the layout used by the spatial indices.
    #[inline]
    pub fn to_array(self) -> [f64; 2] {
        [self.lat, self.lon]
    }

    /// [`::geo`] point; x is longitude.
    #[inline]
    pub fn to_point(self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }

    /// Geodesic distance in kilometres on the WGS-84 ellipsoid.
    pub fn distance_km(self, other: GeoPoint) -> f64 {
        Geodesic.distance(self.to_point(), other.to_point()) / 1_000.0
    }

    /// Great-circle distance in kilometres on a sphere of mean radius.
    pub fn haversine_km(self, other: GeoPoint) -> f64 {
        Haversine.distance(self.to_point(), other.to_point()) / 1_000.0
    }

    /// Unweighted arithmetic mean of a set of points.
    ///
    /// Returns `None` for an empty slice.
    pub fn mean(points: &[GeoPoint]) -> Option<GeoPoint> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let (lat, lon) = points
            .iter()
            .fold((0.0, 0.0), |(la, lo), p| (la + p.lat, lo + p.lon));
        Some(GeoPoint::new(lat / n, lon / n))
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
