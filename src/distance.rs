use geographiclib_rs::{Geodesic, InverseGeodesic};

use crate::point::{Ellipsoid, Point};

/// Distance functor over geographic points.
///
/// Implementations must be non-negative, symmetric, zero only for identical
/// locations, and satisfy the triangle inequality; geodesic distance on an
/// ellipsoid qualifies. The index never calls a metric with missing (NaN)
/// coordinates.
pub trait Metric {
    fn distance(&self, a: &Point, b: &Point) -> f64;
}

// Closures serve as metrics, so tests can inject a cheap planar distance.
impl<F> Metric for F
where
    F: Fn(&Point, &Point) -> f64,
{
    fn distance(&self, a: &Point, b: &Point) -> f64 {
        self(a, b)
    }
}

/// Shortest-path surface distance on a reference ellipsoid, in meters.
pub struct GeodesicDistance {
    ellipsoid: Ellipsoid,
    geod: Geodesic,
}

impl GeodesicDistance {
    #[must_use]
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        GeodesicDistance {
            ellipsoid,
            geod: Geodesic::new(ellipsoid.semi_major_axis, ellipsoid.flattening),
        }
    }

    #[must_use]
    pub fn wgs84() -> Self {
        GeodesicDistance::new(Ellipsoid::WGS84)
    }

    #[must_use]
    pub fn ellipsoid(&self) -> Ellipsoid {
        self.ellipsoid
    }
}

impl Metric for GeodesicDistance {
    fn distance(&self, a: &Point, b: &Point) -> f64 {
        self.geod.inverse(a.lat, a.lon, b.lat, b.lon)
    }
}

impl Default for GeodesicDistance {
    fn default() -> Self {
        GeodesicDistance::wgs84()
    }
}

impl std::fmt::Debug for GeodesicDistance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeodesicDistance")
            .field("ellipsoid", &self.ellipsoid)
            .finish()
    }
}
