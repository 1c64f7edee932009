/// A geographic location in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Point { lat, lon }
    }

    /// A point with a NaN coordinate marks an absent record. It is never
    /// handed to the distance functor; queries on it yield empty results.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.lat.is_nan() || self.lon.is_nan()
    }

    // Latitude within [-90, 90] and a finite longitude. Longitude is not
    // normalized here; the geodesic solver handles wraparound.
    pub(crate) fn in_domain(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && self.lon.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((lat, lon): (f64, f64)) -> Self {
        Point { lat, lon }
    }
}

/// Reference ellipsoid, passed explicitly at index construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ellipsoid {
    /// Equatorial (semi-major) axis in meters.
    pub semi_major_axis: f64,
    /// Flattening of the ellipsoid; zero yields a sphere.
    pub flattening: f64,
}

impl Ellipsoid {
    /// WGS84 parameters.
    pub const WGS84: Ellipsoid = Ellipsoid {
        semi_major_axis: 6_378_137.0,
        flattening: 1.0 / 298.257_223_563,
    };
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Ellipsoid::WGS84
    }
}
