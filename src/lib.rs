//! Exact k-nearest-neighbor and radius search over geodesic distances on a
//! reference ellipsoid.
//!
//! The index is built once over a fixed set of points and answers repeated
//! queries without rebuilding. It relies only on the metric's triangle
//! inequality, so any conforming distance function can be injected in place
//! of the default WGS84 geodesic.
//!
//! ```
//! use geonear::{GeoIndex, Point};
//!
//! let index = GeoIndex::build(vec![
//!     Point::new(52.5200, 13.4050), // Berlin
//!     Point::new(48.8566, 2.3522),  // Paris
//!     Point::new(51.5074, -0.1278), // London
//! ])?;
//!
//! // Two nearest to Frankfurt, ascending by distance in meters.
//! let nearest = index.k_nearest(&Point::new(50.1109, 8.6821), 2)?;
//! assert_eq!(nearest.len(), 2);
//! # Ok::<(), geonear::Error>(())
//! ```

mod distance;
mod error;
mod index;
mod node;
mod point;

pub use distance::{GeodesicDistance, Metric};
pub use error::Error;
pub use index::{GeoIndex, Neighbor};
pub use point::{Ellipsoid, Point};
