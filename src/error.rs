use thiserror::Error;

/// Errors reported at the query API boundary, before any traversal begins.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// k-nearest queries require k >= 1.
    #[error("k must be at least 1")]
    ZeroK,

    /// Radius queries require a finite (or +inf), non-negative radius.
    #[error("radius must be non-negative, got {0}")]
    InvalidRadius(f64),

    /// A dataset point with latitude outside [-90, 90] or a non-finite
    /// longitude; reported with its position so the caller can fix or drop it.
    #[error("invalid coordinates (lat {lat}, lon {lon}) at dataset position {index}")]
    InvalidDatasetPoint { index: usize, lat: f64, lon: f64 },

    /// A dataset point with undefined (NaN) coordinates. Missing records must
    /// be filtered out before building; the index does not accept them.
    #[error("dataset point at position {index} has undefined coordinates")]
    MissingDatasetPoint { index: usize },

    /// A single-query point with latitude outside [-90, 90] or a non-finite
    /// longitude. In batch operations this is isolated per record instead.
    #[error("invalid query coordinates (lat {lat}, lon {lon})")]
    InvalidQuery { lat: f64, lon: f64 },
}
