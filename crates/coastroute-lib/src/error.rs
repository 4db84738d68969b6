use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the coastroute library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
///
/// Only terminal failures are represented here. Per-probe oracle rejections
/// and transport errors are swallowed inside the resolver loop and never
/// escape as `Error` values.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when an address could not be resolved to a coordinate.
    #[error("could not geocode address: {address}")]
    GeocodeFailed { address: String },

    /// Raised when the coastline yielded no directionally valid candidates,
    /// even after the widened search.
    #[error("no coastal waypoint candidates near the origin")]
    NoCandidates,

    /// Raised when candidates existed but every probe was rejected by the
    /// routing oracle, including after the widened search.
    #[error("routing oracle rejected all {probes} probed candidates")]
    OracleExhausted { probes: usize },

    /// Raised when a coordinate lies outside geographic bounds.
    #[error("coordinate out of range: lat={lat}, lon={lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// Coastline geometry file could not be located.
    #[error("coastline file not found at {}", path.display())]
    CoastlineNotFound { path: PathBuf },

    /// Coastline geometry could not be parsed.
    #[error("failed to parse coastline geometry: {message}")]
    CoastlineParse { message: String },

    /// Raised when a route is requested with fewer than two points.
    #[error("route requires at least 2 points, got {count}")]
    TooFewPoints { count: usize },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Wrapper for JSON (de)serialization errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
