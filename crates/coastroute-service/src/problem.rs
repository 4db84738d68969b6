//! RFC 9457 Problem Details for HTTP APIs.
//!
//! Provides structured error responses following the Problem Details
//! standard and maps the library's failure taxonomy onto HTTP statuses so
//! client UIs can distinguish "bad addresses" from "no coastal detour"
//! from "no drivable route".
//! See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use coastroute_lib::Error as LibError;

/// Problem type URI for unresolvable addresses.
pub const PROBLEM_GEOCODE_FAILED: &str = "/problems/geocode-failed";

/// Problem type URI for trips with no coastal candidates.
pub const PROBLEM_NO_CANDIDATES: &str = "/problems/no-coastal-candidates";

/// Problem type URI for trips where every candidate was rejected.
pub const PROBLEM_ORACLE_EXHAUSTED: &str = "/problems/no-drivable-route";

/// Problem type URI for invalid request parameters.
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";

/// Problem type URI for internal server errors.
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

/// RFC 9457 Problem Details response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type (relative).
    #[serde(rename = "type")]
    pub type_uri: String,

    /// Short, human-readable summary of the problem.
    pub title: String,

    /// HTTP status code for this problem.
    pub status: u16,

    /// Human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// URI reference identifying the specific occurrence (request ID).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl ProblemDetails {
    /// Create a new ProblemDetails with required fields.
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
        }
    }

    /// Add a detailed explanation of this specific problem occurrence.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Add the request identifier for tracing.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// Create a 400 Bad Request problem for invalid input.
    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// Create a 500 Internal Server Error problem.
    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INTERNAL_ERROR,
            "Internal Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}

/// Map a library error onto its problem document.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match error {
        LibError::GeocodeFailed { address } => ProblemDetails::new(
            PROBLEM_GEOCODE_FAILED,
            "Address Not Found",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(format!("Could not geocode address '{address}'"))
        .with_request_id(request_id),

        LibError::NoCandidates => ProblemDetails::new(
            PROBLEM_NO_CANDIDATES,
            "No Coastal Detour",
            StatusCode::NOT_FOUND,
        )
        .with_detail("No coastline near the origin offers a waypoint toward the destination")
        .with_request_id(request_id),

        LibError::OracleExhausted { probes } => ProblemDetails::new(
            PROBLEM_ORACLE_EXHAUSTED,
            "No Drivable Route",
            StatusCode::BAD_GATEWAY,
        )
        .with_detail(format!(
            "The directions provider rejected all {probes} probed coastal waypoints"
        ))
        .with_request_id(request_id),

        other => ProblemDetails::internal_error(other.to_string(), request_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geocode_failure_maps_to_400() {
        let error = LibError::GeocodeFailed {
            address: "nowhere".to_string(),
        };
        let problem = from_lib_error(&error, "req-1");
        assert_eq!(problem.status, 400);
        assert_eq!(problem.type_uri, PROBLEM_GEOCODE_FAILED);
        assert!(problem.detail.unwrap().contains("nowhere"));
    }

    #[test]
    fn no_candidates_maps_to_404() {
        let problem = from_lib_error(&LibError::NoCandidates, "req-2");
        assert_eq!(problem.status, 404);
        assert_eq!(problem.type_uri, PROBLEM_NO_CANDIDATES);
    }

    #[test]
    fn oracle_exhausted_maps_to_502() {
        let problem = from_lib_error(&LibError::OracleExhausted { probes: 7 }, "req-3");
        assert_eq!(problem.status, 502);
        assert!(problem.detail.unwrap().contains('7'));
    }

    #[test]
    fn other_errors_map_to_500() {
        let problem = from_lib_error(&LibError::TooFewPoints { count: 1 }, "req-4");
        assert_eq!(problem.status, 500);
    }
}
