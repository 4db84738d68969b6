//! Routing oracle adapters.
//!
//! The resolver treats the external directions provider as a black box that
//! can only be queried for routability. Each provider gets its own adapter
//! implementing [`RoutingOracle`]; the adapter owns the provider's wire
//! schema and normalizes every response into [`RoutePath`], which keeps the
//! resolver and assembler provider-agnostic.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::Coordinate;

/// Default per-request timeout for oracle calls. A timed-out probe is
/// treated exactly like a rejection, so this bounds each probe's latency.
pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Normalized path returned by any routing provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePath {
    /// Ordered path geometry.
    pub points: Vec<Coordinate>,
    /// Total distance in metres when the provider reports one.
    pub distance_m: Option<f64>,
    /// Total duration in seconds when the provider reports one.
    pub duration_s: Option<f64>,
}

/// Structured per-call rejection from a routing oracle.
///
/// These are probe-local outcomes: the resolver discards the candidate and
/// moves on. None of them escape a resolution as a library error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteRejection {
    /// The provider answered but found no drivable route.
    NoRoute,
    /// The provider answered with an error status or error body.
    Provider { status: u16, message: String },
    /// Network failure or timeout before a usable answer arrived.
    Transport(String),
}

impl std::fmt::Display for RouteRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteRejection::NoRoute => f.write_str("no route found"),
            RouteRejection::Provider { status, message } => {
                write!(f, "provider error {status}: {message}")
            }
            RouteRejection::Transport(message) => write!(f, "transport error: {message}"),
        }
    }
}

/// External directions provider, queried but never introspected.
///
/// Implementations must accept 2-or-more-point sequences.
pub trait RoutingOracle: Send + Sync {
    /// Request a drivable path through `points` in order.
    fn route(&self, points: &[Coordinate]) -> std::result::Result<RoutePath, RouteRejection>;
}

/// Validate the shared minimum-arity contract for oracle adapters.
pub(crate) fn require_points(points: &[Coordinate]) -> Result<()> {
    if points.len() < 2 {
        return Err(Error::TooFewPoints {
            count: points.len(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// OpenRouteService
// ---------------------------------------------------------------------------

/// Feature collection subset returned by the ORS GeoJSON directions endpoint.
#[derive(Debug, Deserialize)]
struct OrsResponse {
    features: Vec<OrsFeature>,
}

#[derive(Debug, Deserialize)]
struct OrsFeature {
    geometry: OrsGeometry,
    #[serde(default)]
    properties: OrsProperties,
}

#[derive(Debug, Deserialize)]
struct OrsGeometry {
    coordinates: Vec<Vec<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct OrsProperties {
    summary: Option<OrsSummary>,
}

#[derive(Debug, Deserialize)]
struct OrsSummary {
    distance: Option<f64>,
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OrsErrorBody {
    error: Option<OrsErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OrsErrorDetail {
    Message { message: String },
    Text(String),
}

/// OpenRouteService driving-car adapter.
pub struct OrsOracle {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OrsOracle {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openrouteservice.org";

    /// Build an adapter against the public ORS API.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, Self::DEFAULT_BASE_URL)
    }

    /// Build an adapter against a custom base URL (self-hosted ORS, tests).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(DEFAULT_ORACLE_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn parse_response(body: &str) -> std::result::Result<RoutePath, RouteRejection> {
        let parsed: OrsResponse = serde_json::from_str(body).map_err(|e| {
            RouteRejection::Provider {
                status: 200,
                message: format!("unexpected response shape: {e}"),
            }
        })?;

        let Some(feature) = parsed.features.into_iter().next() else {
            return Err(RouteRejection::NoRoute);
        };

        let points = lonlat_pairs_to_points(&feature.geometry.coordinates)?;
        let summary = feature.properties.summary;

        Ok(RoutePath {
            points,
            distance_m: summary.as_ref().and_then(|s| s.distance),
            duration_s: summary.as_ref().and_then(|s| s.duration),
        })
    }

    fn parse_error(status: StatusCode, body: &str) -> RouteRejection {
        let message = serde_json::from_str::<OrsErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .map(|detail| match detail {
                OrsErrorDetail::Message { message } => message,
                OrsErrorDetail::Text(text) => text,
            })
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());

        // ORS reports "no route" as a 404 from the directions endpoint.
        if status == StatusCode::NOT_FOUND {
            return RouteRejection::NoRoute;
        }

        RouteRejection::Provider {
            status: status.as_u16(),
            message,
        }
    }
}

impl RoutingOracle for OrsOracle {
    fn route(&self, points: &[Coordinate]) -> std::result::Result<RoutePath, RouteRejection> {
        require_points(points).map_err(|e| RouteRejection::Transport(e.to_string()))?;

        // ORS expects [lon, lat] pairs on the wire.
        let coordinates: Vec<[f64; 2]> = points.iter().map(|p| [p.lon, p.lat]).collect();
        let url = format!("{}/v2/directions/driving-car/geojson", self.base_url);

        debug!(points = points.len(), "probing ORS");

        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.api_key)
            .json(&json!({ "coordinates": coordinates }))
            .send()
            .map_err(|e| RouteRejection::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| RouteRejection::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(Self::parse_error(status, &body));
        }

        Self::parse_response(&body)
    }
}

// ---------------------------------------------------------------------------
// OSRM
// ---------------------------------------------------------------------------

/// Response subset from the OSRM route service.
///
/// `code` is `"Ok"` on success; other values (`"NoRoute"`,
/// `"InvalidQuery"`, ...) carry an optional `message`.
#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
    distance: Option<f64>,
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<Vec<f64>>,
}

/// OSRM route-service adapter (self-hosted or demo server).
pub struct OsrmOracle {
    client: Client,
    base_url: String,
}

impl OsrmOracle {
    /// Build an adapter against an OSRM instance.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(DEFAULT_ORACLE_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn parse_response(body: &str) -> std::result::Result<RoutePath, RouteRejection> {
        let parsed: OsrmResponse = serde_json::from_str(body).map_err(|e| {
            RouteRejection::Provider {
                status: 200,
                message: format!("unexpected response shape: {e}"),
            }
        })?;

        if parsed.code != "Ok" {
            if parsed.code == "NoRoute" {
                return Err(RouteRejection::NoRoute);
            }
            return Err(RouteRejection::Provider {
                status: 200,
                message: parsed.message.unwrap_or(parsed.code),
            });
        }

        let Some(route) = parsed.routes.into_iter().next() else {
            return Err(RouteRejection::NoRoute);
        };

        Ok(RoutePath {
            points: lonlat_pairs_to_points(&route.geometry.coordinates)?,
            distance_m: route.distance,
            duration_s: route.duration,
        })
    }
}

impl RoutingOracle for OsrmOracle {
    fn route(&self, points: &[Coordinate]) -> std::result::Result<RoutePath, RouteRejection> {
        require_points(points).map_err(|e| RouteRejection::Transport(e.to_string()))?;

        let waypoints = points
            .iter()
            .map(|p| format!("{},{}", p.lon, p.lat))
            .collect::<Vec<_>>()
            .join(";");
        let url = format!(
            "{}/route/v1/driving/{}?overview=full&geometries=geojson",
            self.base_url, waypoints
        );

        debug!(points = points.len(), "probing OSRM");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| RouteRejection::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| RouteRejection::Transport(e.to_string()))?;

        if !status.is_success() && !status.is_client_error() {
            // OSRM encodes routing failures in the JSON body even on 4xx,
            // so only transport-level statuses short-circuit here.
            return Err(RouteRejection::Provider {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("error").to_string(),
            });
        }

        Self::parse_response(&body)
    }
}

/// Convert provider `[lon, lat]` pair lists into path points.
fn lonlat_pairs_to_points(
    pairs: &[Vec<f64>],
) -> std::result::Result<Vec<Coordinate>, RouteRejection> {
    pairs
        .iter()
        .map(|pair| {
            let (Some(&lon), Some(&lat)) = (pair.first(), pair.get(1)) else {
                return Err(RouteRejection::Provider {
                    status: 200,
                    message: "malformed geometry position".to_string(),
                });
            };
            Coordinate::new(lat, lon).map_err(|e| RouteRejection::Provider {
                status: 200,
                message: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ors_success_response_normalizes_to_path() {
        let body = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {
                    "summary": {"distance": 52417.2, "duration": 3600.5}
                },
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[127.5, 37.0], [128.6, 38.2]]
                }
            }]
        }"#;

        let path = OrsOracle::parse_response(body).expect("parses");
        assert_eq!(path.points.len(), 2);
        assert!((path.points[0].lat - 37.0).abs() < 1e-9);
        assert!((path.points[0].lon - 127.5).abs() < 1e-9);
        assert_eq!(path.distance_m, Some(52417.2));
        assert_eq!(path.duration_s, Some(3600.5));
    }

    #[test]
    fn ors_empty_feature_list_is_no_route() {
        let body = r#"{"type": "FeatureCollection", "features": []}"#;
        let rejection = OrsOracle::parse_response(body).unwrap_err();
        assert_eq!(rejection, RouteRejection::NoRoute);
    }

    #[test]
    fn ors_404_maps_to_no_route() {
        let body = r#"{"error": {"message": "Unable to find a route"}}"#;
        let rejection = OrsOracle::parse_error(StatusCode::NOT_FOUND, body);
        assert_eq!(rejection, RouteRejection::NoRoute);
    }

    #[test]
    fn ors_error_body_message_is_surfaced() {
        let body = r#"{"error": {"message": "Rate limit exceeded"}}"#;
        let rejection = OrsOracle::parse_error(StatusCode::TOO_MANY_REQUESTS, body);
        assert_eq!(
            rejection,
            RouteRejection::Provider {
                status: 429,
                message: "Rate limit exceeded".to_string(),
            }
        );
    }

    #[test]
    fn osrm_success_response_normalizes_to_path() {
        let body = r#"{
            "code": "Ok",
            "routes": [{
                "geometry": {"type": "LineString", "coordinates": [[127.5, 37.0], [129.4, 37.05]]},
                "distance": 180000.0,
                "duration": 7000.0
            }]
        }"#;

        let path = OsrmOracle::parse_response(body).expect("parses");
        assert_eq!(path.points.len(), 2);
        assert_eq!(path.distance_m, Some(180000.0));
    }

    #[test]
    fn osrm_no_route_code_is_rejection() {
        let body = r#"{"code": "NoRoute", "message": "Impossible route"}"#;
        assert_eq!(
            OsrmOracle::parse_response(body).unwrap_err(),
            RouteRejection::NoRoute
        );
    }

    #[test]
    fn osrm_error_code_carries_message() {
        let body = r#"{"code": "InvalidQuery", "message": "Coordinates are invalid"}"#;
        let rejection = OsrmOracle::parse_response(body).unwrap_err();
        assert!(matches!(
            rejection,
            RouteRejection::Provider { message, .. } if message == "Coordinates are invalid"
        ));
    }

    #[test]
    fn single_point_request_is_rejected_before_any_io() {
        let oracle = OsrmOracle::new("http://localhost:5000").unwrap();
        let point = Coordinate::new(37.0, 127.5).unwrap();
        let rejection = oracle.route(&[point]).unwrap_err();
        assert!(matches!(rejection, RouteRejection::Transport(_)));
    }
}
