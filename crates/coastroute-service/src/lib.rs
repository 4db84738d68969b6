//! Coastal-detour route planning HTTP microservice.
//!
//! Exposes the library's trip planner over a small REST API. All blocking
//! provider I/O runs inside `spawn_blocking`; handlers stay async.

pub mod problem;
pub mod state;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use coastroute_lib::{plan_trip, ResolverConfig, TripPlan};

pub use problem::{from_lib_error, ProblemDetails};
pub use state::{AppState, AppStateError};

/// Route planning request body.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteApiRequest {
    /// Origin address.
    pub from: String,
    /// Destination address.
    pub to: String,
    /// Optional axis-band tolerance override in degrees.
    #[serde(default)]
    pub tolerance_deg: Option<f64>,
    /// Optional probe budget override.
    #[serde(default)]
    pub max_probes: Option<usize>,
}

impl RouteApiRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if self.from.trim().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "'from' must not be empty",
                request_id,
            )));
        }
        if self.to.trim().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "'to' must not be empty",
                request_id,
            )));
        }
        if let Some(tolerance) = self.tolerance_deg {
            if !tolerance.is_finite() || tolerance <= 0.0 {
                return Err(Box::new(ProblemDetails::bad_request(
                    "'tolerance_deg' must be a positive number",
                    request_id,
                )));
            }
        }
        if self.max_probes == Some(0) {
            return Err(Box::new(ProblemDetails::bad_request(
                "'max_probes' must be at least 1",
                request_id,
            )));
        }
        Ok(())
    }

    fn resolver_config(&self, base: ResolverConfig) -> ResolverConfig {
        ResolverConfig {
            tolerance_deg: self.tolerance_deg.unwrap_or(base.tolerance_deg),
            max_probes: self.max_probes.unwrap_or(base.max_probes),
            ..base
        }
    }
}

/// HTTP response: either the planned trip or an RFC 9457 problem.
enum RouteApiResponse {
    Success(TripPlan),
    Error(ProblemDetails),
}

impl IntoResponse for RouteApiResponse {
    fn into_response(self) -> axum::response::Response {
        match self {
            RouteApiResponse::Success(plan) => (StatusCode::OK, Json(plan)).into_response(),
            RouteApiResponse::Error(problem) => problem.into_response(),
        }
    }
}

/// Build the service router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/route", post(route_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handle POST /api/v1/route requests.
async fn route_handler(
    State(state): State<AppState>,
    Json(request): Json<RouteApiRequest>,
) -> RouteApiResponse {
    let request_id = generate_request_id();

    info!(
        request_id = %request_id,
        from = %request.from,
        to = %request.to,
        "handling route request"
    );

    if let Err(problem) = request.validate(&request_id) {
        return RouteApiResponse::Error(*problem);
    }

    let config = request.resolver_config(state.resolver_config());
    let blocking_state = state.clone();
    let blocking_request = request.clone();

    // The planner does blocking provider I/O; keep it off the async runtime.
    let result = tokio::task::spawn_blocking(move || {
        plan_trip(
            blocking_state.geocoder(),
            blocking_state.oracle(),
            blocking_state.coastline(),
            &blocking_request.from,
            &blocking_request.to,
            &config,
        )
    })
    .await;

    let plan = match result {
        Ok(Ok(plan)) => plan,
        Ok(Err(e)) => {
            error!(request_id = %request_id, error = %e, "trip planning failed");
            return RouteApiResponse::Error(from_lib_error(&e, &request_id));
        }
        Err(join_error) => {
            error!(request_id = %request_id, error = %join_error, "planner task panicked");
            return RouteApiResponse::Error(ProblemDetails::internal_error(
                "planner task failed",
                &request_id,
            ));
        }
    };

    info!(
        request_id = %request_id,
        waypoint = %plan.waypoint,
        probes = plan.probes,
        "route computed successfully"
    );

    RouteApiResponse::Success(plan)
}

/// Kubernetes liveness probe.
async fn health_live() -> StatusCode {
    StatusCode::OK
}

/// Kubernetes readiness probe: ready once a non-empty coastline is loaded.
async fn health_ready(State(state): State<AppState>) -> StatusCode {
    if state.coastline().is_empty() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

/// Generate a unique request ID for tracing.
fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();

    format!("req-{:x}", timestamp)
}
