//! Handler tests against stub providers.

use axum_test::TestServer;
use serde_json::{json, Value};

use coastroute_lib::{
    CoastlineIndex, Coordinate, Geocoder, ResolverConfig, Result as LibResult, RoutePath,
    RouteRejection, RoutingOracle,
};
use coastroute_service::{app, AppState};

struct StubGeocoder;

impl Geocoder for StubGeocoder {
    fn geocode(&self, address: &str) -> LibResult<Option<Coordinate>> {
        match address {
            "Seoul" => Ok(Some(Coordinate::new(37.00, 127.50).unwrap())),
            "Sokcho" => Ok(Some(Coordinate::new(38.20, 128.60).unwrap())),
            _ => Ok(None),
        }
    }
}

struct StubOracle {
    accept: bool,
}

impl RoutingOracle for StubOracle {
    fn route(&self, points: &[Coordinate]) -> Result<RoutePath, RouteRejection> {
        if self.accept {
            Ok(RoutePath {
                points: points.to_vec(),
                distance_m: Some(250_000.0),
                duration_s: Some(10_800.0),
            })
        } else {
            Err(RouteRejection::NoRoute)
        }
    }
}

fn coastal_index() -> CoastlineIndex {
    CoastlineIndex::from_vertices(vec![
        Coordinate::new(37.05, 129.40).unwrap(),
        Coordinate::new(37.08, 129.30).unwrap(),
    ])
}

fn server(index: CoastlineIndex, accept: bool) -> TestServer {
    let state = AppState::new(
        index,
        Box::new(StubGeocoder),
        Box::new(StubOracle { accept }),
        ResolverConfig::default(),
    );
    TestServer::new(app(state)).expect("build test server")
}

#[tokio::test]
async fn plans_a_route_between_known_addresses() {
    let server = server(coastal_index(), true);

    let response = server
        .post("/api/v1/route")
        .json(&json!({"from": "Seoul", "to": "Sokcho"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["probes"], 1);
    assert_eq!(body["route"]["path"]["points"].as_array().unwrap().len(), 3);
    let waypoint_lat = body["waypoint"]["lat"].as_f64().unwrap();
    assert!((waypoint_lat - 37.0).abs() < 0.2);
}

#[tokio::test]
async fn unknown_address_yields_geocode_problem() {
    let server = server(coastal_index(), true);

    let response = server
        .post("/api/v1/route")
        .json(&json!({"from": "Atlantis", "to": "Sokcho"}))
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["type"], "/problems/geocode-failed");
    assert!(body["detail"].as_str().unwrap().contains("Atlantis"));
}

#[tokio::test]
async fn empty_coastline_yields_no_candidates_problem() {
    let server = server(CoastlineIndex::from_vertices(Vec::new()), true);

    let response = server
        .post("/api/v1/route")
        .json(&json!({"from": "Seoul", "to": "Sokcho"}))
        .await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["type"], "/problems/no-coastal-candidates");
}

#[tokio::test]
async fn rejecting_oracle_yields_bad_gateway() {
    let server = server(coastal_index(), false);

    let response = server
        .post("/api/v1/route")
        .json(&json!({"from": "Seoul", "to": "Sokcho"}))
        .await;

    assert_eq!(response.status_code().as_u16(), 502);
    let body: Value = response.json();
    assert_eq!(body["type"], "/problems/no-drivable-route");
}

#[tokio::test]
async fn empty_from_field_is_rejected_before_planning() {
    let server = server(coastal_index(), true);

    let response = server
        .post("/api/v1/route")
        .json(&json!({"from": "  ", "to": "Sokcho"}))
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["type"], "/problems/invalid-request");
}

#[tokio::test]
async fn zero_probe_budget_is_rejected() {
    let server = server(coastal_index(), true);

    let response = server
        .post("/api/v1/route")
        .json(&json!({"from": "Seoul", "to": "Sokcho", "max_probes": 0}))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn liveness_is_always_ok() {
    let server = server(CoastlineIndex::from_vertices(Vec::new()), true);
    server.get("/health/live").await.assert_status_ok();
}

#[tokio::test]
async fn readiness_requires_a_non_empty_coastline() {
    let ready = server(coastal_index(), true);
    ready.get("/health/ready").await.assert_status_ok();

    let not_ready = server(CoastlineIndex::from_vertices(Vec::new()), true);
    assert_eq!(
        not_ready.get("/health/ready").await.status_code().as_u16(),
        503
    );
}
