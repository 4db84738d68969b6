//! End-to-end trip planning.
//!
//! The single entry point consumers (CLI, HTTP service) should use:
//! geocode both addresses, resolve the coastal waypoint, assemble the
//! final route.

use serde::Serialize;
use tracing::info;

use crate::coastline::CoastlineIndex;
use crate::error::Result;
use crate::geo::Coordinate;
use crate::geocode::{geocode_trip, Geocoder};
use crate::oracle::RoutingOracle;
use crate::resolve::{resolve, ResolverConfig};
use crate::route::{assemble, Route};

/// A planned coastal trip.
#[derive(Debug, Clone, Serialize)]
pub struct TripPlan {
    /// The accepted coastal waypoint.
    pub waypoint: Coordinate,
    /// Oracle probes spent during resolution.
    pub probes: usize,
    /// The assembled route.
    pub route: Route,
}

/// Plan a coastal route between two addresses.
///
/// Failure taxonomy: `GeocodeFailed` when either address does not resolve,
/// `NoCandidates` when the coastline offers no directionally valid vertex
/// even after widening, `OracleExhausted` when every probe was rejected.
pub fn plan_trip(
    geocoder: &dyn Geocoder,
    oracle: &dyn RoutingOracle,
    index: &CoastlineIndex,
    origin_address: &str,
    destination_address: &str,
    config: &ResolverConfig,
) -> Result<TripPlan> {
    let trip = geocode_trip(geocoder, origin_address, destination_address)?;
    let resolution = resolve(&trip, index, oracle, config)?;
    let route = assemble(&trip, &resolution, oracle)?;

    info!(
        waypoint = %resolution.waypoint.point,
        probes = resolution.probes,
        path_points = route.path.points.len(),
        "planned coastal trip"
    );

    Ok(TripPlan {
        waypoint: resolution.waypoint.point,
        probes: resolution.probes,
        route,
    })
}
