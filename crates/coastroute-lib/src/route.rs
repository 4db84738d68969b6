//! Final route assembly.
//!
//! Once the resolver has validated a waypoint, the assembler builds the
//! ordered (origin, waypoint, destination) journey. When the accepting
//! probe already returned the full 3-point path it is reused; otherwise
//! exactly one more oracle call is issued. No geocoding happens here: the
//! assembler only consumes already-validated coordinates.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::geo::{Coordinate, TripRequest};
use crate::oracle::{RoutePath, RoutingOracle};
use crate::resolve::Resolution;

/// The assembled 3-point coastal route.
#[derive(Debug, Clone, Serialize)]
pub struct Route {
    pub origin: Coordinate,
    pub waypoint: Coordinate,
    pub destination: Coordinate,
    /// Normalized provider path through the three points.
    pub path: RoutePath,
}

/// Assemble the final route for a resolved trip.
///
/// An oracle rejection at this stage is reported as `OracleExhausted`:
/// the waypoint validated moments ago, so a failure now is a provider
/// fault rather than anything the caller can correct.
pub fn assemble(
    trip: &TripRequest,
    resolution: &Resolution,
    oracle: &dyn RoutingOracle,
) -> Result<Route> {
    let waypoint = resolution.waypoint.point;

    let path = match &resolution.path {
        Some(path) => {
            debug!("reusing accepting probe path for final route");
            path.clone()
        }
        None => {
            let points = [trip.origin, waypoint, trip.destination];
            oracle.route(&points).map_err(|rejection| {
                warn!(%rejection, "final route request rejected");
                Error::OracleExhausted {
                    probes: resolution.probes,
                }
            })?
        }
    };

    Ok(Route {
        origin: trip.origin,
        waypoint,
        destination: trip.destination,
        path,
    })
}
