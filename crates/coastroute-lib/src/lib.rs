//! coastroute library entry points.
//!
//! This crate exposes the coastal waypoint resolver: load a coastline
//! geometry, generate and rank candidate waypoints for a trip, validate
//! them against a routing oracle, and assemble the final 3-point route.
//! Higher-level consumers (CLI, HTTP service) should only depend on the
//! functions exported here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod candidate;
pub mod coastline;
pub mod error;
pub mod geo;
pub mod geocode;
pub mod oracle;
pub mod plan;
pub mod resolve;
pub mod route;

pub use candidate::{dominant_axis, generate, Candidate, GeneratorConfig};
pub use coastline::CoastlineIndex;
pub use error::{Error, Result};
pub use geo::{Axis, Coordinate, TripRequest};
pub use geocode::{geocode_trip, Geocoder, VworldGeocoder};
pub use oracle::{OrsOracle, OsrmOracle, RoutePath, RouteRejection, RoutingOracle};
pub use plan::{plan_trip, TripPlan};
pub use resolve::{resolve, ProbeMode, Resolution, ResolverConfig};
pub use route::{assemble, Route};
