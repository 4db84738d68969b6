//! Candidate generation and ranking for coastal waypoints.
//!
//! Given an origin and destination, pulls coastline vertices near the
//! origin's latitude band and longitude band, keeps only those that lie in
//! the direction of travel along the dominant axis, and ranks the survivors
//! by great-circle distance to the destination.

use tracing::debug;

use crate::coastline::CoastlineIndex;
use crate::geo::{Axis, Coordinate};

/// Tuning for candidate generation.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorConfig {
    /// Half-width of the axis proximity bands in degrees (~11 km per 0.1°).
    pub tolerance_deg: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { tolerance_deg: 0.1 }
    }
}

/// A coastline vertex under consideration as the intermediate waypoint.
///
/// Created fresh per resolution request and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// The vertex coordinate.
    pub point: Coordinate,
    /// Which proximity band matched this vertex.
    pub axis: Axis,
    /// Great-circle distance from the origin in kilometres.
    pub to_origin_km: f64,
    /// Great-circle distance to the destination in kilometres.
    pub to_destination_km: f64,
}

impl Candidate {
    fn new(point: Coordinate, axis: Axis, origin: &Coordinate, destination: &Coordinate) -> Self {
        Self {
            point,
            axis,
            to_origin_km: origin.haversine_km(&point),
            to_destination_km: destination.haversine_km(&point),
        }
    }

    /// Ranking score; lower is better.
    pub fn score(&self) -> f64 {
        self.to_destination_km
    }
}

/// Name the axis with the larger absolute origin/destination delta.
///
/// Equal deltas resolve to latitude.
pub fn dominant_axis(origin: &Coordinate, destination: &Coordinate) -> Axis {
    let d_lat = (destination.lat - origin.lat).abs();
    let d_lon = (destination.lon - origin.lon).abs();
    if d_lon > d_lat {
        Axis::Longitude
    } else {
        Axis::Latitude
    }
}

/// Produce the ranked candidate list for a trip.
///
/// Pulls both axis bands around the origin, filters each to vertices that
/// move from origin toward destination along the dominant axis, scores the
/// survivors by distance to the destination, and returns the merged list
/// score-ascending with ties broken by distance to the origin. An empty
/// list is a valid outcome.
pub fn generate(
    origin: &Coordinate,
    destination: &Coordinate,
    index: &CoastlineIndex,
    config: &GeneratorConfig,
) -> Vec<Candidate> {
    let axis = dominant_axis(origin, destination);

    let lat_pool = index.near_latitude(origin.lat, config.tolerance_deg);
    let lon_pool = index.near_longitude(origin.lon, config.tolerance_deg);

    let mut candidates: Vec<Candidate> = lat_pool
        .into_iter()
        .map(|point| (point, Axis::Latitude))
        .chain(lon_pool.into_iter().map(|point| (point, Axis::Longitude)))
        .filter(|(point, _)| in_direction(origin, destination, point, axis))
        .map(|(point, matched)| Candidate::new(point, matched, origin, destination))
        .collect();

    candidates.sort_by(|a, b| {
        a.score()
            .total_cmp(&b.score())
            .then_with(|| a.to_origin_km.total_cmp(&b.to_origin_km))
    });

    // A vertex sitting in both bands would be probed twice otherwise.
    candidates.dedup_by(|a, b| a.point == b.point);

    debug!(
        dominant_axis = %axis,
        tolerance_deg = config.tolerance_deg,
        candidates = candidates.len(),
        "generated waypoint candidates"
    );

    candidates
}

/// A point is in-direction when its dominant-axis offset from the origin
/// has the same sign as the destination's. Points exactly level with the
/// origin on that axis are dropped (they neither advance nor backtrack).
fn in_direction(
    origin: &Coordinate,
    destination: &Coordinate,
    point: &Coordinate,
    axis: Axis,
) -> bool {
    let (travel, offset) = match axis {
        Axis::Latitude => (destination.lat - origin.lat, point.lat - origin.lat),
        Axis::Longitude => (destination.lon - origin.lon, point.lon - origin.lon),
    };
    travel * offset > 0.0
}
