//! Coastal waypoint resolver.
//!
//! A probe-based search against a partially observable oracle: whether a
//! coastal vertex is actually reachable by road is not knowable from
//! geometry alone, so candidates are validated one by one against the
//! routing oracle in rank order. Rejections and transport errors discard
//! the candidate and continue; exhausting a ranked list triggers one
//! widened regeneration round before the resolution fails.

use tracing::{debug, info, warn};

use crate::candidate::{generate, Candidate, GeneratorConfig};
use crate::coastline::CoastlineIndex;
use crate::error::{Error, Result};
use crate::geo::{Coordinate, TripRequest};
use crate::oracle::{RoutePath, RoutingOracle};

/// Probe shape issued per candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeMode {
    /// Probe the full (origin, candidate, destination) sequence. The
    /// accepting probe's path is kept for reuse by the assembler.
    #[default]
    FullRoute,
    /// Cheaper (origin, candidate) probe; the assembler must issue the
    /// real 3-point request afterwards.
    OriginOnly,
}

/// Tuning for a resolution run.
#[derive(Debug, Clone, Copy)]
pub struct ResolverConfig {
    /// Initial axis-band tolerance in degrees.
    pub tolerance_deg: f64,
    /// Total probe budget across all rounds.
    pub max_probes: usize,
    /// Number of widened regeneration rounds after the initial list
    /// exhausts. One by default.
    pub widenings: usize,
    /// Multiplier applied to the tolerance per widening round.
    pub widen_factor: f64,
    /// Probe shape.
    pub probe_mode: ProbeMode,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            tolerance_deg: 0.1,
            max_probes: 16,
            widenings: 1,
            widen_factor: 2.0,
            probe_mode: ProbeMode::FullRoute,
        }
    }
}

/// Resolver state, advanced once per probe.
#[derive(Debug, Clone)]
enum ResolveState {
    Probing,
    Accepted(Candidate, Option<RoutePath>),
    Exhausted,
}

/// A successful resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The accepted candidate, now the waypoint.
    pub waypoint: Candidate,
    /// Number of oracle probes spent, including the accepting one.
    pub probes: usize,
    /// The accepting probe's path, present in [`ProbeMode::FullRoute`].
    pub path: Option<RoutePath>,
}

/// Resolve the coastal waypoint for a trip.
///
/// Probes candidates strictly in rank order and returns on the first
/// acceptance. On exhaustion, candidate generation is re-run with the
/// tolerance widened by `widen_factor` per round, for up to `widenings`
/// extra rounds; already-probed vertices are skipped. Terminal outcomes:
///
/// - `Ok(resolution)` — a candidate validated against the oracle;
/// - `Err(NoCandidates)` — every round generated an empty list;
/// - `Err(OracleExhausted)` — candidates existed but none validated
///   within the probe budget.
pub fn resolve(
    trip: &TripRequest,
    index: &CoastlineIndex,
    oracle: &dyn RoutingOracle,
    config: &ResolverConfig,
) -> Result<Resolution> {
    let mut state = ResolveState::Probing;
    let mut probes = 0usize;
    let mut saw_candidates = false;
    let mut probed: Vec<Coordinate> = Vec::new();

    'rounds: for round in 0..=config.widenings {
        let tolerance = config.tolerance_deg * config.widen_factor.powi(round as i32);
        let generator = GeneratorConfig {
            tolerance_deg: tolerance,
        };
        let candidates = generate(&trip.origin, &trip.destination, index, &generator);

        if round > 0 {
            info!(
                round,
                tolerance_deg = tolerance,
                candidates = candidates.len(),
                "widened candidate search"
            );
        }

        for candidate in candidates {
            // Widened rounds regenerate supersets of earlier bands.
            if probed.contains(&candidate.point) {
                continue;
            }
            saw_candidates = true;

            if probes >= config.max_probes {
                state = ResolveState::Exhausted;
                break;
            }

            probes += 1;
            probed.push(candidate.point);

            match probe(trip, &candidate, oracle, config.probe_mode) {
                Ok(path) => {
                    state = ResolveState::Accepted(candidate, path);
                    break 'rounds;
                }
                Err(rejection) => {
                    warn!(
                        candidate = %candidate.point,
                        probe = probes,
                        %rejection,
                        "candidate rejected, continuing"
                    );
                }
            }
        }

        if matches!(state, ResolveState::Exhausted) {
            break;
        }
    }

    match state {
        ResolveState::Accepted(waypoint, path) => {
            info!(
                waypoint = %waypoint.point,
                axis = %waypoint.axis,
                probes,
                "waypoint accepted"
            );
            Ok(Resolution {
                waypoint,
                probes,
                path,
            })
        }
        ResolveState::Probing | ResolveState::Exhausted => {
            if !saw_candidates {
                debug!("no directionally valid candidates in any round");
                return Err(Error::NoCandidates);
            }
            Err(Error::OracleExhausted { probes })
        }
    }
}

fn probe(
    trip: &TripRequest,
    candidate: &Candidate,
    oracle: &dyn RoutingOracle,
    mode: ProbeMode,
) -> std::result::Result<Option<RoutePath>, crate::oracle::RouteRejection> {
    match mode {
        ProbeMode::FullRoute => {
            let points = [trip.origin, candidate.point, trip.destination];
            oracle.route(&points).map(Some)
        }
        ProbeMode::OriginOnly => {
            let points = [trip.origin, candidate.point];
            oracle.route(&points).map(|_| None)
        }
    }
}
