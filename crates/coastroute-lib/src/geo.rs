use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Mean Earth radius in kilometres, used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A geographic coordinate pair in degrees.
///
/// Immutable once produced by geocoding or coastline loading. Latitude is
/// constrained to [-90, 90] and longitude to [-180, 180] at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Create a coordinate, validating geographic bounds.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(Error::InvalidCoordinate { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    /// Great-circle distance to another coordinate in kilometres.
    ///
    /// Uses the haversine formula on a spherical Earth of radius 6371 km.
    /// This is a deliberate approximation; waypoint tolerances here are
    /// kilometres, not metres.
    pub fn haversine_km(&self, other: &Self) -> f64 {
        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let d_phi = (other.lat - self.lat).to_radians();
        let d_lambda = (other.lon - self.lon).to_radians();

        let a = (d_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lon)
    }
}

/// The proximity axis a coastline vertex was matched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Latitude,
    Longitude,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Latitude => f.write_str("latitude"),
            Axis::Longitude => f.write_str("longitude"),
        }
    }
}

/// An origin/destination pair produced by geocoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
}
