//! Geocoding adapters.
//!
//! Converts free-text addresses into coordinates through the [`Geocoder`]
//! trait. The VWorld implementation retries the query across address types
//! (road, then parcel) before reporting a miss; that normalization is
//! provider-specific and stays behind the trait.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::geo::{Coordinate, TripRequest};

/// Default per-request timeout for geocoding calls.
pub const DEFAULT_GEOCODE_TIMEOUT: Duration = Duration::from_secs(10);

/// Address-to-coordinate resolver.
///
/// `Ok(None)` means the provider answered but knows no such address.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, address: &str) -> Result<Option<Coordinate>>;
}

/// Geocode both trip endpoints, failing fast on either miss.
///
/// A miss is terminal: the core never retries address resolution.
pub fn geocode_trip(
    geocoder: &dyn Geocoder,
    origin_address: &str,
    destination_address: &str,
) -> Result<TripRequest> {
    let origin = geocoder
        .geocode(origin_address)?
        .ok_or_else(|| Error::GeocodeFailed {
            address: origin_address.to_string(),
        })?;
    let destination = geocoder
        .geocode(destination_address)?
        .ok_or_else(|| Error::GeocodeFailed {
            address: destination_address.to_string(),
        })?;

    debug!(%origin, %destination, "geocoded trip endpoints");

    Ok(TripRequest {
        origin,
        destination,
    })
}

#[derive(Debug, Deserialize)]
struct VworldEnvelope {
    response: VworldResponse,
}

#[derive(Debug, Deserialize)]
struct VworldResponse {
    #[serde(default)]
    result: Vec<VworldResult>,
}

#[derive(Debug, Deserialize)]
struct VworldResult {
    point: VworldPoint,
}

/// VWorld reports `x` as longitude and `y` as latitude, both as strings.
#[derive(Debug, Deserialize)]
struct VworldPoint {
    x: String,
    y: String,
}

/// VWorld address API adapter.
pub struct VworldGeocoder {
    client: Client,
    base_url: String,
    api_key: String,
}

impl VworldGeocoder {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.vworld.kr";

    /// Address types tried in order before reporting a miss.
    const ADDRESS_TYPES: [&'static str; 2] = ["road", "parcel"];

    /// Build an adapter against the public VWorld API.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, Self::DEFAULT_BASE_URL)
    }

    /// Build an adapter against a custom base URL (tests).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(DEFAULT_GEOCODE_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn query(&self, address: &str, address_type: &str) -> Result<Option<Coordinate>> {
        let url = format!("{}/req/address", self.base_url);
        let envelope: VworldEnvelope = self
            .client
            .get(&url)
            .query(&[
                ("service", "address"),
                ("request", "getcoord"),
                ("format", "json"),
                ("type", address_type),
                ("key", &self.api_key),
                ("address", address),
            ])
            .send()?
            .error_for_status()?
            .json()?;

        let Some(result) = envelope.response.result.into_iter().next() else {
            return Ok(None);
        };

        Self::parse_point(&result.point)
    }

    fn parse_point(point: &VworldPoint) -> Result<Option<Coordinate>> {
        let (Ok(lon), Ok(lat)) = (point.x.parse::<f64>(), point.y.parse::<f64>()) else {
            warn!(x = %point.x, y = %point.y, "unparseable vworld point, treating as miss");
            return Ok(None);
        };
        Ok(Some(Coordinate::new(lat, lon)?))
    }
}

impl Geocoder for VworldGeocoder {
    fn geocode(&self, address: &str) -> Result<Option<Coordinate>> {
        for address_type in Self::ADDRESS_TYPES {
            if let Some(coordinate) = self.query(address, address_type)? {
                debug!(address, address_type, %coordinate, "geocoded");
                return Ok(Some(coordinate));
            }
        }
        Ok(None)
    }
}
