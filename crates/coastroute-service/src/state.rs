//! Application state for the route service.
//!
//! The coastline is loaded once at startup and shared read-only across
//! handlers; the provider adapters live behind trait objects so tests can
//! substitute stubs.

use std::env;
use std::path::Path;
use std::sync::Arc;

use coastroute_lib::{
    CoastlineIndex, Geocoder, OrsOracle, ResolverConfig, RoutingOracle, VworldGeocoder,
};

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// Required configuration is missing.
    MissingConfig(String),

    /// Failed to load the coastline geometry.
    CoastlineLoad(coastroute_lib::Error),

    /// Failed to construct a provider adapter.
    Adapter(coastroute_lib::Error),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingConfig(name) => write!(f, "missing configuration: {name}"),
            Self::CoastlineLoad(e) => write!(f, "failed to load coastline: {e}"),
            Self::Adapter(e) => write!(f, "failed to build provider adapter: {e}"),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CoastlineLoad(e) | Self::Adapter(e) => Some(e),
            Self::MissingConfig(_) => None,
        }
    }
}

/// Shared application state for all axum handlers.
///
/// Cheaply cloneable (`Arc` internally); share via axum's `State`
/// extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    coastline: CoastlineIndex,
    geocoder: Box<dyn Geocoder>,
    oracle: Box<dyn RoutingOracle>,
    resolver: ResolverConfig,
}

impl AppState {
    /// Assemble state from explicit parts (tests inject stubs here).
    pub fn new(
        coastline: CoastlineIndex,
        geocoder: Box<dyn Geocoder>,
        oracle: Box<dyn RoutingOracle>,
        resolver: ResolverConfig,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                coastline,
                geocoder,
                oracle,
                resolver,
            }),
        }
    }

    /// Load production state from the environment.
    ///
    /// Reads `COASTROUTE_COASTLINE_PATH`, `VWORLD_API_KEY`, and
    /// `ORS_API_KEY`.
    pub fn from_env() -> Result<Self, AppStateError> {
        let coastline_path = env::var("COASTROUTE_COASTLINE_PATH")
            .map_err(|_| AppStateError::MissingConfig("COASTROUTE_COASTLINE_PATH".to_string()))?;
        let vworld_key = env::var("VWORLD_API_KEY")
            .map_err(|_| AppStateError::MissingConfig("VWORLD_API_KEY".to_string()))?;
        let ors_key = env::var("ORS_API_KEY")
            .map_err(|_| AppStateError::MissingConfig("ORS_API_KEY".to_string()))?;

        tracing::info!(path = %coastline_path, "loading coastline");
        let coastline = CoastlineIndex::from_geojson_path(Path::new(&coastline_path))
            .map_err(AppStateError::CoastlineLoad)?;
        tracing::info!(vertices = coastline.len(), "coastline loaded");

        let geocoder = VworldGeocoder::new(vworld_key).map_err(AppStateError::Adapter)?;
        let oracle = OrsOracle::new(ors_key).map_err(AppStateError::Adapter)?;

        Ok(Self::new(
            coastline,
            Box::new(geocoder),
            Box::new(oracle),
            ResolverConfig::default(),
        ))
    }

    pub fn coastline(&self) -> &CoastlineIndex {
        &self.inner.coastline
    }

    pub fn geocoder(&self) -> &dyn Geocoder {
        self.inner.geocoder.as_ref()
    }

    pub fn oracle(&self) -> &dyn RoutingOracle {
        self.inner.oracle.as_ref()
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        self.inner.resolver
    }
}
