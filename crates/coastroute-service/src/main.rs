//! Service entry point.
//!
//! # Configuration
//!
//! - `COASTROUTE_COASTLINE_PATH` - Path to the coastline GeoJSON (required)
//! - `VWORLD_API_KEY` - Geocoding provider key (required)
//! - `ORS_API_KEY` - Directions provider key (required)
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text

use std::env;
use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use coastroute_service::{app, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let port: u16 = env::var("SERVICE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let state = AppState::from_env()?;
    info!(
        vertices = state.coastline().len(),
        port = port,
        "starting route service"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let use_json = env::var("LOG_FORMAT")
        .map(|format| format != "text")
        .unwrap_or(true);

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);
    if use_json {
        builder.json().init();
    } else {
        builder.init();
    }
}
