use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use coastroute_lib::{
    plan_trip, CoastlineIndex, Coordinate, OrsOracle, OsrmOracle, ResolverConfig, RoutingOracle,
    VworldGeocoder,
};

const COASTLINE_PATH_ENV: &str = "COASTROUTE_COASTLINE_PATH";
const VWORLD_KEY_ENV: &str = "VWORLD_API_KEY";
const ORS_KEY_ENV: &str = "ORS_API_KEY";

#[derive(Parser, Debug)]
#[command(author, version, about = "Coastal-detour route planning utilities")]
struct Cli {
    /// Override the coastline GeoJSON path (default: COASTROUTE_COASTLINE_PATH).
    #[arg(long)]
    coastline: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan a coastal route between two addresses.
    Route {
        /// Origin address.
        #[arg(long = "from")]
        from: String,
        /// Destination address.
        #[arg(long = "to")]
        to: String,
        /// Axis-band tolerance in degrees.
        #[arg(long, default_value_t = 0.1)]
        tolerance: f64,
        /// Maximum oracle probes across all rounds.
        #[arg(long = "max-probes", default_value_t = 16)]
        max_probes: usize,
        /// Route against an OSRM instance instead of OpenRouteService.
        #[arg(long = "osrm-url")]
        osrm_url: Option<String>,
        /// Emit the plan as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Inspect coastline vertices near a point.
    Coast {
        /// Center point as "lat,lon".
        #[arg(long)]
        near: String,
        /// Search radius in degrees.
        #[arg(long, default_value_t = 0.1)]
        radius: f64,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Route {
            from,
            to,
            tolerance,
            max_probes,
            osrm_url,
            json,
        } => handle_route(
            cli.coastline.as_deref(),
            &from,
            &to,
            tolerance,
            max_probes,
            osrm_url.as_deref(),
            json,
        ),
        Command::Coast { near, radius } => {
            handle_coast(cli.coastline.as_deref(), &near, radius)
        }
    }
}

fn handle_route(
    coastline: Option<&Path>,
    from: &str,
    to: &str,
    tolerance: f64,
    max_probes: usize,
    osrm_url: Option<&str>,
    json: bool,
) -> Result<()> {
    let index = load_coastline(coastline)?;
    let oracle = build_oracle(osrm_url)?;
    let geocoder = build_geocoder()?;

    let config = ResolverConfig {
        tolerance_deg: tolerance,
        max_probes,
        ..ResolverConfig::default()
    };

    let plan = plan_trip(geocoder.as_ref(), oracle.as_ref(), &index, from, to, &config)
        .context("failed to plan coastal route")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("Waypoint: {} ({} probes)", plan.waypoint, plan.probes);
    if let Some(distance) = plan.route.path.distance_m {
        println!("Distance: {:.1} km", distance / 1000.0);
    }
    if let Some(duration) = plan.route.path.duration_s {
        println!("Duration: {:.0} min", duration / 60.0);
    }
    println!("Path points: {}", plan.route.path.points.len());
    Ok(())
}

fn handle_coast(coastline: Option<&Path>, near: &str, radius: f64) -> Result<()> {
    let index = load_coastline(coastline)?;
    let center = parse_point(near)?;

    let vertices = index.within_radius(center, radius);
    if vertices.is_empty() {
        println!("No coastline vertices within {radius}° of {center}");
        return Ok(());
    }

    println!("Coastline vertices near {center}:");
    for vertex in vertices {
        println!("- {vertex}");
    }
    Ok(())
}

fn load_coastline(override_path: Option<&Path>) -> Result<CoastlineIndex> {
    let path = match override_path {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(
            env::var(COASTLINE_PATH_ENV)
                .with_context(|| format!("--coastline not given and {COASTLINE_PATH_ENV} unset"))?,
        ),
    };
    CoastlineIndex::from_geojson_path(&path)
        .with_context(|| format!("failed to load coastline from {}", path.display()))
}

fn build_oracle(osrm_url: Option<&str>) -> Result<Box<dyn RoutingOracle>> {
    if let Some(url) = osrm_url {
        return Ok(Box::new(OsrmOracle::new(url)?));
    }
    let api_key = env::var(ORS_KEY_ENV)
        .with_context(|| format!("{ORS_KEY_ENV} unset and no --osrm-url given"))?;
    Ok(Box::new(OrsOracle::new(api_key)?))
}

fn build_geocoder() -> Result<Box<dyn coastroute_lib::Geocoder>> {
    let api_key =
        env::var(VWORLD_KEY_ENV).with_context(|| format!("{VWORLD_KEY_ENV} unset"))?;
    Ok(Box::new(VworldGeocoder::new(api_key)?))
}

fn parse_point(text: &str) -> Result<Coordinate> {
    let Some((lat, lon)) = text.split_once(',') else {
        bail!("expected \"lat,lon\", got {text:?}");
    };
    let lat: f64 = lat.trim().parse().context("latitude is not a number")?;
    let lon: f64 = lon.trim().parse().context("longitude is not a number")?;
    Coordinate::new(lat, lon).context("coordinate out of range")
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
