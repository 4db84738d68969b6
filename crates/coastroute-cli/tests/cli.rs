//! Integration tests for the coastroute CLI.
//!
//! These cover argument validation, the `coast` inspection subcommand
//! against a fixture GeoJSON, and exit codes. The `route` subcommand needs
//! live provider credentials, so only its configuration errors are tested.

use std::io::Write;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{NamedTempFile, TempDir};

const FIXTURE_GEOJSON: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "LineString",
                "coordinates": [[129.40, 37.05], [129.41, 37.20]]
            }
        }
    ]
}"#;

fn fixture_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(FIXTURE_GEOJSON.as_bytes())
        .expect("write fixture");
    file
}

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("coastroute").expect("binary exists");
    // Keep ambient credentials out of the test environment.
    cmd.env_remove("COASTROUTE_COASTLINE_PATH")
        .env_remove("VWORLD_API_KEY")
        .env_remove("ORS_API_KEY");
    cmd
}

#[test]
fn coast_lists_vertices_near_a_point() {
    let fixture = fixture_file();

    cli()
        .args(["--coastline"])
        .arg(fixture.path())
        .args(["coast", "--near", "37.05,129.40", "--radius", "0.05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("37.05000"))
        .stdout(predicate::str::contains("129.40000"));
}

#[test]
fn coast_reports_when_nothing_is_near() {
    let fixture = fixture_file();

    cli()
        .args(["--coastline"])
        .arg(fixture.path())
        .args(["coast", "--near", "33.0,126.0", "--radius", "0.05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No coastline vertices"));
}

#[test]
fn coast_rejects_malformed_point() {
    let fixture = fixture_file();

    cli()
        .args(["--coastline"])
        .arg(fixture.path())
        .args(["coast", "--near", "surely-not-a-point"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("lat,lon"));
}

#[test]
fn missing_coastline_configuration_fails_with_context() {
    cli()
        .args(["coast", "--near", "37.0,129.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("COASTROUTE_COASTLINE_PATH"));
}

#[test]
fn nonexistent_coastline_file_fails_loudly() {
    let missing = PathBuf::from("/definitely/not/here.geojson");

    cli()
        .args(["--coastline"])
        .arg(&missing)
        .args(["coast", "--near", "37.0,129.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load coastline"));
}

#[test]
fn coastline_env_var_is_honoured() {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("coast.geojson");
    std::fs::write(&path, FIXTURE_GEOJSON).expect("write fixture");

    cli()
        .env("COASTROUTE_COASTLINE_PATH", &path)
        .args(["coast", "--near", "37.05,129.40", "--radius", "0.05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Coastline vertices"));
}

#[test]
fn route_without_credentials_points_at_the_missing_key() {
    let fixture = fixture_file();

    cli()
        .args(["--coastline"])
        .arg(fixture.path())
        .args(["route", "--from", "A", "--to", "B"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ORS_API_KEY"));
}

#[test]
fn route_requires_both_endpoints() {
    cli()
        .args(["route", "--from", "A"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--to"));
}
