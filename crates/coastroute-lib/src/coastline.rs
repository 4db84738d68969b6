//! Coastline geometry index.
//!
//! Loads a GeoJSON polyline collection once at startup, flattens every
//! geometry into a vertex set, and answers the two query shapes the
//! candidate ranker needs: "vertices within ±ε of a latitude" and
//! "vertices within ±ε of a longitude". A 2D KD-tree additionally backs
//! radius (buffer) queries in degree space.
//!
//! The index is read-only after construction and safely shared across
//! concurrent trip requests.

use std::fs;
use std::path::Path;

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::geo::Coordinate;

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

/// A GeoJSON position. Extra dimensions (altitude) are tolerated and ignored.
type Position = Vec<f64>;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    GeometryCollection { geometries: Vec<Geometry> },
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
}

// Bare geometries must be tried before `Feature`, whose optional geometry
// field would otherwise swallow them as an empty feature.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeoJson {
    FeatureCollection { features: Vec<Feature> },
    Geometry(Geometry),
    Feature(Feature),
}

/// Read-only vertex index over a coastline geometry.
pub struct CoastlineIndex {
    vertices: Vec<Coordinate>,
    /// Vertex indices sorted by latitude.
    by_lat: Vec<usize>,
    /// Vertex indices sorted by longitude.
    by_lon: Vec<usize>,
    /// KD-tree in (lat, lon) degree space for buffer queries.
    tree: KdTree<f64, usize, 2, BUCKET_SIZE, u32>,
}

impl CoastlineIndex {
    /// Load and index a coastline from a GeoJSON file.
    ///
    /// Fails fatally when the file is missing or does not parse; a file
    /// containing no geometry yields a valid empty index.
    pub fn from_geojson_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::CoastlineNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path)?;
        let index = Self::from_geojson_str(&text)?;
        info!(
            path = %path.display(),
            vertices = index.len(),
            "loaded coastline"
        );
        Ok(index)
    }

    /// Parse a coastline from GeoJSON text.
    pub fn from_geojson_str(text: &str) -> Result<Self> {
        let parsed: GeoJson =
            serde_json::from_str(text).map_err(|e| Error::CoastlineParse {
                message: e.to_string(),
            })?;

        let mut vertices = Vec::new();
        match parsed {
            GeoJson::FeatureCollection { features } => {
                for feature in features {
                    if let Some(geometry) = feature.geometry {
                        collect_vertices(&geometry, &mut vertices)?;
                    }
                }
            }
            GeoJson::Geometry(geometry) => collect_vertices(&geometry, &mut vertices)?,
            GeoJson::Feature(feature) => {
                if let Some(geometry) = feature.geometry {
                    collect_vertices(&geometry, &mut vertices)?;
                }
            }
        }

        Ok(Self::from_vertices(vertices))
    }

    /// Build an index directly from vertices (used by tests with fixture
    /// geometries instead of files).
    pub fn from_vertices(vertices: Vec<Coordinate>) -> Self {
        let mut by_lat: Vec<usize> = (0..vertices.len()).collect();
        by_lat.sort_by(|&a, &b| vertices[a].lat.total_cmp(&vertices[b].lat));
        let mut by_lon: Vec<usize> = (0..vertices.len()).collect();
        by_lon.sort_by(|&a, &b| vertices[a].lon.total_cmp(&vertices[b].lon));

        let mut tree: KdTree<f64, usize, 2, BUCKET_SIZE, u32> = KdTree::new();
        for (idx, vertex) in vertices.iter().enumerate() {
            tree.add(&[vertex.lat, vertex.lon], idx);
        }

        debug!(vertices = vertices.len(), "built coastline index");

        Self {
            vertices,
            by_lat,
            by_lon,
            tree,
        }
    }

    /// Number of indexed vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true when no vertices are indexed.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertices whose latitude lies within ±`tolerance_deg` of `lat`.
    pub fn near_latitude(&self, lat: f64, tolerance_deg: f64) -> Vec<Coordinate> {
        self.band(&self.by_lat, |v| v.lat, lat, tolerance_deg)
    }

    /// Vertices whose longitude lies within ±`tolerance_deg` of `lon`.
    pub fn near_longitude(&self, lon: f64, tolerance_deg: f64) -> Vec<Coordinate> {
        self.band(&self.by_lon, |v| v.lon, lon, tolerance_deg)
    }

    /// Vertices within `radius_deg` of `center` in degree space, nearest
    /// first. Mirrors the buffer search the ranker's callers use when
    /// inspecting the coast around a point.
    pub fn within_radius(&self, center: Coordinate, radius_deg: f64) -> Vec<Coordinate> {
        if radius_deg <= 0.0 || self.vertices.is_empty() {
            return Vec::new();
        }

        let mut hits = self
            .tree
            .within::<SquaredEuclidean>(&[center.lat, center.lon], radius_deg * radius_deg);
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.into_iter()
            .map(|hit| self.vertices[hit.item])
            .collect()
    }

    fn band(
        &self,
        sorted: &[usize],
        key: impl Fn(&Coordinate) -> f64,
        center: f64,
        tolerance_deg: f64,
    ) -> Vec<Coordinate> {
        if tolerance_deg < 0.0 {
            return Vec::new();
        }
        let lo = center - tolerance_deg;
        let hi = center + tolerance_deg;
        let start = sorted.partition_point(|&idx| key(&self.vertices[idx]) < lo);
        sorted[start..]
            .iter()
            .map(|&idx| self.vertices[idx])
            .take_while(|v| key(v) <= hi)
            .collect()
    }
}

impl std::fmt::Debug for CoastlineIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoastlineIndex")
            .field("vertices", &self.vertices.len())
            .finish()
    }
}

fn collect_vertices(geometry: &Geometry, out: &mut Vec<Coordinate>) -> Result<()> {
    match geometry {
        Geometry::Point { coordinates } => push_position(coordinates, out),
        Geometry::MultiPoint { coordinates } | Geometry::LineString { coordinates } => {
            coordinates.iter().try_for_each(|p| push_position(p, out))
        }
        Geometry::MultiLineString { coordinates } | Geometry::Polygon { coordinates } => {
            coordinates
                .iter()
                .flatten()
                .try_for_each(|p| push_position(p, out))
        }
        Geometry::MultiPolygon { coordinates } => coordinates
            .iter()
            .flatten()
            .flatten()
            .try_for_each(|p| push_position(p, out)),
        Geometry::GeometryCollection { geometries } => geometries
            .iter()
            .try_for_each(|g| collect_vertices(g, out)),
    }
}

fn push_position(position: &Position, out: &mut Vec<Coordinate>) -> Result<()> {
    // GeoJSON positions are [lon, lat, ...].
    let (Some(&lon), Some(&lat)) = (position.first(), position.get(1)) else {
        return Err(Error::CoastlineParse {
            message: format!("position has {} ordinates, expected at least 2", position.len()),
        });
    };
    out.push(Coordinate::new(lat, lon).map_err(|_| Error::CoastlineParse {
        message: format!("vertex out of range: lat={lat}, lon={lon}"),
    })?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn parses_feature_collection_linestrings() {
        let geojson = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {},
                    "geometry": {
                        "type": "LineString",
                        "coordinates": [[129.4, 37.05], [129.41, 37.10]]
                    }
                },
                {
                    "type": "Feature",
                    "properties": {},
                    "geometry": {
                        "type": "Point",
                        "coordinates": [126.5, 34.8]
                    }
                }
            ]
        }"#;

        let index = CoastlineIndex::from_geojson_str(geojson).expect("parses");
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn parses_bare_multilinestring() {
        let geojson = r#"{
            "type": "MultiLineString",
            "coordinates": [[[129.0, 36.0], [129.1, 36.1]], [[126.0, 34.0]]]
        }"#;

        let index = CoastlineIndex::from_geojson_str(geojson).expect("parses");
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn tolerates_altitude_ordinates() {
        let geojson = r#"{
            "type": "LineString",
            "coordinates": [[129.4, 37.05, 12.0]]
        }"#;

        let index = CoastlineIndex::from_geojson_str(geojson).expect("parses");
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn rejects_malformed_geometry() {
        let err = CoastlineIndex::from_geojson_str("{not json").unwrap_err();
        assert!(matches!(err, Error::CoastlineParse { .. }));
    }

    #[test]
    fn empty_collection_is_a_valid_empty_index() {
        let index = CoastlineIndex::from_geojson_str(
            r#"{"type": "FeatureCollection", "features": []}"#,
        )
        .expect("parses");
        assert!(index.is_empty());
        assert!(index.near_latitude(37.0, 0.1).is_empty());
    }

    #[test]
    fn latitude_band_contains_only_in_band_vertices() {
        let index = CoastlineIndex::from_vertices(vec![
            coord(37.05, 129.4),
            coord(37.30, 129.3),
            coord(36.80, 129.5),
            coord(37.09, 129.2),
        ]);

        let hits = index.near_latitude(37.0, 0.1);
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|v| (v.lat - 37.0).abs() <= 0.1));
    }

    #[test]
    fn longitude_band_is_symmetric_to_latitude_band() {
        let index = CoastlineIndex::from_vertices(vec![
            coord(37.0, 127.55),
            coord(36.0, 127.45),
            coord(35.0, 128.2),
        ]);

        let hits = index.near_longitude(127.5, 0.1);
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|v| (v.lon - 127.5).abs() <= 0.1));
    }

    #[test]
    fn within_radius_returns_nearest_first() {
        let index = CoastlineIndex::from_vertices(vec![
            coord(37.0, 129.10),
            coord(37.0, 129.02),
            coord(37.0, 130.0),
        ]);

        let hits = index.within_radius(coord(37.0, 129.0), 0.2);
        assert_eq!(hits.len(), 2);
        assert!((hits[0].lon - 129.02).abs() < 1e-9);
        assert!((hits[1].lon - 129.10).abs() < 1e-9);
    }

    #[test]
    fn within_radius_empty_for_nonpositive_radius() {
        let index = CoastlineIndex::from_vertices(vec![coord(37.0, 129.0)]);
        assert!(index.within_radius(coord(37.0, 129.0), 0.0).is_empty());
    }
}
