//! GeoJSON boundary source
//!
//! Reads a `FeatureCollection` of county polygons, as produced by converting
//! the TIGER/Line county shapefile (`ogr2ogr -f GeoJSON`). Identifier and
//! area come from the `GEOID`, `STATEFP`, `COUNTYFP`, `NAME` and `ALAND`
//! properties.

use super::{BoundaryRecord, BoundarySource};
use crate::error::FoodNetResult;
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Option<RawGeometry>,
}

type Ring = Vec<Vec<f64>>;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum RawGeometry {
    Polygon { coordinates: Vec<Ring> },
    MultiPolygon { coordinates: Vec<Vec<Ring>> },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone)]
enum Origin {
    File(PathBuf),
    Text(String),
}

/// Boundary source backed by a GeoJSON document
#[derive(Debug, Clone)]
pub struct GeoJsonSource {
    name: String,
    origin: Origin,
}

impl GeoJsonSource {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            name: path.display().to_string(),
            origin: Origin::File(path),
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            name: "inline GeoJSON".to_string(),
            origin: Origin::Text(text.into()),
        }
    }

    fn parse(&self) -> FoodNetResult<FeatureCollection> {
        let collection = match &self.origin {
            Origin::File(path) => serde_json::from_reader(BufReader::new(File::open(path)?))?,
            Origin::Text(text) => serde_json::from_str(text)?,
        };
        Ok(collection)
    }
}

impl BoundarySource for GeoJsonSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_records(&self) -> FoodNetResult<Vec<BoundaryRecord>> {
        let collection = self.parse()?;
        Ok(collection
            .features
            .into_iter()
            .map(|feature| self.to_record(feature))
            .collect())
    }
}

impl GeoJsonSource {
    fn to_record(&self, feature: Feature) -> BoundaryRecord {
        let mut properties = feature.properties.unwrap_or_default();

        let geoid = take_code(&mut properties, "GEOID", 5);
        let state_fp = take_code(&mut properties, "STATEFP", 2);
        let county_fp = take_code(&mut properties, "COUNTYFP", 3);
        let name = match properties.remove("NAME") {
            Some(Value::String(name)) => Some(name),
            _ => None,
        };
        let land_area_m2 = match properties.remove("ALAND") {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };

        let shape = match feature.geometry {
            Some(RawGeometry::Polygon { coordinates }) => Some(MultiPolygon::new(vec![to_polygon(coordinates)])),
            Some(RawGeometry::MultiPolygon { coordinates }) => {
                Some(MultiPolygon::new(coordinates.into_iter().map(to_polygon).collect()))
            }
            Some(RawGeometry::Unsupported) => {
                warn!(
                    source = %self.name,
                    geoid = geoid.as_deref().unwrap_or("?"),
                    "Ignoring non-polygon geometry"
                );
                None
            }
            None => None,
        };

        BoundaryRecord {
            geoid,
            state_fp,
            county_fp,
            name,
            land_area_m2,
            shape,
            attributes: properties,
        }
    }
}

/// FIPS codes are usually strings, but numeric exports drop the padding.
fn take_code(properties: &mut Map<String, Value>, key: &str, width: usize) -> Option<String> {
    match properties.remove(key)? {
        Value::String(s) => Some(s),
        Value::Number(n) => n.as_u64().map(|v| format!("{:0width$}", v, width = width)),
        _ => None,
    }
}

fn to_ring(ring: Ring) -> LineString<f64> {
    // Short positions become NaN and are rejected by shape validation
    LineString::new(
        ring.into_iter()
            .map(|p| Coord {
                x: p.first().copied().unwrap_or(f64::NAN),
                y: p.get(1).copied().unwrap_or(f64::NAN),
            })
            .collect(),
    )
}

fn to_polygon(rings: Vec<Ring>) -> Polygon<f64> {
    let mut rings = rings.into_iter().map(to_ring);
    let exterior = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
    Polygon::new(exterior, rings.collect())
}
