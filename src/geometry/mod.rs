//! County boundary loading
//!
//! Turns raw boundary records into one [`CountyBoundary`] per identifier.
//! A malformed identifier aborts the load; a record without geometry is
//! skipped and counted; a repeated identifier keeps its first record.

pub mod geojson;
pub mod validate;

pub use self::geojson::GeoJsonSource;
pub use self::validate::validate_shape;

use crate::county::CountyId;
use crate::error::{FoodNetError, FoodNetResult};
use geo::MultiPolygon;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, info_span, warn};

/// Square metres per square kilometre
const M2_PER_KM2: f64 = 1_000_000.0;

/// One feature as read from a boundary source, before validation
#[derive(Debug, Clone, Default)]
pub struct BoundaryRecord {
    /// Five-digit GEOID, if the source carries one
    pub geoid: Option<String>,
    /// Two-digit state FIPS code
    pub state_fp: Option<String>,
    /// Three-digit county FIPS code
    pub county_fp: Option<String>,
    pub name: Option<String>,
    /// Land area in square metres (`ALAND`)
    pub land_area_m2: Option<f64>,
    pub shape: Option<MultiPolygon<f64>>,
    /// Remaining source attributes, kept verbatim
    pub attributes: Map<String, Value>,
}

impl BoundaryRecord {
    pub fn new(geoid: impl Into<String>, shape: impl Into<MultiPolygon<f64>>) -> Self {
        Self {
            geoid: Some(geoid.into()),
            shape: Some(shape.into()),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_land_area_m2(mut self, area: f64) -> Self {
        self.land_area_m2 = Some(area);
        self
    }

    /// Resolve the identifier from `GEOID`, or from `STATEFP` + `COUNTYFP`.
    fn county_id(&self) -> Result<CountyId, String> {
        let geoid = self.geoid.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let parts = match (self.state_fp.as_deref(), self.county_fp.as_deref()) {
            (Some(state), Some(county)) => {
                Some(CountyId::from_parts(state, county).map_err(|e| e.to_string())?)
            }
            _ => None,
        };

        match (geoid, parts) {
            (Some(geoid), parts) => {
                let id = geoid.parse::<CountyId>().map_err(|e| e.to_string())?;
                match parts {
                    Some(other) if other != id => Err(format!(
                        "GEOID {} disagrees with STATEFP/COUNTYFP {}",
                        id, other
                    )),
                    _ => Ok(id),
                }
            }
            (None, Some(id)) => Ok(id),
            (None, None) => Err("missing county identifier".to_string()),
        }
    }
}

/// Anything that can supply county boundary records
pub trait BoundarySource {
    /// Human-readable name used in errors and logs
    fn name(&self) -> &str;

    fn read_records(&self) -> FoodNetResult<Vec<BoundaryRecord>>;
}

impl BoundarySource for Vec<BoundaryRecord> {
    fn name(&self) -> &str {
        "in-memory boundaries"
    }

    fn read_records(&self) -> FoodNetResult<Vec<BoundaryRecord>> {
        Ok(self.clone())
    }
}

/// A county with a boundary, ready for adjacency building
#[derive(Debug, Clone)]
pub struct CountyBoundary {
    pub id: CountyId,
    pub name: Option<String>,
    pub land_area_km2: Option<f64>,
    pub shape: MultiPolygon<f64>,
    pub attributes: Map<String, Value>,
}

/// Outcome counters of a boundary load
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub source: String,
    pub records: usize,
    pub loaded: usize,
    /// Counties skipped because the record had no usable geometry
    pub missing_geometry: Vec<CountyId>,
    /// Identifiers seen again after their first record
    pub duplicates: Vec<CountyId>,
}

/// Loaded counties in source order, keyed by identifier
#[derive(Debug, Clone, Default)]
pub struct CountyCollection {
    counties: IndexMap<CountyId, CountyBoundary>,
    report: LoadReport,
}

impl CountyCollection {
    pub fn get(&self, id: &CountyId) -> Option<&CountyBoundary> {
        self.counties.get(id)
    }

    pub fn contains(&self, id: &CountyId) -> bool {
        self.counties.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.counties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CountyBoundary> {
        self.counties.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = CountyId> + '_ {
        self.counties.keys().copied()
    }

    pub fn land_area_km2(&self, id: &CountyId) -> Option<f64> {
        self.counties.get(id).and_then(|c| c.land_area_km2)
    }

    pub fn name(&self, id: &CountyId) -> Option<&str> {
        self.counties.get(id).and_then(|c| c.name.as_deref())
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }
}

/// Load and key boundary records.
///
/// # Errors
/// `DataIntegrity` when any record has a missing or malformed identifier;
/// nothing is returned in that case.
pub fn load_counties<S: BoundarySource + ?Sized>(source: &S) -> FoodNetResult<CountyCollection> {
    let span = info_span!("load_counties", source = source.name());
    let _guard = span.enter();

    let records = source.read_records()?;
    let mut report = LoadReport {
        source: source.name().to_string(),
        records: records.len(),
        ..LoadReport::default()
    };
    let mut counties: IndexMap<CountyId, CountyBoundary> = IndexMap::with_capacity(records.len());

    for (position, record) in records.into_iter().enumerate() {
        let id = record
            .county_id()
            .map_err(|reason| FoodNetError::integrity(source.name(), position, reason))?;

        let Some(shape) = record.shape else {
            warn!(county = %id, "Skipping county without geometry");
            report.missing_geometry.push(id);
            continue;
        };

        if counties.contains_key(&id) {
            warn!(county = %id, record = position, "Duplicate county identifier, keeping first occurrence");
            report.duplicates.push(id);
            continue;
        }

        let land_area_km2 = record
            .land_area_m2
            .filter(|a| a.is_finite() && *a >= 0.0)
            .map(|a| a / M2_PER_KM2);

        counties.insert(
            id,
            CountyBoundary {
                id,
                name: record.name,
                land_area_km2,
                shape,
                attributes: record.attributes,
            },
        );
    }

    report.loaded = counties.len();
    info!(
        loaded = report.loaded,
        missing_geometry = report.missing_geometry.len(),
        duplicates = report.duplicates.len(),
        "Loaded county boundaries"
    );

    Ok(CountyCollection { counties, report })
}
