//! Edge weighting
//!
//! Each adjacency edge gets `combiner(value(a), value(b))` for one year and
//! one [`Measure`]. When either endpoint has no value the edge takes the
//! configured floor, so it never drops out of the graph. The floor is also
//! the lower bound of every weight.

use crate::config::WeightingConfig;
use crate::county::CountyId;
use crate::error::MissingMeasure;
use crate::geometry::CountyCollection;
use crate::graph::{AdjacencyEdge, WeightedEdge};
use crate::measures::MeasureTable;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info_span, warn};

/// County-year quantity an edge weight can be derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Population,
    Establishments,
    Employment,
    Payroll,
    /// Establishments per km² of land
    EstablishmentDensity,
    /// Employees per km² of land
    EmploymentDensity,
    /// Annual payroll per km² of land
    PayrollDensity,
    EstablishmentsPerCapita,
}

impl Measure {
    pub const ALL: [Measure; 8] = [
        Measure::Population,
        Measure::Establishments,
        Measure::Employment,
        Measure::Payroll,
        Measure::EstablishmentDensity,
        Measure::EmploymentDensity,
        Measure::PayrollDensity,
        Measure::EstablishmentsPerCapita,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Measure::Population => "population",
            Measure::Establishments => "establishments",
            Measure::Employment => "employment",
            Measure::Payroll => "payroll",
            Measure::EstablishmentDensity => "establishment_density",
            Measure::EmploymentDensity => "employment_density",
            Measure::PayrollDensity => "payroll_density",
            Measure::EstablishmentsPerCapita => "establishments_per_capita",
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Measure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Measure::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown measure {:?}", s))
    }
}

/// How the two endpoint values of an edge become one weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combiner {
    #[default]
    Mean,
    Product,
    GeometricMean,
    Min,
    Max,
}

impl Combiner {
    pub const ALL: [Combiner; 5] = [
        Combiner::Mean,
        Combiner::Product,
        Combiner::GeometricMean,
        Combiner::Min,
        Combiner::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Combiner::Mean => "mean",
            Combiner::Product => "product",
            Combiner::GeometricMean => "geometric_mean",
            Combiner::Min => "min",
            Combiner::Max => "max",
        }
    }

    pub fn combine(&self, a: f64, b: f64) -> f64 {
        match self {
            Combiner::Mean => (a + b) / 2.0,
            Combiner::Product => a * b,
            Combiner::GeometricMean => (a * b).sqrt(),
            Combiner::Min => a.min(b),
            Combiner::Max => a.max(b),
        }
    }
}

impl FromStr for Combiner {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Combiner::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown combiner {:?}", s))
    }
}

/// Value of `measure` for one county year, falling back to the boundary
/// land area for densities.
pub fn county_value(
    county: CountyId,
    year: i32,
    measure: Measure,
    counties: &CountyCollection,
    measures: &MeasureTable,
) -> Option<f64> {
    measures
        .get(county, year)?
        .value(measure, counties.land_area_km2(&county))
}

/// Weighted edges of one year plus the county years that had no value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightedEdges {
    pub edges: Vec<WeightedEdge>,
    /// One entry per county, ascending
    pub missing: Vec<MissingMeasure>,
}

impl WeightedEdges {
    /// Number of edges that fell back to the floor
    pub fn floored(&self, floor: f64) -> usize {
        self.edges.iter().filter(|e| e.weight == floor).count()
    }
}

pub fn weight_edges(
    edges: &[AdjacencyEdge],
    counties: &CountyCollection,
    measures: &MeasureTable,
    year: i32,
    config: &WeightingConfig,
) -> WeightedEdges {
    let span = info_span!("weight_edges", year, measure = %config.measure);
    let _guard = span.enter();

    let mut values: FxHashMap<CountyId, Option<f64>> = FxHashMap::default();
    let mut value = |id: CountyId| {
        *values
            .entry(id)
            .or_insert_with(|| county_value(id, year, config.measure, counties, measures))
    };

    let weighted: Vec<WeightedEdge> = edges
        .iter()
        .map(|&edge| {
            let weight = match (value(edge.a()), value(edge.b())) {
                (Some(a), Some(b)) => {
                    let combined = config.combiner.combine(a, b);
                    if combined.is_finite() {
                        combined.max(config.floor)
                    } else {
                        config.floor
                    }
                }
                _ => config.floor,
            };
            WeightedEdge { edge, weight }
        })
        .collect();

    let mut missing: Vec<MissingMeasure> = values
        .into_iter()
        .filter(|(_, v)| v.is_none())
        .map(|(county, _)| MissingMeasure {
            county,
            year,
            measure: config.measure,
        })
        .collect();
    missing.sort_unstable_by_key(|m| m.county);

    for m in &missing {
        debug!(county = %m.county, "No value, incident edges use the floor weight");
    }
    if !missing.is_empty() {
        warn!(
            counties = missing.len(),
            floor = config.floor,
            "Counties without a value for the weighting measure"
        );
    }

    WeightedEdges {
        edges: weighted,
        missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{load_counties, BoundaryRecord};
    use crate::measures::CountyYear;
    use geo::{LineString, Polygon};

    fn square(x: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(x, 0.0), (x + 1.0, 0.0), (x + 1.0, 1.0), (x, 1.0), (x, 0.0)]),
            vec![],
        )
    }

    fn id(geoid: &str) -> CountyId {
        geoid.parse().unwrap()
    }

    fn fixture() -> (Vec<AdjacencyEdge>, CountyCollection, MeasureTable) {
        let records = vec![
            BoundaryRecord::new("01001", square(0.0)).with_land_area_m2(2_000_000.0),
            BoundaryRecord::new("01003", square(1.0)).with_land_area_m2(4_000_000.0),
            BoundaryRecord::new("01005", square(2.0)),
        ];
        let counties = load_counties(&records).unwrap();

        let mut table = MeasureTable::new();
        for (geoid, payroll) in [("01001", 100.0), ("01003", 300.0), ("01005", 50.0)] {
            table.insert(CountyYear {
                county: id(geoid),
                year: 2020,
                population: None,
                establishments: None,
                employment: None,
                payroll: Some(payroll),
                land_area_km2: None,
            });
        }

        let edges = vec![
            AdjacencyEdge::new(id("01001"), id("01003")).unwrap(),
            AdjacencyEdge::new(id("01003"), id("01005")).unwrap(),
        ];
        (edges, counties, table)
    }

    #[test]
    fn test_combiners() {
        assert_eq!(Combiner::Mean.combine(2.0, 8.0), 5.0);
        assert_eq!(Combiner::Product.combine(2.0, 8.0), 16.0);
        assert_eq!(Combiner::GeometricMean.combine(2.0, 8.0), 4.0);
        assert_eq!(Combiner::Min.combine(2.0, 8.0), 2.0);
        assert_eq!(Combiner::Max.combine(2.0, 8.0), 8.0);
    }

    #[test]
    fn test_weights_from_raw_measure() {
        let (edges, counties, table) = fixture();
        let config = WeightingConfig {
            measure: Measure::Payroll,
            ..WeightingConfig::default()
        };
        let out = weight_edges(&edges, &counties, &table, 2020, &config);
        assert_eq!(out.edges[0].weight, 200.0);
        assert_eq!(out.edges[1].weight, 175.0);
        assert!(out.missing.is_empty());
    }

    #[test]
    fn test_density_without_area_uses_floor() {
        let (edges, counties, table) = fixture();
        let config = WeightingConfig::default();
        let out = weight_edges(&edges, &counties, &table, 2020, &config);

        // 100 / 2 km² and 300 / 4 km²
        assert_eq!(out.edges[0].weight, 62.5);
        assert_eq!(out.edges[1].weight, config.floor);
        assert_eq!(out.floored(config.floor), 1);
        assert_eq!(
            out.missing,
            vec![MissingMeasure {
                county: id("01005"),
                year: 2020,
                measure: Measure::PayrollDensity,
            }]
        );
    }

    #[test]
    fn test_year_without_rows_is_all_floor() {
        let (edges, counties, table) = fixture();
        let config = WeightingConfig::default();
        let out = weight_edges(&edges, &counties, &table, 2019, &config);
        assert!(out.edges.iter().all(|e| e.weight == config.floor));
        assert_eq!(out.missing.len(), 3);
    }

    #[test]
    fn test_zero_values_are_raised_to_floor() {
        let (edges, counties, mut table) = fixture();
        table.insert(CountyYear {
            county: id("01001"),
            year: 2021,
            population: None,
            establishments: None,
            employment: None,
            payroll: Some(0.0),
            land_area_km2: None,
        });
        table.insert(CountyYear {
            county: id("01003"),
            year: 2021,
            population: None,
            establishments: None,
            employment: None,
            payroll: Some(0.0),
            land_area_km2: None,
        });
        let config = WeightingConfig {
            measure: Measure::Payroll,
            combiner: Combiner::Product,
            floor: 0.5,
        };
        let out = weight_edges(&edges[..1], &counties, &table, 2021, &config);
        assert_eq!(out.edges[0].weight, 0.5);
        assert!(out.missing.is_empty());
    }

    #[test]
    fn test_names_match_config_spelling() {
        for measure in Measure::ALL {
            let yaml = serde_yaml::to_string(&measure).unwrap();
            assert_eq!(yaml.trim(), measure.as_str());
            assert_eq!(measure.as_str().parse::<Measure>(), Ok(measure));
        }
        for combiner in Combiner::ALL {
            let yaml = serde_yaml::to_string(&combiner).unwrap();
            assert_eq!(yaml.trim(), combiner.as_str());
            assert_eq!(combiner.as_str().parse::<Combiner>(), Ok(combiner));
        }
        assert!("rainfall".parse::<Measure>().is_err());
    }
}
