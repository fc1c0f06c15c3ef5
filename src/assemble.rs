//! Result assembly
//!
//! Joins PageRank scores and degree metrics back onto county identifiers,
//! one [`InfluenceRow`] per county year, and collects the run metadata that
//! downstream consumers need to judge the scores.

use crate::adjacency::SkippedCounty;
use crate::config::{AtRiskConfig, PipelineConfig};
use crate::county::CountyId;
use crate::error::{ConvergenceWarning, FoodNetResult, MissingMeasure};
use crate::geometry::{CountyCollection, LoadReport};
use crate::graph::{CountyScores, InfluenceGraph};
use crate::measures::MeasureTable;
use crate::weighting::county_value;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::io::Write;

/// Influence metrics of one county in one year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfluenceRow {
    pub county: CountyId,
    pub name: Option<String>,
    pub year: i32,
    pub pagerank: f64,
    /// 1 is the most influential county of the year
    pub rank: usize,
    pub degree: usize,
    pub weighted_degree: f64,
    /// `degree / (N - 1)`
    pub degree_centrality: f64,
    pub component: usize,
    /// `None` when the indicator is disabled or the measure is missing
    pub at_risk: Option<bool>,
}

/// Scores and diagnostics of one year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearReport {
    pub year: i32,
    pub iterations: usize,
    pub converged: bool,
    pub delta: f64,
    pub warning: Option<ConvergenceWarning>,
    pub missing_measures: Vec<MissingMeasure>,
    /// Edges that took the floor weight
    pub floored_edges: usize,
    pub top_county: Option<CountyId>,
    pub components: usize,
    /// Rows ordered by rank
    pub rows: Vec<InfluenceRow>,
}

/// Everything a run produced
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub generated_at: DateTime<Utc>,
    pub version: String,
    pub config: PipelineConfig,
    pub boundaries: LoadReport,
    /// Counties left out of the graph for a malformed boundary
    pub skipped_geometry: Vec<SkippedCounty>,
    pub nodes: usize,
    pub edges: usize,
    /// County-year rows rejected as duplicates
    pub measure_conflicts: usize,
    pub years: Vec<YearReport>,
}

impl PipelineReport {
    pub fn year(&self, year: i32) -> Option<&YearReport> {
        self.years.iter().find(|y| y.year == year)
    }

    /// All rows, year by year
    pub fn rows(&self) -> impl Iterator<Item = &InfluenceRow> {
        self.years.iter().flat_map(|y| y.rows.iter())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ConvergenceWarning> {
        self.years.iter().filter_map(|y| y.warning.as_ref())
    }

    /// Write every row as CSV with a header line.
    pub fn write_csv<W: Write>(&self, writer: W) -> FoodNetResult<()> {
        write_rows_csv(self.rows(), writer)
    }

    /// Write the full report, metadata included, as pretty JSON.
    pub fn write_json<W: Write>(&self, writer: W) -> FoodNetResult<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

pub fn write_rows_csv<'a, W: Write>(
    rows: impl IntoIterator<Item = &'a InfluenceRow>,
    writer: W,
) -> FoodNetResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Descending score, ties broken by identifier
fn by_score(a: &(CountyId, f64), b: &(CountyId, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// Build the rows of one year, ordered by rank.
pub fn assemble_rows(
    year: i32,
    graph: &InfluenceGraph,
    scores: &CountyScores,
    counties: &CountyCollection,
    measures: &MeasureTable,
    at_risk: Option<&AtRiskConfig>,
) -> Vec<InfluenceRow> {
    let stats = graph.degree_stats();
    let (component, _) = graph.components();

    let mut ranked: Vec<(CountyId, f64)> = graph
        .nodes()
        .iter()
        .map(|&id| (id, scores.get(&id).copied().unwrap_or(0.0)))
        .collect();
    ranked.sort_by(by_score);

    ranked
        .into_iter()
        .enumerate()
        .map(|(position, (county, pagerank))| {
            let degree = stats.get(&county).copied().unwrap_or_default();
            InfluenceRow {
                county,
                name: counties.name(&county).map(str::to_string),
                year,
                pagerank,
                rank: position + 1,
                degree: degree.degree,
                weighted_degree: degree.weighted_degree,
                degree_centrality: degree.centrality,
                component: component.get(&county).copied().unwrap_or(0),
                at_risk: at_risk.and_then(|cfg| {
                    county_value(county, year, cfg.measure, counties, measures)
                        .map(|v| v < cfg.threshold)
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{load_counties, BoundaryRecord};
    use crate::graph::{AdjacencyEdge, WeightedEdge};
    use crate::measures::CountyYear;
    use crate::weighting::Measure;
    use foodnet_graph_algorithms::PageRankConfig;
    use geo::{LineString, Polygon};

    fn id(geoid: &str) -> CountyId {
        geoid.parse().unwrap()
    }

    fn square(x: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(x, 0.0), (x + 1.0, 0.0), (x + 1.0, 1.0), (x, 1.0), (x, 0.0)]),
            vec![],
        )
    }

    /// Three counties in a row; the middle one is the hub
    fn fixture() -> (InfluenceGraph, CountyCollection, MeasureTable) {
        let records = vec![
            BoundaryRecord::new("01001", square(0.0)).with_name("West").with_land_area_m2(1e6),
            BoundaryRecord::new("01003", square(1.0)).with_name("Middle").with_land_area_m2(1e6),
            BoundaryRecord::new("01005", square(2.0)).with_land_area_m2(1e6),
        ];
        let counties = load_counties(&records).unwrap();
        let nodes: Vec<CountyId> = counties.ids().collect();
        let edges = [
            WeightedEdge {
                edge: AdjacencyEdge::new(id("01001"), id("01003")).unwrap(),
                weight: 1.0,
            },
            WeightedEdge {
                edge: AdjacencyEdge::new(id("01003"), id("01005")).unwrap(),
                weight: 1.0,
            },
        ];
        let graph = InfluenceGraph::build(&nodes, &edges).unwrap();

        let mut table = MeasureTable::new();
        for (geoid, establishments) in [("01001", 0.0), ("01003", 4.0)] {
            table.insert(CountyYear {
                county: id(geoid),
                year: 2020,
                population: None,
                establishments: Some(establishments),
                employment: None,
                payroll: None,
                land_area_km2: None,
            });
        }
        (graph, counties, table)
    }

    #[test]
    fn test_rows_are_ranked() {
        let (graph, counties, table) = fixture();
        let (scores, _) = graph.page_rank(PageRankConfig::default());
        let rows = assemble_rows(2020, &graph, &scores, &counties, &table, None);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].county, id("01003"));
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].name.as_deref(), Some("Middle"));
        assert_eq!(rows[0].degree, 2);
        assert_eq!(rows[0].degree_centrality, 1.0);
        // Equal leaf scores fall back to identifier order
        assert_eq!(rows[1].county, id("01001"));
        assert_eq!(rows[2].county, id("01005"));
        assert_eq!(rows[2].name, None);
        assert!(rows.iter().all(|r| r.component == 0 && r.at_risk.is_none()));
    }

    #[test]
    fn test_at_risk_flag() {
        let (graph, counties, table) = fixture();
        let (scores, _) = graph.page_rank(PageRankConfig::default());
        let cfg = AtRiskConfig {
            measure: Measure::EstablishmentDensity,
            threshold: 0.5,
        };
        let rows = assemble_rows(2020, &graph, &scores, &counties, &table, Some(&cfg));
        let flag = |geoid: &str| rows.iter().find(|r| r.county == id(geoid)).and_then(|r| r.at_risk);

        assert_eq!(flag("01001"), Some(true));
        assert_eq!(flag("01003"), Some(false));
        assert_eq!(flag("01005"), None);
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let (graph, counties, table) = fixture();
        let (scores, _) = graph.page_rank(PageRankConfig::default());
        let rows = assemble_rows(2020, &graph, &scores, &counties, &table, None);

        let mut out = Vec::new();
        write_rows_csv(&rows, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "county,name,year,pagerank,rank,degree,weighted_degree,degree_centrality,component,at_risk"
        );
        assert_eq!(text.lines().count(), 4);
        assert!(text.lines().nth(1).unwrap().starts_with("01003,Middle,2020,"));
    }
}
