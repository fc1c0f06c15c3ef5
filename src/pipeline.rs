//! End-to-end influence run
//!
//! Boundaries are loaded and the adjacency graph is built once. Weighting,
//! PageRank and assembly then repeat for every configured year on that same
//! node and edge set.

use crate::adjacency::{build_adjacency, AdjacencyResult};
use crate::assemble::{assemble_rows, PipelineReport, YearReport};
use crate::config::PipelineConfig;
use crate::error::{ConvergenceWarning, FoodNetResult};
use crate::geometry::{load_counties, BoundarySource, CountyCollection, GeoJsonSource};
use crate::graph::InfluenceGraph;
use crate::measures::MeasureTable;
use crate::weighting::weight_edges;
use chrono::Utc;
use std::path::Path;
use tracing::{debug, info, info_span, warn};

/// Validated configuration plus the stages that use it
#[derive(Debug, Clone)]
pub struct InfluencePipeline {
    config: PipelineConfig,
}

impl InfluencePipeline {
    /// # Errors
    /// `InvalidConfig` when any setting is out of range.
    pub fn new(config: PipelineConfig) -> FoodNetResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Read a GeoJSON boundary file and a measures CSV, then run.
    pub fn run_files(
        &self,
        boundaries: impl AsRef<Path>,
        measures: impl AsRef<Path>,
    ) -> FoodNetResult<PipelineReport> {
        let measures = MeasureTable::from_csv_path(measures)?;
        self.run(&GeoJsonSource::from_path(boundaries), &measures)
    }

    pub fn run<S: BoundarySource + ?Sized>(
        &self,
        boundaries: &S,
        measures: &MeasureTable,
    ) -> FoodNetResult<PipelineReport> {
        let counties = load_counties(boundaries)?;
        let adjacency = self.build_adjacency(&counties);

        let years = self
            .config
            .years
            .iter()
            .map(|&year| self.score_year(year, &adjacency, &counties, measures))
            .collect::<FoodNetResult<Vec<_>>>()?;

        Ok(PipelineReport {
            generated_at: Utc::now(),
            version: crate::version().to_string(),
            config: self.config.clone(),
            boundaries: counties.report().clone(),
            skipped_geometry: adjacency.skipped.clone(),
            nodes: adjacency.node_count(),
            edges: adjacency.edge_count(),
            measure_conflicts: measures.conflicts().len(),
            years,
        })
    }

    pub fn build_adjacency(&self, counties: &CountyCollection) -> AdjacencyResult {
        build_adjacency(counties, &self.config.adjacency)
    }

    /// Weight, rank and assemble one year.
    pub fn score_year(
        &self,
        year: i32,
        adjacency: &AdjacencyResult,
        counties: &CountyCollection,
        measures: &MeasureTable,
    ) -> FoodNetResult<YearReport> {
        let span = info_span!("score_year", year);
        let _guard = span.enter();

        let weighting = &self.config.weighting;
        let weighted = weight_edges(&adjacency.edges, counties, measures, year, weighting);
        let graph = InfluenceGraph::build(&adjacency.nodes, &weighted.edges)?;

        let engine = self.config.engine_config();
        let (scores, result) = graph.page_rank(engine);
        debug!(total = result.total(), "PageRank score mass");

        let warning = (!result.converged).then(|| ConvergenceWarning {
            year,
            iterations: result.iterations,
            delta: result.delta,
            tolerance: engine.tolerance,
        });
        if let Some(w) = &warning {
            warn!("{}", w);
        }

        let rows = assemble_rows(
            year,
            &graph,
            &scores,
            counties,
            measures,
            self.config.at_risk.as_ref(),
        );
        let components = rows.iter().map(|r| r.component + 1).max().unwrap_or(0);

        info!(
            iterations = result.iterations,
            converged = result.converged,
            components,
            missing = weighted.missing.len(),
            "Scored year"
        );

        Ok(YearReport {
            year,
            iterations: result.iterations,
            converged: result.converged,
            delta: result.delta,
            warning,
            floored_edges: weighted.floored(weighting.floor),
            missing_measures: weighted.missing,
            top_county: rows.first().map(|r| r.county),
            components,
            rows,
        })
    }
}
