//! FoodNet
//!
//! County influence analysis for food-access research: builds the US county
//! adjacency graph from boundary polygons, weights its edges with a yearly
//! economic measure and ranks counties with weighted PageRank.
//!
//! # Pipeline
//!
//! 1. Geometry loader: one boundary per county identifier
//! 2. Adjacency builder: grid-indexed shared-boundary and overlap tests
//! 3. Edge weighting: endpoint measures combined per year
//! 4. Influence graph: CSR view with county-keyed lookups
//! 5. PageRank: weighted, with dangling-node correction
//! 6. Result assembly: one row per county year plus run metadata
//!
//! ## Example Usage
//!
//! ```rust
//! use foodnet::{BoundaryRecord, InfluencePipeline, MeasureTable, PipelineConfig};
//! use geo::{LineString, Polygon};
//!
//! let square = |x: f64| {
//!     Polygon::new(
//!         LineString::from(vec![(x, 0.0), (x + 1.0, 0.0), (x + 1.0, 1.0), (x, 1.0), (x, 0.0)]),
//!         vec![],
//!     )
//! };
//! let boundaries = vec![
//!     BoundaryRecord::new("01001", square(0.0)),
//!     BoundaryRecord::new("01003", square(1.0)),
//! ];
//!
//! let config = PipelineConfig {
//!     years: vec![2020],
//!     ..PipelineConfig::default()
//! };
//! let pipeline = InfluencePipeline::new(config).unwrap();
//! let report = pipeline.run(&boundaries, &MeasureTable::new()).unwrap();
//!
//! assert_eq!(report.edges, 1);
//! assert_eq!(report.years[0].rows.len(), 2);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod adjacency;
pub mod assemble;
pub mod config;
pub mod county;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod measures;
pub mod pipeline;
pub mod spatial;
pub mod weighting;

// Re-export main types for convenience
pub use adjacency::{build_adjacency, AdjacencyResult, Contact, SkippedCounty};

pub use assemble::{InfluenceRow, PipelineReport, YearReport};

pub use config::{
    AdjacencyConfig, AtRiskConfig, ConfigError, PageRankSettings, PipelineConfig, WeightingConfig,
};

pub use county::{CountyId, CountyIdError};

pub use error::{ConvergenceWarning, FoodNetError, FoodNetResult, GeometryError, MissingMeasure};

pub use geometry::{
    load_counties, BoundaryRecord, BoundarySource, CountyBoundary, CountyCollection,
    GeoJsonSource, LoadReport,
};

pub use graph::{AdjacencyEdge, GraphError, InfluenceGraph, WeightedEdge};

pub use measures::{CountyYear, MeasureTable};

pub use pipeline::InfluencePipeline;

pub use weighting::{weight_edges, Combiner, Measure, WeightedEdges};

pub use foodnet_graph_algorithms::{PageRankConfig, PageRankResult};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
