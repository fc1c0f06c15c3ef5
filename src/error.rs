//! Error types for the influence pipeline
//!
//! Only [`FoodNetError`] aborts a run. Geometry problems, missing measures and
//! non-convergence are recorded next to the results instead.

use crate::config::ConfigError;
use crate::county::CountyId;
use crate::graph::GraphError;
use crate::weighting::Measure;
use serde::Serialize;
use thiserror::Error;

/// Fatal pipeline errors
#[derive(Error, Debug)]
pub enum FoodNetError {
    /// Missing or malformed identifier in an input source
    #[error("Data integrity error in {source_name} (record {record}): {reason}")]
    DataIntegrity {
        source_name: String,
        record: usize,
        reason: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Graph construction failed: {0}")]
    Graph(#[from] GraphError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl FoodNetError {
    pub(crate) fn integrity(
        source_name: impl Into<String>,
        record: usize,
        reason: impl ToString,
    ) -> Self {
        FoodNetError::DataIntegrity {
            source_name: source_name.into(),
            record,
            reason: reason.to_string(),
        }
    }
}

pub type FoodNetResult<T> = Result<T, FoodNetError>;

/// Why a county boundary was excluded from adjacency candidacy
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeometryError {
    #[error("geometry has no polygons")]
    Empty,

    #[error("ring has {vertices} distinct vertices, at least 3 are required")]
    TooFewVertices { vertices: usize },

    #[error("geometry contains a non-finite coordinate")]
    NonFinite,

    #[error("geometry encloses zero area")]
    ZeroArea,

    #[error("ring crosses itself")]
    SelfIntersecting,
}

/// A county year without a value for the weighting measure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingMeasure {
    pub county: CountyId,
    pub year: i32,
    pub measure: Measure,
}

/// PageRank hit its iteration cap before reaching the tolerance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceWarning {
    pub year: i32,
    pub iterations: usize,
    pub delta: f64,
    pub tolerance: f64,
}

impl std::fmt::Display for ConvergenceWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PageRank for {} stopped after {} iterations with delta {:.3e} (tolerance {:.3e})",
            self.year, self.iterations, self.delta, self.tolerance
        )
    }
}
