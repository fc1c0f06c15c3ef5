//! Pipeline configuration
//!
//! Every tunable that changes the ranking lives here so that a run can be
//! reproduced from its echoed configuration. Files are YAML; absent keys
//! take the defaults below.
//!
//! ```yaml
//! pagerank:
//!   damping_factor: 0.85
//!   tolerance: 1.0e-6
//!   max_iterations: 100
//! weighting:
//!   measure: payroll_density
//!   combiner: mean
//! years: [2019, 2020, 2021, 2022]
//! ```

use crate::error::{FoodNetError, FoodNetResult};
use crate::weighting::{Combiner, Measure};
use foodnet_graph_algorithms::PageRankConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Rejected configuration values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} = {value} is out of range, expected {expected}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("pagerank.max_iterations must be at least 1")]
    ZeroIterations,

    #[error("at least one analysis year is required")]
    NoYears,

    #[error("year {0} is listed more than once")]
    DuplicateYear(i32),
}

/// PageRank engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRankSettings {
    /// Probability of following an adjacency edge; materially changes the ranking
    pub damping_factor: f64,
    /// L1 convergence threshold between successive score vectors
    pub tolerance: f64,
    pub max_iterations: usize,
    /// Redistribute the mass of edgeless counties; only disable for diagnostics
    pub dangling_correction: bool,
    pub parallel: bool,
}

impl Default for PageRankSettings {
    fn default() -> Self {
        let engine = PageRankConfig::default();
        Self {
            damping_factor: engine.damping_factor,
            tolerance: engine.tolerance,
            max_iterations: engine.max_iterations,
            dangling_correction: engine.dangling_correction,
            parallel: engine.parallel,
        }
    }
}

impl From<&PageRankSettings> for PageRankConfig {
    fn from(settings: &PageRankSettings) -> Self {
        PageRankConfig {
            damping_factor: settings.damping_factor,
            max_iterations: settings.max_iterations,
            tolerance: settings.tolerance,
            dangling_correction: settings.dangling_correction,
            parallel: settings.parallel,
        }
    }
}

/// Adjacency builder settings, in the coordinate units of the boundary source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjacencyConfig {
    /// Gap or overshoot between nominally shared boundaries that still counts as touching
    pub tolerance: f64,
    /// Shared boundary shorter than this is a corner touch, not adjacency
    pub min_shared_boundary: f64,
    pub parallel: bool,
}

impl Default for AdjacencyConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            min_shared_boundary: 1e-5,
            parallel: true,
        }
    }
}

/// Edge weighting settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightingConfig {
    pub measure: Measure,
    pub combiner: Combiner,
    /// Weight used when an endpoint has no value; must stay positive
    pub floor: f64,
}

impl Default for WeightingConfig {
    fn default() -> Self {
        Self {
            measure: Measure::PayrollDensity,
            combiner: Combiner::Mean,
            floor: 1e-9,
        }
    }
}

/// At-risk indicator: a county year is flagged when `measure < threshold`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtRiskConfig {
    pub measure: Measure,
    pub threshold: f64,
}

impl Default for AtRiskConfig {
    fn default() -> Self {
        Self {
            measure: Measure::EstablishmentDensity,
            threshold: 0.001,
        }
    }
}

/// Complete configuration of an influence run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub pagerank: PageRankSettings,
    pub adjacency: AdjacencyConfig,
    pub weighting: WeightingConfig,
    /// `null` disables the indicator
    pub at_risk: Option<AtRiskConfig>,
    pub years: Vec<i32>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pagerank: PageRankSettings::default(),
            adjacency: AdjacencyConfig::default(),
            weighting: WeightingConfig::default(),
            at_risk: Some(AtRiskConfig::default()),
            years: vec![2019, 2020, 2021, 2022],
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> FoodNetResult<Self> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> FoodNetResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&yaml)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> FoodNetResult<String> {
        serde_yaml::to_string(self).map_err(FoodNetError::from)
    }

    pub fn engine_config(&self) -> PageRankConfig {
        PageRankConfig::from(&self.pagerank)
    }

    /// Check every value before any data is read.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pr = &self.pagerank;
        if !(pr.damping_factor > 0.0 && pr.damping_factor < 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "pagerank.damping_factor",
                value: pr.damping_factor,
                expected: "0 < d < 1",
            });
        }
        positive("pagerank.tolerance", pr.tolerance)?;
        if pr.max_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }

        let adj = &self.adjacency;
        positive("adjacency.tolerance", adj.tolerance)?;
        positive("adjacency.min_shared_boundary", adj.min_shared_boundary)?;

        positive("weighting.floor", self.weighting.floor)?;

        if let Some(at_risk) = &self.at_risk {
            if !at_risk.threshold.is_finite() {
                return Err(ConfigError::OutOfRange {
                    field: "at_risk.threshold",
                    value: at_risk.threshold,
                    expected: "a finite number",
                });
            }
        }

        if self.years.is_empty() {
            return Err(ConfigError::NoYears);
        }
        let mut seen = self.years.clone();
        seen.sort_unstable();
        if let Some(pair) = seen.windows(2).find(|w| w[0] == w[1]) {
            return Err(ConfigError::DuplicateYear(pair[0]));
        }

        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            expected: "a positive finite number",
        })
    }
}
