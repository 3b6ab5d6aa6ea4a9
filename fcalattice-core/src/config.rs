// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Configuration for concept mining and lattice construction
//!
//! `MiningConfig` selects the construction algorithm and its budgets. It can
//! be built from presets, adjusted with `with_*` setters, or loaded from
//! TOML:
//!
//! ```toml
//! algorithm = "sofia"
//! max_concepts = 50
//! min_support = 0.1
//! ranking_measure = "log_stability_bound"
//! use_parallel = true
//! worker_count = 4
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{LatticeError, Result};

/// Default concept budget for approximate miners
pub const DEFAULT_MAX_CONCEPTS: usize = 100;

/// Concept construction algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Exhaustive Close-by-One
    #[default]
    CloseByOne,
    /// Beam search over projections, bounded by `max_concepts`
    Sofia,
    /// Close decision-path extents supplied by an external tree ensemble
    RandomForest,
    /// Upper-neighbour search; builds concepts and covers together
    Lindig,
}

/// How Sofia ranks candidate extents when the working set overflows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMeasure {
    #[default]
    Support,
    /// Support minus the support of the largest extent-included candidate
    LogStabilityBound,
    /// `1 - Σ 2^-|ext \ child|` over the directly included candidates
    StabilityLowerBound,
}

/// How the covering relation is derived from a concept list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatticeStrategy {
    #[default]
    SpanningTree,
    CompletePairwise,
}

/// Which side of a binary table Close-by-One enumerates over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CboOrientation {
    /// The smaller of the two sides
    #[default]
    Auto,
    Objects,
    Attributes,
}

/// Mining and lattice construction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    pub algorithm: Algorithm,

    /// Working-set bound for Sofia. Close-by-One and Lindig ignore it.
    pub max_concepts: usize,

    /// Minimum extent size kept by Sofia. Values below 1 are a fraction of
    /// the object count.
    pub min_support: f64,

    pub ranking_measure: RankingMeasure,

    /// Upper bound on Sofia sweeps over the projection list
    pub max_sweeps: usize,

    pub use_parallel: bool,

    /// Pool size when `use_parallel` is set; 0 means available parallelism
    pub worker_count: usize,

    pub lattice_strategy: LatticeStrategy,

    pub orientation: CboOrientation,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::CloseByOne,
            max_concepts: DEFAULT_MAX_CONCEPTS,
            min_support: 0.0,
            ranking_measure: RankingMeasure::Support,
            max_sweeps: 1,
            use_parallel: false,
            worker_count: 0,
            lattice_strategy: LatticeStrategy::SpanningTree,
            orientation: CboOrientation::Auto,
        }
    }
}

impl MiningConfig {
    /// Exhaustive mining with Close-by-One
    pub fn close_by_one() -> Self {
        Self::default()
    }

    /// Approximate mining keeping at most `max_concepts` extents
    pub fn sofia(max_concepts: usize) -> Self {
        Self {
            algorithm: Algorithm::Sofia,
            max_concepts,
            ..Self::default()
        }
    }

    pub fn lindig() -> Self {
        Self {
            algorithm: Algorithm::Lindig,
            ..Self::default()
        }
    }

    pub fn random_forest() -> Self {
        Self {
            algorithm: Algorithm::RandomForest,
            ..Self::default()
        }
    }

    pub fn with_min_support(mut self, min_support: f64) -> Self {
        self.min_support = min_support;
        self
    }

    pub fn with_ranking_measure(mut self, measure: RankingMeasure) -> Self {
        self.ranking_measure = measure;
        self
    }

    pub fn with_max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.max_sweeps = max_sweeps;
        self
    }

    /// Enable the worker pool. `workers = 0` uses available parallelism.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.use_parallel = true;
        self.worker_count = workers;
        self
    }

    pub fn with_lattice_strategy(mut self, strategy: LatticeStrategy) -> Self {
        self.lattice_strategy = strategy;
        self
    }

    pub fn with_orientation(mut self, orientation: CboOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.algorithm == Algorithm::Sofia && self.max_concepts < 2 {
            return Err(LatticeError::Config(format!(
                "max_concepts must be at least 2 for Sofia, got {}",
                self.max_concepts
            )));
        }
        if !self.min_support.is_finite() || self.min_support < 0.0 {
            return Err(LatticeError::Config(format!(
                "min_support must be finite and non-negative, got {}",
                self.min_support
            )));
        }
        if self.max_sweeps == 0 {
            return Err(LatticeError::Config("max_sweeps must be at least 1".into()));
        }
        Ok(())
    }

    /// Absolute support threshold for a context of `n_objects` objects
    pub fn min_support_count(&self, n_objects: usize) -> usize {
        support_count(self.min_support, n_objects)
    }

    /// Number of pool workers to run with; 1 when parallelism is off
    pub fn effective_workers(&self) -> usize {
        if !self.use_parallel {
            return 1;
        }
        resolve_worker_count(self.worker_count)
    }
}

/// Absolute extent size for `min_support`; values below 1 are a fraction
pub fn support_count(min_support: f64, n_objects: usize) -> usize {
    let threshold = if min_support < 1.0 {
        min_support * n_objects as f64
    } else {
        min_support
    };
    threshold.ceil() as usize
}

/// Map a configured worker count to a concrete one (0 = available parallelism)
pub fn resolve_worker_count(configured: usize) -> usize {
    if configured > 0 {
        return configured;
    }
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = MiningConfig::default();
        assert_eq!(config.algorithm, Algorithm::CloseByOne);
        assert_eq!(config.ranking_measure, RankingMeasure::Support);
        assert_eq!(config.lattice_strategy, LatticeStrategy::SpanningTree);
        assert_eq!(config.effective_workers(), 1);
        config.validate().unwrap();
    }

    #[test]
    fn test_sofia_preset() {
        let config = MiningConfig::sofia(10).with_ranking_measure(RankingMeasure::LogStabilityBound);
        assert_eq!(config.algorithm, Algorithm::Sofia);
        assert_eq!(config.max_concepts, 10);
        config.validate().unwrap();

        assert!(matches!(
            MiningConfig::sofia(1).validate(),
            Err(LatticeError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_support_rejected() {
        assert!(MiningConfig::default().with_min_support(-0.5).validate().is_err());
        assert!(MiningConfig::default().with_min_support(f64::NAN).validate().is_err());
        assert!(MiningConfig::default().with_max_sweeps(0).validate().is_err());
    }

    #[test]
    fn test_min_support_count() {
        let config = MiningConfig::default().with_min_support(0.25);
        assert_eq!(config.min_support_count(16), 4);
        assert_eq!(config.min_support_count(10), 3);
        assert_eq!(MiningConfig::default().with_min_support(3.0).min_support_count(10), 3);
        assert_eq!(MiningConfig::default().min_support_count(10), 0);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = MiningConfig::from_toml(
            r#"
            algorithm = "sofia"
            max_concepts = 12
            ranking_measure = "stability_lower_bound"
            "#,
        )
        .unwrap();
        assert_eq!(config.algorithm, Algorithm::Sofia);
        assert_eq!(config.max_concepts, 12);
        assert_eq!(config.ranking_measure, RankingMeasure::StabilityLowerBound);
        assert_eq!(config.max_sweeps, 1);
    }

    #[test]
    fn test_from_toml_rejects_garbage() {
        assert!(matches!(
            MiningConfig::from_toml("algorithm = \"annealing\""),
            Err(LatticeError::Config(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "use_parallel = true\nworker_count = 3").unwrap();

        let config = MiningConfig::load(file.path()).unwrap();
        assert!(config.use_parallel);
        assert_eq!(config.effective_workers(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let err = MiningConfig::load(Path::new("/nonexistent/mining.toml")).unwrap_err();
        assert!(matches!(err, LatticeError::Io(_)));
    }
}
