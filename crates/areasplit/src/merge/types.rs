//! Merger configuration and outcome.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geom::Shape;

/// Merger configuration (planar units).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeCfg {
    /// Fragments below this area get absorbed. 0 disables merging.
    pub min_area: f64,
    /// Advisory: neighbours whose merged compactness reaches this are preferred.
    pub compactness_threshold: f64,
    /// Fall back to the nearest fragment when a small one has no neighbour.
    pub allow_island_merge: bool,
    /// Max representative-point distance for island merges.
    pub island_max_distance: Option<f64>,
    pub max_iterations: usize,
}

impl Default for MergeCfg {
    fn default() -> Self {
        Self {
            min_area: 0.0,
            compactness_threshold: 0.2,
            allow_island_merge: false,
            island_max_distance: None,
            max_iterations: 2000,
        }
    }
}

impl MergeCfg {
    pub fn new(min_area: f64) -> Self {
        Self {
            min_area,
            ..Self::default()
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.min_area > 0.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_area.is_finite() && self.min_area >= 0.0) {
            return Err(ConfigError::NegativeMinArea(self.min_area));
        }
        if !(0.0..=1.0).contains(&self.compactness_threshold) {
            return Err(ConfigError::CompactnessOutOfRange(self.compactness_threshold));
        }
        if self.allow_island_merge
            && !self
                .island_max_distance
                .is_some_and(|d| d.is_finite() && d > 0.0)
        {
            return Err(ConfigError::MissingIslandDistance);
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        Ok(())
    }
}

/// Counters describing one merge run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeReport {
    pub merges: usize,
    pub island_merges: usize,
    pub iterations: usize,
    /// False when the iteration cap stopped the run with merges still possible.
    pub complete: bool,
    /// Fragments still below `min_area` at the end.
    pub unmerged_small: usize,
    pub kernel_failures: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MergeOutcome {
    /// Single-part except where an island merge joined disconnected pieces.
    pub fragments: Vec<Shape>,
    pub report: MergeReport,
}
