//! Pipeline configuration and run diagnostics.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::features::SkippedFeature;
use crate::merge::{MergeCfg, MergeReport};
use crate::split::{SplitCfg, SplitDiagnostics};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineCfg {
    pub split: SplitCfg,
    /// Merging runs only when `merge.min_area > 0`.
    pub merge: MergeCfg,
    /// Split worker threads; `None` lets rayon pick.
    pub workers: Option<usize>,
}

impl PipelineCfg {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.split.validate()?;
        self.merge.validate()?;
        if self.workers == Some(0) {
            return Err(ConfigError::ZeroWorkers);
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warn,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
}

/// Everything a caller needs to judge a best-effort result.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunDiagnostics {
    pub skipped: Vec<SkippedFeature>,
    pub repaired: usize,
    /// Disjoint top-level polygons after the union.
    pub components: usize,
    /// True when the union failed and overlapping inputs were split as given.
    pub union_fallback: bool,
    pub split: SplitDiagnostics,
    pub merge: Option<MergeReport>,
    /// Planar area of the components.
    pub input_area: f64,
    /// Planar area of the output, before back-projection.
    pub output_area: f64,
    pub events: Vec<Diagnostic>,
}

impl RunDiagnostics {
    pub(crate) fn info(&mut self, message: String) {
        self.events.push(Diagnostic {
            level: Level::Info,
            message,
        });
    }

    pub(crate) fn warn(&mut self, message: String) {
        self.events.push(Diagnostic {
            level: Level::Warn,
            message,
        });
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.events.iter().filter(|d| d.level == Level::Warn)
    }
}
