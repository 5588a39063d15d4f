//! Error taxonomy for the splitting pipeline.
//!
//! - `ConfigError`: rejected before any processing starts (fatal).
//! - `KernelError`: a boolean operation failed numerically; callers recover locally.
//! - `GeometryError`: an input polygon is invalid and could not be repaired.
//! - `FeatureError`: the feature document could not be read.
//!
//! Depth-cap hits and merge-cap exhaustion are not errors; they are reported
//! through `split::SplitDiagnostics` and `merge::MergeOutcome`.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("max_area must be finite and > 0 (got {0})")]
    NonPositiveMaxArea(f64),
    #[error("tolerance_pct must be finite and >= 0 (got {0})")]
    NegativeTolerance(f64),
    #[error("max_depth must be >= 1")]
    ZeroDepth,
    #[error("min_fragment_area must be finite and >= 0 (got {0})")]
    NegativeFragmentArea(f64),
    #[error("min_area must be finite and >= 0 (got {0})")]
    NegativeMinArea(f64),
    #[error("compactness_threshold must lie in [0, 1] (got {0})")]
    CompactnessOutOfRange(f64),
    #[error("island merge enabled but island_max_distance is missing or not > 0")]
    MissingIslandDistance,
    #[error("max_iterations must be >= 1")]
    ZeroIterations,
    #[error("workers must be >= 1")]
    ZeroWorkers,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum KernelError {
    #[error("{op} failed inside the boolean engine")]
    Topology { op: &'static str },
    #[error("{op} produced non-finite coordinates")]
    NonFinite { op: &'static str },
    #[error("{op} lost area: expected {expected}, got {got}")]
    AreaMismatch {
        op: &'static str,
        expected: f64,
        got: f64,
    },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("invalid input geometry: {reason}")]
    InvalidInputGeometry { reason: String },
}

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("malformed feature document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document is not a FeatureCollection (type = {0:?})")]
    NotACollection(String),
}

/// Umbrella error for pipeline entry points.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Kernel(#[from] KernelError),
    #[error(transparent)]
    Features(#[from] FeatureError),
    #[error("run cancelled")]
    Cancelled,
    #[error("worker pool: {0}")]
    WorkerPool(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
