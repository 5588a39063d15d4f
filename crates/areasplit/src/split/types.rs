//! Splitter configuration, output pieces, and diagnostics.

use geo::Polygon;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geom::metrics;

/// Splitter configuration (planar units).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitCfg {
    /// Maximum piece area.
    pub max_area: f64,
    /// Slack on `max_area`, in percent. Pieces up to `max_area·(1+tol/100)` are accepted.
    pub tolerance_pct: f64,
    /// Bisection depth at which a piece is returned as-is.
    pub max_depth: u32,
    /// Cut results below this area are cut-line artifacts and are dropped.
    pub min_fragment_area: f64,
}

impl Default for SplitCfg {
    fn default() -> Self {
        Self {
            // 5000 km² in m².
            max_area: 5.0e9,
            tolerance_pct: 5.0,
            max_depth: 16,
            min_fragment_area: 1.0,
        }
    }
}

impl SplitCfg {
    pub fn new(max_area: f64) -> Self {
        Self {
            max_area,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_area.is_finite() && self.max_area > 0.0) {
            return Err(ConfigError::NonPositiveMaxArea(self.max_area));
        }
        if !(self.tolerance_pct.is_finite() && self.tolerance_pct >= 0.0) {
            return Err(ConfigError::NegativeTolerance(self.tolerance_pct));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        if !(self.min_fragment_area.is_finite() && self.min_fragment_area >= 0.0) {
            return Err(ConfigError::NegativeFragmentArea(self.min_fragment_area));
        }
        Ok(())
    }

    /// Largest accepted piece area, `max_area·(1 + tolerance)`.
    #[inline]
    pub fn threshold(&self) -> f64 {
        self.max_area * (1.0 + self.tolerance_pct / 100.0)
    }
}

/// Why a piece stopped being split.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceStatus {
    /// Area within the threshold.
    Conforming,
    /// Depth cap reached while still over the threshold.
    DepthCapped,
    /// Bounding box collapsed to a line or point.
    Degenerate,
    /// The cut failed in the kernel; the unsplit branch was kept.
    KernelFallback,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Piece {
    pub polygon: Polygon<f64>,
    pub depth: u32,
    pub status: PieceStatus,
}

impl Piece {
    #[inline]
    pub fn area(&self) -> f64 {
        metrics::area(&self.polygon)
    }
}

/// Counters over one or more split runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitDiagnostics {
    pub pieces: usize,
    pub depth_capped: usize,
    pub degenerate: usize,
    pub kernel_fallbacks: usize,
    pub discarded_slivers: usize,
    pub discarded_area: f64,
    pub max_depth_reached: u32,
}

impl SplitDiagnostics {
    pub fn absorb(&mut self, other: &SplitDiagnostics) {
        self.pieces += other.pieces;
        self.depth_capped += other.depth_capped;
        self.degenerate += other.degenerate;
        self.kernel_fallbacks += other.kernel_fallbacks;
        self.discarded_slivers += other.discarded_slivers;
        self.discarded_area += other.discarded_area;
        self.max_depth_reached = self.max_depth_reached.max(other.max_depth_reached);
    }

    /// Pieces that may exceed the threshold.
    #[inline]
    pub fn non_conforming(&self) -> usize {
        self.depth_capped + self.degenerate + self.kernel_fallbacks
    }
}

/// Pieces of one input polygon, in depth-first cut order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SplitOutcome {
    pub pieces: Vec<Piece>,
    pub diag: SplitDiagnostics,
}

impl SplitOutcome {
    pub fn total_area(&self) -> f64 {
        self.pieces.iter().map(Piece::area).sum()
    }

    pub fn into_polygons(self) -> Vec<Polygon<f64>> {
        self.pieces.into_iter().map(|p| p.polygon).collect()
    }
}
