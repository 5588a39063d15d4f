//! Bisection driver with an explicit work stack.

use geo::{MultiPolygon, Polygon};

use crate::cancel::CancelFlag;
use crate::error::{Error, KernelError};
use crate::geom::{kernel, metrics, Bounds, Shape};

use super::types::{Piece, PieceStatus, SplitCfg, SplitDiagnostics, SplitOutcome};

/// Relative slack when checking that a cut kept the parent's area.
const CUT_AREA_REL_TOL: f64 = 1e-6;

/// Polygon ∩ half-box; `kernel::intersection` outside of tests.
pub(super) type IntersectFn =
    fn(&Polygon<f64>, &Polygon<f64>) -> Result<MultiPolygon<f64>, KernelError>;

/// Split `polygon` under `cfg`. `cfg` must pass `SplitCfg::validate`.
pub fn split(polygon: Polygon<f64>, cfg: &SplitCfg) -> SplitOutcome {
    split_with(polygon, cfg, kernel::intersection)
}

/// As `split`, cutting with `intersect`.
pub(super) fn split_with(
    polygon: Polygon<f64>,
    cfg: &SplitCfg,
    intersect: IntersectFn,
) -> SplitOutcome {
    let mut runner = SplitRunner::new(cfg, None);
    runner.intersect = intersect;
    runner.run(polygon);
    runner.finish()
}

/// As `split`, checking `cancel` before every work item.
pub fn split_cancellable(
    polygon: Polygon<f64>,
    cfg: &SplitCfg,
    cancel: &CancelFlag,
) -> Result<SplitOutcome, Error> {
    let mut runner = SplitRunner::new(cfg, Some(cancel));
    if runner.run(polygon) {
        Ok(runner.finish())
    } else {
        Err(Error::Cancelled)
    }
}

/// Convenience: default tolerances, polygons only.
pub fn split_polygons(polygon: Polygon<f64>, max_area: f64) -> Vec<Polygon<f64>> {
    split(polygon, &SplitCfg::new(max_area)).into_polygons()
}

/// Runner carrying config and accumulators across the stack walk.
struct SplitRunner<'a> {
    cfg: &'a SplitCfg,
    cancel: Option<&'a CancelFlag>,
    intersect: IntersectFn,
    threshold: f64,
    pieces: Vec<Piece>,
    diag: SplitDiagnostics,
}

impl<'a> SplitRunner<'a> {
    fn new(cfg: &'a SplitCfg, cancel: Option<&'a CancelFlag>) -> Self {
        debug_assert!(cfg.validate().is_ok(), "invalid SplitCfg: {cfg:?}");
        Self {
            cfg,
            cancel,
            intersect: kernel::intersection,
            threshold: cfg.threshold(),
            pieces: Vec::new(),
            diag: SplitDiagnostics::default(),
        }
    }

    fn finish(self) -> SplitOutcome {
        let mut diag = self.diag;
        diag.pieces = self.pieces.len();
        SplitOutcome {
            pieces: self.pieces,
            diag,
        }
    }

    /// Returns false if cancelled.
    fn run(&mut self, polygon: Polygon<f64>) -> bool {
        // LIFO with children pushed in reverse: same order as plain recursion.
        let mut stack: Vec<(Polygon<f64>, u32)> = vec![(polygon, 0)];
        while let Some((poly, depth)) = stack.pop() {
            if self.cancel.is_some_and(CancelFlag::is_cancelled) {
                return false;
            }
            self.diag.max_depth_reached = self.diag.max_depth_reached.max(depth);
            let area = metrics::area(&poly);
            if area <= self.threshold {
                self.emit(poly, depth, PieceStatus::Conforming);
                continue;
            }
            if depth >= self.cfg.max_depth {
                tracing::debug!(depth, area, "depth cap reached; keeping piece unsplit");
                self.diag.depth_capped += 1;
                self.emit(poly, depth, PieceStatus::DepthCapped);
                continue;
            }
            let bounds = match Bounds::of_polygon(&poly) {
                Some(b) if !b.is_degenerate() => b,
                _ => {
                    tracing::debug!(depth, area, "degenerate bounds; keeping piece unsplit");
                    self.diag.degenerate += 1;
                    self.emit(poly, depth, PieceStatus::Degenerate);
                    continue;
                }
            };
            match self.cut(&poly, area, &bounds) {
                Ok(children) => {
                    for child in children.into_iter().rev() {
                        stack.push((child, depth + 1));
                    }
                }
                Err(err) => {
                    tracing::warn!(%err, depth, area, "cut failed; keeping branch unsplit");
                    self.diag.kernel_fallbacks += 1;
                    self.emit(poly, depth, PieceStatus::KernelFallback);
                }
            }
        }
        true
    }

    #[inline]
    fn emit(&mut self, polygon: Polygon<f64>, depth: u32, status: PieceStatus) {
        self.pieces.push(Piece {
            polygon,
            depth,
            status,
        });
    }

    /// Intersect `poly` with both halves of `bounds`, flatten, and drop slivers.
    ///
    /// Sliver counters are only committed when the whole cut succeeds.
    fn cut(
        &mut self,
        poly: &Polygon<f64>,
        area: f64,
        bounds: &Bounds,
    ) -> Result<Vec<Polygon<f64>>, KernelError> {
        let (lo, hi) = bounds.halves();
        let mut kept: Vec<Polygon<f64>> = Vec::new();
        let mut kept_area = 0.0;
        let mut dropped = 0usize;
        let mut dropped_area = 0.0;
        for half in [&lo, &hi] {
            let parts = match Shape::from_multi((self.intersect)(poly, half)?) {
                None => continue,
                Some(Shape::Single(p)) => vec![p],
                Some(Shape::Multi(mp)) => mp.0,
            };
            for part in parts {
                let a = metrics::area(&part);
                if a < self.cfg.min_fragment_area {
                    dropped += 1;
                    dropped_area += a;
                } else {
                    kept_area += a;
                    kept.push(part);
                }
            }
        }
        check_cut_area(area, kept_area + dropped_area)?;
        self.diag.discarded_slivers += dropped;
        self.diag.discarded_area += dropped_area;
        Ok(kept)
    }
}

/// The halves of a cut must add back up to the parent's area.
pub(super) fn check_cut_area(parent: f64, got: f64) -> Result<(), KernelError> {
    if (got - parent).abs() <= CUT_AREA_REL_TOL * parent {
        Ok(())
    } else {
        Err(KernelError::AreaMismatch {
            op: "intersection",
            expected: parent,
            got,
        })
    }
}
