//! Greedy merge loop over an owned fragment list.

use std::cmp::Ordering;

use geo::{Intersects, Polygon};

use crate::cancel::CancelFlag;
use crate::error::{Error, KernelError};
use crate::geom::{kernel, Bounds, Shape};

use super::types::{MergeCfg, MergeOutcome, MergeReport};

/// Relative slack when checking a union's area against its inputs.
const UNION_AREA_REL_TOL: f64 = 1e-6;

/// Gains closer than this are ties.
const GAIN_TIE_EPS: f64 = 1e-12;

/// Merge small fragments. `cfg` must pass `MergeCfg::validate`.
pub fn merge(polygons: Vec<Polygon<f64>>, cfg: &MergeCfg) -> MergeOutcome {
    let mut m = Merger::new(polygons, cfg, None);
    m.run();
    m.finish()
}

/// As `merge`, checking `cancel` once per iteration.
pub fn merge_cancellable(
    polygons: Vec<Polygon<f64>>,
    cfg: &MergeCfg,
    cancel: &CancelFlag,
) -> Result<MergeOutcome, Error> {
    let mut m = Merger::new(polygons, cfg, Some(cancel));
    if m.run() {
        Ok(m.finish())
    } else {
        Err(Error::Cancelled)
    }
}

/// Fragment with cached metrics.
#[derive(Clone, Debug)]
struct Fragment {
    shape: Shape,
    area: f64,
    compactness: f64,
    bounds: Option<Bounds>,
}

impl Fragment {
    fn new(shape: Shape) -> Self {
        Self {
            area: shape.area(),
            compactness: shape.compactness(),
            bounds: shape.bounds(),
            shape,
        }
    }

    fn touches(&self, other: &Fragment) -> bool {
        match (&self.bounds, &other.bounds) {
            (Some(a), Some(b)) if a.overlaps(b) => {}
            _ => return false,
        }
        self.shape
            .polygons()
            .iter()
            .any(|p| other.shape.polygons().iter().any(|q| p.intersects(q)))
    }
}

/// A merge the loop has decided to apply: fold `small` into `into`.
struct Plan {
    small: usize,
    into: usize,
    merged: Fragment,
    island: bool,
}

/// Ranking of an adjacent partner; larger is better.
struct Rank {
    meets_threshold: bool,
    gain: f64,
    partner_area: f64,
}

impl Rank {
    fn better_than(&self, other: &Rank) -> bool {
        match self.meets_threshold.cmp(&other.meets_threshold) {
            Ordering::Greater => return true,
            Ordering::Less => return false,
            Ordering::Equal => {}
        }
        if (self.gain - other.gain).abs() > GAIN_TIE_EPS {
            return self.gain > other.gain;
        }
        // Equal gain: the smaller partner wins; full ties keep the earlier index.
        self.partner_area < other.partner_area
    }
}

struct Merger<'a> {
    cfg: &'a MergeCfg,
    cancel: Option<&'a CancelFlag>,
    frags: Vec<Fragment>,
    report: MergeReport,
}

impl<'a> Merger<'a> {
    fn new(polygons: Vec<Polygon<f64>>, cfg: &'a MergeCfg, cancel: Option<&'a CancelFlag>) -> Self {
        debug_assert!(cfg.validate().is_ok(), "invalid MergeCfg: {cfg:?}");
        Self {
            cfg,
            cancel,
            frags: polygons
                .into_iter()
                .map(|p| Fragment::new(Shape::Single(p)))
                .collect(),
            report: MergeReport {
                complete: true,
                ..MergeReport::default()
            },
        }
    }

    fn finish(self) -> MergeOutcome {
        let mut report = self.report;
        report.unmerged_small = self
            .frags
            .iter()
            .filter(|f| f.area < self.cfg.min_area)
            .count();
        MergeOutcome {
            fragments: self.frags.into_iter().map(|f| f.shape).collect(),
            report,
        }
    }

    /// Returns false if cancelled.
    fn run(&mut self) -> bool {
        if !self.cfg.is_enabled() {
            return true;
        }
        loop {
            if self.cancel.is_some_and(CancelFlag::is_cancelled) {
                return false;
            }
            let candidates = self.small_candidates();
            let plan = candidates.iter().find_map(|&i| self.plan_for(i));
            let Some(plan) = plan else {
                break;
            };
            // Only a merge that is possible but not taken makes the run incomplete.
            if self.report.iterations >= self.cfg.max_iterations {
                tracing::warn!(
                    iterations = self.report.iterations,
                    remaining_small = candidates.len(),
                    "merge iteration cap reached; returning current fragments"
                );
                self.report.complete = false;
                break;
            }
            self.report.iterations += 1;
            tracing::debug!(
                small = plan.small,
                into = plan.into,
                island = plan.island,
                area = plan.merged.area,
                "merged fragment"
            );
            self.apply(plan);
        }
        true
    }

    /// Indices of small fragments, most sliver-like first.
    fn small_candidates(&self) -> Vec<usize> {
        let mut idx: Vec<usize> = (0..self.frags.len())
            .filter(|&i| self.frags[i].area < self.cfg.min_area)
            .collect();
        idx.sort_by(|&a, &b| {
            let fa = &self.frags[a];
            let fb = &self.frags[b];
            fa.compactness
                .total_cmp(&fb.compactness)
                .then(fa.area.total_cmp(&fb.area))
                .then(a.cmp(&b))
        });
        idx
    }

    fn plan_for(&mut self, small: usize) -> Option<Plan> {
        if let Some(plan) = self.best_adjacent(small) {
            return Some(plan);
        }
        if self.cfg.allow_island_merge {
            return self.nearest_island(small);
        }
        None
    }

    fn best_adjacent(&mut self, small: usize) -> Option<Plan> {
        let mut best: Option<(Rank, usize, Fragment)> = None;
        for j in 0..self.frags.len() {
            if j == small || !self.frags[small].touches(&self.frags[j]) {
                continue;
            }
            let parts_before =
                self.frags[small].shape.part_count() + self.frags[j].shape.part_count();
            let merged = match self.union_of(small, j) {
                // At least two parts fused across a shared boundary.
                Ok(Some(shape)) if shape.part_count() < parts_before => Fragment::new(shape),
                // Point contact only; nothing was joined.
                Ok(_) => continue,
                Err(err) => {
                    tracing::warn!(%err, small, partner = j, "union failed; skipping partner");
                    self.report.kernel_failures += 1;
                    continue;
                }
            };
            let partner = &self.frags[j];
            let rank = Rank {
                meets_threshold: merged.compactness >= self.cfg.compactness_threshold,
                gain: merged.compactness - partner.compactness,
                partner_area: partner.area,
            };
            if best.as_ref().map_or(true, |(r, _, _)| rank.better_than(r)) {
                best = Some((rank, j, merged));
            }
        }
        best.map(|(_, into, merged)| Plan {
            small,
            into,
            merged,
            island: false,
        })
    }

    fn nearest_island(&mut self, small: usize) -> Option<Plan> {
        let max_d = self.cfg.island_max_distance?;
        let origin = self.frags[small].shape.representative_point()?;
        let mut best: Option<(f64, f64, usize)> = None;
        for (j, f) in self.frags.iter().enumerate() {
            if j == small {
                continue;
            }
            let Some(p) = f.shape.representative_point() else {
                continue;
            };
            let d = (p.x - origin.x).hypot(p.y - origin.y);
            if d > max_d {
                continue;
            }
            let closer = match best {
                None => true,
                Some((bd, ba, _)) => d < bd || (d == bd && f.area < ba),
            };
            if closer {
                best = Some((d, f.area, j));
            }
        }
        let (_, _, into) = best?;
        match self.union_of(small, into) {
            Ok(Some(shape)) => Some(Plan {
                small,
                into,
                merged: Fragment::new(shape),
                island: true,
            }),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(%err, small, partner = into, "island union failed");
                self.report.kernel_failures += 1;
                None
            }
        }
    }

    fn union_of(&self, a: usize, b: usize) -> Result<Option<Shape>, KernelError> {
        let fa = &self.frags[a];
        let fb = &self.frags[b];
        let mp = kernel::union(&fa.shape.to_multi(), &fb.shape.to_multi())?;
        let shape = Shape::from_multi(mp);
        let got = shape.as_ref().map_or(0.0, Shape::area);
        check_union_area(fa.area, fb.area, got)?;
        Ok(shape)
    }

    fn apply(&mut self, plan: Plan) {
        self.frags[plan.into] = plan.merged;
        self.frags.remove(plan.small);
        self.report.merges += 1;
        if plan.island {
            self.report.island_merges += 1;
        }
    }
}

/// `area(a ∪ b)` must lie in `[max(a, b), a + b]`; overlapping neighbours land inside.
fn check_union_area(a: f64, b: f64, got: f64) -> Result<(), KernelError> {
    let lo = a.max(b);
    let hi = a + b;
    let slack = UNION_AREA_REL_TOL * hi;
    if got.is_finite() && got >= lo - slack && got <= hi + slack {
        Ok(())
    } else {
        Err(KernelError::AreaMismatch {
            op: "union",
            expected: hi,
            got,
        })
    }
}
