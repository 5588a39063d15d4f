//! Fallible boolean operations over the `geo` engine.
//!
//! The engine itself is assumed correct. What can still go wrong is numeric:
//! a panic deep inside the sweep, or coordinates that blew up to NaN/inf on a
//! nearly coincident cut line. Both surface here as `KernelError` so callers
//! can decide how to degrade.

use std::panic::{catch_unwind, AssertUnwindSafe};

use geo::{BooleanOps, CoordsIter, MultiPolygon, Polygon, Validation};

use crate::error::{GeometryError, KernelError};

fn guarded<F>(op: &'static str, f: F) -> Result<MultiPolygon<f64>, KernelError>
where
    F: FnOnce() -> MultiPolygon<f64>,
{
    let out = catch_unwind(AssertUnwindSafe(f)).map_err(|_| KernelError::Topology { op })?;
    if out.coords_iter().all(|c| c.x.is_finite() && c.y.is_finite()) {
        Ok(out)
    } else {
        Err(KernelError::NonFinite { op })
    }
}

/// `a ∩ b`; empty result is `Ok` with zero parts.
pub fn intersection(a: &Polygon<f64>, b: &Polygon<f64>) -> Result<MultiPolygon<f64>, KernelError> {
    guarded("intersection", || a.intersection(b))
}

/// `a ∪ b`.
pub fn union(
    a: &MultiPolygon<f64>,
    b: &MultiPolygon<f64>,
) -> Result<MultiPolygon<f64>, KernelError> {
    guarded("union", || a.union(b))
}

/// Union of all polygons, folded left to right.
pub fn union_all<'a, I>(polys: I) -> Result<MultiPolygon<f64>, KernelError>
where
    I: IntoIterator<Item = &'a Polygon<f64>>,
{
    let mut acc = MultiPolygon::<f64>::new(Vec::new());
    for p in polys {
        let next = MultiPolygon::new(vec![p.clone()]);
        acc = union(&acc, &next)?;
    }
    Ok(acc)
}

/// Validity repair (buffer-by-zero equivalent).
///
/// Valid input is returned as a single part with `false`. Otherwise the
/// polygon is run through the boolean engine on its own, which resolves
/// self-intersections into simple parts; the result must then validate and
/// comes back with `true`.
pub fn repair(p: &Polygon<f64>) -> Result<(MultiPolygon<f64>, bool), GeometryError> {
    if p.exterior().0.len() < 4 {
        return Err(GeometryError::InvalidInputGeometry {
            reason: format!("exterior ring has {} coordinates", p.exterior().0.len()),
        });
    }
    if p.is_valid() {
        return Ok((MultiPolygon::new(vec![p.clone()]), false));
    }
    let empty = MultiPolygon::<f64>::new(Vec::new());
    let fixed = guarded("repair", || p.union(&empty)).map_err(|e| {
        GeometryError::InvalidInputGeometry {
            reason: e.to_string(),
        }
    })?;
    if fixed.0.is_empty() {
        return Err(GeometryError::InvalidInputGeometry {
            reason: "repair left no area".to_string(),
        });
    }
    if !fixed.is_valid() {
        return Err(GeometryError::InvalidInputGeometry {
            reason: "still invalid after repair".to_string(),
        });
    }
    Ok((fixed, true))
}
