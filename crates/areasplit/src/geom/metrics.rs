//! Shape metrics on planar polygons.

use geo::{Area, LineString, Polygon};

#[inline]
pub fn area(p: &Polygon<f64>) -> f64 {
    p.unsigned_area()
}

/// Exterior plus hole ring lengths.
pub fn perimeter(p: &Polygon<f64>) -> f64 {
    ring_length(p.exterior()) + p.interiors().iter().map(ring_length).sum::<f64>()
}

fn ring_length(ring: &LineString<f64>) -> f64 {
    ring.lines().map(|l| l.dx().hypot(l.dy())).sum()
}

/// Isoperimetric quotient `4π·A/P²`: 1 for a disk, → 0 for slivers.
///
/// Zero (not NaN) when the perimeter vanishes.
#[inline]
pub fn compactness_of(area: f64, perimeter: f64) -> f64 {
    if perimeter > 0.0 && perimeter.is_finite() && area.is_finite() {
        4.0 * std::f64::consts::PI * area / (perimeter * perimeter)
    } else {
        0.0
    }
}

pub fn compactness(p: &Polygon<f64>) -> f64 {
    compactness_of(area(p), perimeter(p))
}
