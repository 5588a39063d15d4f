//! Basic planar types: bisection bounds and the single/multi-part `Shape`.
//!
//! - `Bounds`: closed axis-aligned box with the longer-side split rule.
//! - `Shape`: what a boolean operation hands back, tagged by part count.

use geo::{coord, BoundingRect, Coord, InteriorPoint, MultiPolygon, Polygon, Rect};

use super::metrics;

/// Bisection axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Closed axis-aligned box `[min.x, max.x] × [min.y, max.y]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Coord<f64>,
    pub max: Coord<f64>,
}

impl From<Rect<f64>> for Bounds {
    fn from(r: Rect<f64>) -> Self {
        Self {
            min: r.min(),
            max: r.max(),
        }
    }
}

impl Bounds {
    /// Bounds of a polygon; `None` for an empty exterior.
    pub fn of_polygon(p: &Polygon<f64>) -> Option<Self> {
        p.bounding_rect().map(Self::from)
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// True when the box has no positive extent along some axis (NaN counts as degenerate).
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Longer side; ties go to X.
    #[inline]
    pub fn split_axis(&self) -> Axis {
        if self.width() >= self.height() {
            Axis::X
        } else {
            Axis::Y
        }
    }

    /// The two half boxes obtained by cutting at the midpoint of `split_axis()`.
    ///
    /// Order: the lower half (smaller x or y) first.
    pub fn halves(&self) -> (Polygon<f64>, Polygon<f64>) {
        match self.split_axis() {
            Axis::X => {
                let mid = 0.5 * (self.min.x + self.max.x);
                (
                    Rect::new(self.min, coord! { x: mid, y: self.max.y }).to_polygon(),
                    Rect::new(coord! { x: mid, y: self.min.y }, self.max).to_polygon(),
                )
            }
            Axis::Y => {
                let mid = 0.5 * (self.min.y + self.max.y);
                (
                    Rect::new(self.min, coord! { x: self.max.x, y: mid }).to_polygon(),
                    Rect::new(coord! { x: self.min.x, y: mid }, self.max).to_polygon(),
                )
            }
        }
    }

    /// Closed-box overlap test (touching boxes overlap).
    #[inline]
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Union of two boxes.
    pub fn merged(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: coord! { x: self.min.x.min(other.min.x), y: self.min.y.min(other.min.y) },
            max: coord! { x: self.max.x.max(other.max.x), y: self.max.y.max(other.max.y) },
        }
    }
}

/// Result of a boolean operation, tagged by part count.
///
/// Every consumer matches on the variant (or flattens with `into_polygons`)
/// instead of inspecting the part count at runtime.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Single(Polygon<f64>),
    Multi(MultiPolygon<f64>),
}

impl From<Polygon<f64>> for Shape {
    fn from(p: Polygon<f64>) -> Self {
        Shape::Single(p)
    }
}

impl Shape {
    /// Classify a kernel result. `None` when it has no parts.
    pub fn from_multi(mp: MultiPolygon<f64>) -> Option<Shape> {
        let mut parts = mp.0;
        match parts.len() {
            0 => None,
            1 => parts.pop().map(Shape::Single),
            _ => Some(Shape::Multi(MultiPolygon::new(parts))),
        }
    }

    /// Flatten into single polygons (order preserved).
    pub fn into_polygons(self) -> Vec<Polygon<f64>> {
        match self {
            Shape::Single(p) => vec![p],
            Shape::Multi(mp) => mp.0,
        }
    }

    pub fn polygons(&self) -> &[Polygon<f64>] {
        match self {
            Shape::Single(p) => std::slice::from_ref(p),
            Shape::Multi(mp) => &mp.0,
        }
    }

    pub fn to_multi(&self) -> MultiPolygon<f64> {
        MultiPolygon::new(self.polygons().to_vec())
    }

    #[inline]
    pub fn part_count(&self) -> usize {
        self.polygons().len()
    }

    /// Planar area, summed over parts.
    pub fn area(&self) -> f64 {
        self.polygons().iter().map(metrics::area).sum()
    }

    /// Boundary length, summed over parts and holes.
    pub fn perimeter(&self) -> f64 {
        self.polygons().iter().map(metrics::perimeter).sum()
    }

    pub fn compactness(&self) -> f64 {
        metrics::compactness_of(self.area(), self.perimeter())
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.polygons()
            .iter()
            .filter_map(Bounds::of_polygon)
            .reduce(|a, b| a.merged(&b))
    }

    /// A point guaranteed to lie inside the shape (not the centroid).
    pub fn representative_point(&self) -> Option<Coord<f64>> {
        match self {
            Shape::Single(p) => p.interior_point().map(|pt| pt.0),
            Shape::Multi(mp) => mp.interior_point().map(|pt| pt.0),
        }
    }
}
