//! Projection adapter between input coordinates and the planar working space.
//!
//! - `Projection`: forward (input → planar) and inverse maps on single coordinates.
//! - `CylindricalEqualArea`: EPSG:6933, WGS 84 ellipsoid, standard parallel 30°.
//!   Euclidean area in the output is ground area in m².
//! - `AffineProjection`: `x ↦ M x + t` for inputs that are already planar.
//!
//! Splitting and merging run entirely in planar space; the pipeline projects
//! once on the way in and once on the way out.

use geo::{Coord, MapCoords, Polygon};
use nalgebra::{Matrix2, Vector2};

use crate::geom::Shape;

pub trait Projection: Send + Sync {
    fn forward(&self, c: Coord<f64>) -> Coord<f64>;
    fn inverse(&self, c: Coord<f64>) -> Coord<f64>;

    fn forward_polygon(&self, p: &Polygon<f64>) -> Polygon<f64> {
        p.map_coords(|c| self.forward(c))
    }

    fn inverse_shape(&self, s: &Shape) -> Shape {
        match s {
            Shape::Single(p) => Shape::Single(p.map_coords(|c| self.inverse(c))),
            Shape::Multi(mp) => Shape::Multi(mp.map_coords(|c| self.inverse(c))),
        }
    }
}

/// Lambert cylindrical equal-area on the WGS 84 ellipsoid (EPSG:6933).
///
/// Input `x` is longitude, `y` latitude, both in degrees; output in metres.
#[derive(Clone, Copy, Debug)]
pub struct CylindricalEqualArea {
    a: f64,
    e: f64,
    k0: f64,
    qp: f64,
    lon0: f64,
}

impl Default for CylindricalEqualArea {
    fn default() -> Self {
        Self::new(6_378_137.0, 1.0 / 298.257_223_563, 30.0, 0.0)
    }
}

impl CylindricalEqualArea {
    /// Semi-major axis `a`, flattening `f`, standard parallel and central meridian in degrees.
    pub fn new(a: f64, f: f64, standard_parallel_deg: f64, lon0_deg: f64) -> Self {
        let e2 = f * (2.0 - f);
        let e = e2.sqrt();
        let s1 = standard_parallel_deg.to_radians().sin();
        let k0 = standard_parallel_deg.to_radians().cos() / (1.0 - e2 * s1 * s1).sqrt();
        let qp = authalic_q(1.0, e);
        Self {
            a,
            e,
            k0,
            qp,
            lon0: lon0_deg,
        }
    }

    /// Geodetic latitude from authalic latitude `beta` (radians), series to e⁶.
    fn latitude_from_authalic(&self, beta: f64) -> f64 {
        let e2 = self.e * self.e;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        beta + (e2 / 3.0 + 31.0 * e4 / 180.0 + 517.0 * e6 / 5040.0) * (2.0 * beta).sin()
            + (23.0 * e4 / 360.0 + 251.0 * e6 / 3780.0) * (4.0 * beta).sin()
            + (761.0 * e6 / 45360.0) * (6.0 * beta).sin()
    }
}

/// `q(φ)` from Snyder (3-12) given `sin φ`.
fn authalic_q(sin_phi: f64, e: f64) -> f64 {
    let e2 = e * e;
    if e < 1e-12 {
        return 2.0 * sin_phi;
    }
    let es = e * sin_phi;
    (1.0 - e2) * (sin_phi / (1.0 - es * es) - (0.5 / e) * ((1.0 - es) / (1.0 + es)).ln())
}

impl Projection for CylindricalEqualArea {
    fn forward(&self, c: Coord<f64>) -> Coord<f64> {
        let lat = c.y.clamp(-90.0, 90.0).to_radians();
        let q = authalic_q(lat.sin(), self.e);
        Coord {
            x: self.a * self.k0 * (c.x - self.lon0).to_radians(),
            y: self.a * q / (2.0 * self.k0),
        }
    }

    fn inverse(&self, c: Coord<f64>) -> Coord<f64> {
        let s = (2.0 * c.y * self.k0 / (self.a * self.qp)).clamp(-1.0, 1.0);
        let beta = s.asin();
        Coord {
            x: self.lon0 + (c.x / (self.a * self.k0)).to_degrees(),
            y: self.latitude_from_authalic(beta).to_degrees(),
        }
    }
}

/// Planar affine map `x ↦ M x + t` with a cached inverse.
#[derive(Clone, Copy, Debug)]
pub struct AffineProjection {
    pub m: Matrix2<f64>,
    pub t: Vector2<f64>,
    m_inv: Matrix2<f64>,
}

impl AffineProjection {
    /// `None` if `M` is singular.
    pub fn new(m: Matrix2<f64>, t: Vector2<f64>) -> Option<Self> {
        let m_inv = m.try_inverse()?;
        Some(Self { m, t, m_inv })
    }

    #[inline]
    pub fn identity() -> Self {
        Self {
            m: Matrix2::identity(),
            t: Vector2::zeros(),
            m_inv: Matrix2::identity(),
        }
    }

    /// Uniform scale `s` (areas scale by `s²`). `None` for `s == 0`.
    pub fn scale(s: f64) -> Option<Self> {
        Self::new(Matrix2::identity() * s, Vector2::zeros())
    }

    #[inline]
    pub fn area_factor(&self) -> f64 {
        self.m.determinant().abs()
    }
}

impl Projection for AffineProjection {
    fn forward(&self, c: Coord<f64>) -> Coord<f64> {
        let v = self.m * Vector2::new(c.x, c.y) + self.t;
        Coord { x: v.x, y: v.y }
    }

    fn inverse(&self, c: Coord<f64>) -> Coord<f64> {
        let v = self.m_inv * (Vector2::new(c.x, c.y) - self.t);
        Coord { x: v.x, y: v.y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, polygon, Area};
    use nalgebra::matrix;

    #[test]
    fn cea_known_values() {
        let p = CylindricalEqualArea::default();
        let o = p.forward(coord! { x: 0.0, y: 0.0 });
        assert!(o.x.abs() < 1e-9 && o.y.abs() < 1e-9);
        // x = ±17367530.45 at the antimeridian, y = ±7342230.14 at the poles.
        let corner = p.forward(coord! { x: 180.0, y: 90.0 });
        assert!((corner.x - 17_367_530.45).abs() < 1.0, "x = {}", corner.x);
        assert!((corner.y - 7_342_230.14).abs() < 1.0, "y = {}", corner.y);
    }

    #[test]
    fn cea_round_trip() {
        let p = CylindricalEqualArea::default();
        for &(lon, lat) in &[(12.5, 41.9), (-73.9, 40.7), (151.2, -33.9), (0.0, 84.0)] {
            let back = p.inverse(p.forward(coord! { x: lon, y: lat }));
            assert!((back.x - lon).abs() < 1e-9);
            assert!((back.y - lat).abs() < 1e-6, "lat {lat} -> {}", back.y);
        }
    }

    #[test]
    fn cea_area_matches_ground_area() {
        // A 1°×1° cell at the equator is about 12 308 km² on WGS 84.
        let p = CylindricalEqualArea::default();
        let cell = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ];
        let km2 = p.forward_polygon(&cell).unsigned_area() / 1e6;
        assert!((km2 - 12_308.5).abs() < 1.0, "got {km2}");
    }

    #[test]
    fn affine_inverse_and_singular() {
        let f = AffineProjection::new(matrix![2.0, 1.0; 0.0, 3.0], Vector2::new(1.0, -1.0)).unwrap();
        let c = coord! { x: 0.3, y: -2.0 };
        let back = f.inverse(f.forward(c));
        assert!((back.x - c.x).abs() < 1e-12 && (back.y - c.y).abs() < 1e-12);
        assert!((f.area_factor() - 6.0).abs() < 1e-12);
        assert!(AffineProjection::new(matrix![1.0, 2.0; 2.0, 4.0], Vector2::zeros()).is_none());
        assert!(AffineProjection::scale(0.0).is_none());
    }

    #[test]
    fn inverse_shape_keeps_variant() {
        let f = AffineProjection::scale(1e3).unwrap();
        let sq = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ];
        let planar = Shape::Single(f.forward_polygon(&sq));
        let back = f.inverse_shape(&planar);
        assert!(matches!(back, Shape::Single(_)));
        assert!((back.area() - 0.5).abs() < 1e-12);
    }
}
