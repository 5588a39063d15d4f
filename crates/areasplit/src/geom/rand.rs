//! Random star-shaped polygons (radial jitter + replay tokens).
//!
//! Purpose
//! - Provide a small, deterministic sampler of simple, generally non-convex
//!   polygons for property tests and benchmarks of the splitter and merger.
//!
//! Model
//! - Start from `n` equally spaced angles on [0, 2π), add bounded angular and
//!   radial jitter, and connect the points in angle order. Sorting by angle
//!   around the center keeps the ring simple (star-shaped w.r.t. the center).
//! - Determinism uses a replay token `(seed, index)` mixed into a single RNG.

use geo::{Coord, LineString, Polygon};
use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Vertex count distribution.
#[derive(Clone, Copy, Debug)]
pub enum VertexCount {
    Fixed(usize),
    Uniform { min: usize, max: usize },
}
impl VertexCount {
    fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        match *self {
            VertexCount::Fixed(n) => n.max(3),
            VertexCount::Uniform { min, max } => {
                let lo = min.max(3);
                let hi = max.max(lo);
                rng.gen_range(lo..=hi)
            }
        }
    }
}

/// Star sampler configuration.
#[derive(Clone, Copy, Debug)]
pub struct StarCfg {
    pub vertex_count: VertexCount,
    /// Angular jitter as a fraction of the base spacing Δ=2π/n. Clamped to [0, 0.49].
    pub angle_jitter_frac: f64,
    /// Radial jitter. Radii = `base_radius * (1 + u)`, `u∈[-radial_jitter, radial_jitter]`,
    /// clamped to [0, 0.95] so every vertex stays off the center.
    pub radial_jitter: f64,
    pub base_radius: f64,
    pub center: Vector2<f64>,
    pub random_phase: bool,
}
impl Default for StarCfg {
    fn default() -> Self {
        Self {
            vertex_count: VertexCount::Fixed(16),
            angle_jitter_frac: 0.3,
            radial_jitter: 0.5,
            base_radius: 100.0,
            center: Vector2::zeros(),
            random_phase: true,
        }
    }
}

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}
impl ReplayToken {
    #[inline]
    fn to_std_rng(self) -> StdRng {
        // SplitMix64-style mixing, cheap and stable.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

#[inline]
pub fn polar(r: f64, theta: f64) -> Vector2<f64> {
    Vector2::new(theta.cos() * r, theta.sin() * r)
}

/// Draw a simple star-shaped polygon (closed exterior ring, no holes, CCW).
pub fn draw_star_polygon(cfg: StarCfg, tok: ReplayToken) -> Polygon<f64> {
    let mut rng = tok.to_std_rng();
    let n = cfg.vertex_count.sample(&mut rng);
    let aj = cfg.angle_jitter_frac.clamp(0.0, 0.49);
    let rj = cfg.radial_jitter.clamp(0.0, 0.95);
    let r0 = cfg.base_radius.max(1e-9);
    let delta = std::f64::consts::TAU / (n as f64);
    let phase = if cfg.random_phase {
        rng.gen::<f64>() * std::f64::consts::TAU
    } else {
        0.0
    };
    let mut angles: Vec<f64> = (0..n)
        .map(|k| {
            let base = phase + (k as f64) * delta;
            let jitter = (rng.gen::<f64>() * 2.0 - 1.0) * aj * delta;
            base + jitter
        })
        .collect();
    angles.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mut ring: Vec<Coord<f64>> = angles
        .into_iter()
        .map(|th| {
            let u = (rng.gen::<f64>() * 2.0 - 1.0) * rj;
            let p = cfg.center + polar((1.0 + u) * r0, th);
            Coord { x: p.x, y: p.y }
        })
        .collect();
    if let Some(first) = ring.first().copied() {
        ring.push(first);
    }
    Polygon::new(LineString::new(ring), Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, Validation};

    #[test]
    fn reproducible_draw() {
        let cfg = StarCfg {
            vertex_count: VertexCount::Fixed(10),
            ..StarCfg::default()
        };
        let tok = ReplayToken { seed: 42, index: 7 };
        let p1 = draw_star_polygon(cfg, tok);
        let p2 = draw_star_polygon(cfg, tok);
        assert_eq!(p1, p2);
        let p3 = draw_star_polygon(cfg, ReplayToken { seed: 42, index: 8 });
        assert_ne!(p1, p3);
    }

    #[test]
    fn draws_are_simple_and_ccw() {
        let cfg = StarCfg {
            vertex_count: VertexCount::Uniform { min: 5, max: 40 },
            ..StarCfg::default()
        };
        for index in 0..50 {
            let p = draw_star_polygon(cfg, ReplayToken { seed: 3, index });
            assert!(p.is_valid(), "draw {index} not valid");
            assert!(p.signed_area() > 0.0);
            assert_eq!(p.exterior().0.first(), p.exterior().0.last());
        }
    }
}
