//! Planar geometry used by the splitter and merger.
//!
//! Purpose
//! - Wrap the `geo` boolean engine behind a small, fallible kernel so the
//!   splitter and merger can recover locally from numeric failures.
//! - Provide the tagged `Shape` variant (single vs multi-part) with an explicit
//!   flattening step, axis-aligned `Bounds` for bisection, and shape metrics.
//!
//! All functions here operate on planar (projected) coordinates. Area and
//! compactness are only meaningful after an equal-area projection.
//!
//! Code cross-refs: `split::split`, `merge::merge`, `project::Projection`

pub mod kernel;
pub mod metrics;
pub mod rand;
mod types;

pub use kernel::{intersection, repair, union, union_all};
pub use metrics::{compactness, compactness_of, perimeter};
pub use types::{Axis, Bounds, Shape};

#[cfg(test)]
mod tests;
