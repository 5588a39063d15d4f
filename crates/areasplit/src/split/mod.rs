//! Area Splitter: recursive axis-aligned bisection under an area threshold.
//!
//! Purpose
//! - Partition one planar polygon into pieces of area ≤ `SplitCfg::threshold()`
//!   whose union is the input and whose interiors are pairwise disjoint.
//!
//! Algorithm
//! - Accept a polygon within the threshold; otherwise cut its bounding box at
//!   the midpoint of the longer side, intersect with both halves, flatten
//!   multi-part results, and recurse per part.
//! - Depth cap, degenerate boxes and kernel failures stop a branch early; the
//!   stopped piece is kept and tagged (`PieceStatus`) rather than lost.
//!
//! The splitter is a pure function of its inputs and is safe to call from any
//! worker thread.
//!
//! Code cross-refs: `geom::{Bounds, Shape, kernel}`, `pipeline::Pipeline`

mod runner;
mod types;

pub use runner::{split, split_cancellable, split_polygons};
pub use types::{Piece, PieceStatus, SplitCfg, SplitDiagnostics, SplitOutcome};
