//! Orchestrator: feature polygons in, split (and optionally merged) shapes out.
//!
//! Steps
//! - Repair each input once; inputs that stay invalid are skipped and reported.
//! - Project to planar space and union everything into disjoint components.
//! - Split each component on a rayon pool; results keep component order.
//! - Merge the full piece set on the calling thread (order-sensitive, global).
//! - Project back and report.
//!
//! A single bad input never fails the run. Only configuration errors,
//! cancellation and a pool that cannot start are returned as `Err`.
//!
//! Code cross-refs: `split::split_cancellable`, `merge::merge_cancellable`

mod run;
mod types;

pub use run::{Pipeline, PipelineOutput};
pub use types::{Diagnostic, Level, PipelineCfg, RunDiagnostics};
