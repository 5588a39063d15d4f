//! Fragment Merger: greedy absorption of undersized fragments.
//!
//! Purpose
//! - Reduce splitter output by merging fragments below `MergeCfg::min_area`
//!   into an adjacent fragment, steering toward compact results.
//!
//! Algorithm
//! - Each iteration orders small fragments by (compactness, area) ascending
//!   and merges the first one that has an acceptable partner. Partners are
//!   ranked by compactness tier, then gain `c(union) − c(partner)`, then
//!   smaller partner area, then position.
//! - Stops when no small fragment can merge, or at `max_iterations`
//!   (reported as incomplete, not as an error).
//!
//! The fragment list is owned by the merge call and returned as a new
//! collection; the merge is sequential by nature and runs after all splitting.
//!
//! Code cross-refs: `geom::{Shape, kernel}`, `pipeline::Pipeline`

mod greedy;
mod types;

pub use greedy::{merge, merge_cancellable};
pub use types::{MergeCfg, MergeOutcome, MergeReport};
