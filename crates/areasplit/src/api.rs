//! Curated API surface (UNSTABLE).
//!
//! Flat re-exports for the CLI, benches and downstream tools. Prefer these
//! over deep module paths; they are kept in step with module moves.

// Geometry kernel
pub use crate::geom::{
    compactness, compactness_of, intersection, perimeter, repair, union, union_all, Axis, Bounds,
    Shape,
};
// Random test polygons
pub use crate::geom::rand::{
    draw_star_polygon, polar, ReplayToken as StarReplay, StarCfg, VertexCount,
};
// Projections
pub use crate::project::{AffineProjection, CylindricalEqualArea, Projection};
// Splitter
pub use crate::split::{
    split, split_cancellable, split_polygons, Piece, PieceStatus, SplitCfg, SplitDiagnostics,
    SplitOutcome,
};
// Merger
pub use crate::merge::{merge, merge_cancellable, MergeCfg, MergeOutcome, MergeReport};
// Orchestrator and feature I/O
pub use crate::features::{
    read_feature_collection, to_feature_collection, FeatureCollection, InputPolygon,
    ParsedFeatures, SkippedFeature,
};
pub use crate::pipeline::{
    Diagnostic, Level, Pipeline, PipelineCfg, PipelineOutput, RunDiagnostics,
};
pub use crate::cancel::CancelFlag;
pub use crate::error::{ConfigError, Error, FeatureError, GeometryError, KernelError};
