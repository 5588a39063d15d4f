//! Equal-area polygon splitting.
//!
//! Split polygons into pieces no larger than a target ground area, optionally
//! merge undersized fragments back into their neighbours, and do both in an
//! equal-area planar projection so that "area" means ground area.
//!
//! Modules
//! - `geom`: kernel adapter over `geo` (fallible booleans, `Shape`, metrics).
//! - `project`: forward/inverse projection (EPSG:6933, affine).
//! - `split`: Area Splitter. `merge`: Fragment Merger. `pipeline`: Orchestrator.
//! - `features`: GeoJSON FeatureCollection in/out.
//!
//! API Policy
//! - `api` and `prelude` are the curated surfaces; module paths may move.

pub mod api;
pub mod cancel;
pub mod error;
pub mod features;
pub mod geom;
pub mod merge;
pub mod pipeline;
pub mod project;
pub mod split;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{Error, Result};
pub use geo::{Coord, MultiPolygon, Polygon};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::cancel::CancelFlag;
    pub use crate::error::{ConfigError, Error, Result};
    pub use crate::features::{read_feature_collection, to_feature_collection, InputPolygon};
    pub use crate::geom::Shape;
    pub use crate::merge::{merge, MergeCfg};
    pub use crate::pipeline::{Pipeline, PipelineCfg, PipelineOutput};
    pub use crate::project::{AffineProjection, CylindricalEqualArea, Projection};
    pub use crate::split::{split, split_polygons, SplitCfg};
}
