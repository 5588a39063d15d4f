use geo::Polygon;
use rayon::prelude::*;

use crate::cancel::CancelFlag;
use crate::error::{ConfigError, Error, Result};
use crate::features::{InputPolygon, ParsedFeatures, SkippedFeature};
use crate::geom::{kernel, metrics, Shape};
use crate::merge::merge_cancellable;
use crate::project::Projection;
use crate::split::{split_cancellable, SplitOutcome};

use super::types::{PipelineCfg, RunDiagnostics};

#[derive(Clone, Debug, PartialEq)]
pub struct PipelineOutput {
    /// Output shapes in input coordinates.
    pub shapes: Vec<Shape>,
    pub diagnostics: RunDiagnostics,
}

pub struct Pipeline<P> {
    cfg: PipelineCfg,
    projection: P,
    cancel: CancelFlag,
}

impl<P: Projection> Pipeline<P> {
    /// Rejects invalid configuration before any work is done.
    pub fn new(cfg: PipelineCfg, projection: P) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            projection,
            cancel: CancelFlag::new(),
        })
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cfg(&self) -> &PipelineCfg {
        &self.cfg
    }

    pub fn projection(&self) -> &P {
        &self.projection
    }

    pub fn run(&self, inputs: Vec<InputPolygon>) -> Result<PipelineOutput> {
        self.run_inner(inputs, Vec::new())
    }

    /// As `run`, carrying over features the reader already skipped.
    pub fn run_features(&self, parsed: ParsedFeatures) -> Result<PipelineOutput> {
        self.run_inner(parsed.polygons, parsed.skipped)
    }

    fn run_inner(
        &self,
        inputs: Vec<InputPolygon>,
        skipped: Vec<SkippedFeature>,
    ) -> Result<PipelineOutput> {
        let mut diag = RunDiagnostics {
            skipped,
            ..RunDiagnostics::default()
        };
        let notes: Vec<String> = diag
            .skipped
            .iter()
            .map(|s| {
                tracing::warn!(feature = s.feature_index, reason = %s.reason, "skipped feature");
                format!("feature {} skipped: {}", s.feature_index, s.reason)
            })
            .collect();
        for note in notes {
            diag.warn(note);
        }

        let planar = self.prepare(inputs, &mut diag);
        self.check_cancel()?;

        let components = self.disjoint(planar, &mut diag);
        diag.components = components.len();
        diag.input_area = components.iter().map(metrics::area).sum();

        let outcomes = self.split_all(components)?;
        let mut pieces = Vec::new();
        for outcome in outcomes {
            diag.split.absorb(&outcome.diag);
            pieces.extend(outcome.into_polygons());
        }
        if diag.split.non_conforming() > 0 {
            diag.warn(format!(
                "{} pieces over threshold (depth cap {}, degenerate {}, kernel fallback {})",
                diag.split.non_conforming(),
                diag.split.depth_capped,
                diag.split.degenerate,
                diag.split.kernel_fallbacks
            ));
        }
        if diag.split.discarded_slivers > 0 {
            diag.info(format!(
                "{} cut slivers dropped ({} units²)",
                diag.split.discarded_slivers, diag.split.discarded_area
            ));
        }

        let shapes = if self.cfg.merge.is_enabled() {
            let merged = merge_cancellable(pieces, &self.cfg.merge, &self.cancel)?;
            if !merged.report.complete {
                diag.warn(format!(
                    "merge stopped at iteration cap {}",
                    self.cfg.merge.max_iterations
                ));
            }
            if merged.report.unmerged_small > 0 {
                diag.info(format!(
                    "{} fragments below min_area left unmerged",
                    merged.report.unmerged_small
                ));
            }
            diag.merge = Some(merged.report);
            merged.fragments
        } else {
            pieces.into_iter().map(Shape::Single).collect()
        };
        diag.output_area = shapes.iter().map(Shape::area).sum();

        let shapes: Vec<Shape> = shapes
            .iter()
            .map(|s| self.projection.inverse_shape(s))
            .collect();

        tracing::info!(
            inputs = diag.components,
            outputs = shapes.len(),
            skipped = diag.skipped.len(),
            repaired = diag.repaired,
            non_conforming = diag.split.non_conforming(),
            input_area = diag.input_area,
            output_area = diag.output_area,
            "pipeline run finished"
        );
        Ok(PipelineOutput {
            shapes,
            diagnostics: diag,
        })
    }

    /// Repair, then project. Unrepairable inputs are recorded and dropped.
    fn prepare(&self, inputs: Vec<InputPolygon>, diag: &mut RunDiagnostics) -> Vec<Polygon<f64>> {
        let mut planar = Vec::with_capacity(inputs.len());
        for input in inputs {
            match kernel::repair(&input.polygon) {
                Ok((fixed, changed)) => {
                    if changed {
                        tracing::warn!(feature = input.feature_index, "repaired invalid polygon");
                        diag.repaired += 1;
                        diag.warn(format!("feature {} repaired", input.feature_index));
                    }
                    planar.extend(fixed.0.iter().map(|p| self.projection.forward_polygon(p)));
                }
                Err(err) => {
                    tracing::warn!(feature = input.feature_index, %err, "skipping polygon");
                    diag.warn(format!("feature {} skipped: {err}", input.feature_index));
                    diag.skipped.push(SkippedFeature {
                        feature_index: input.feature_index,
                        reason: err.to_string(),
                    });
                }
            }
        }
        planar
    }

    fn disjoint(&self, planar: Vec<Polygon<f64>>, diag: &mut RunDiagnostics) -> Vec<Polygon<f64>> {
        match kernel::union_all(&planar) {
            Ok(mp) => Shape::from_multi(mp).map_or_else(Vec::new, Shape::into_polygons),
            Err(err) => {
                tracing::warn!(%err, "union failed; splitting inputs as given");
                diag.union_fallback = true;
                diag.warn(format!("union failed ({err}); overlapping inputs split as given"));
                planar
            }
        }
    }

    fn split_all(&self, components: Vec<Polygon<f64>>) -> Result<Vec<SplitOutcome>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.cfg.workers.unwrap_or(0))
            .build()
            .map_err(|e| Error::WorkerPool(e.to_string()))?;
        let cfg = &self.cfg.split;
        let cancel = &self.cancel;
        pool.install(|| {
            components
                .into_par_iter()
                .enumerate()
                .map(|(i, p)| -> Result<SplitOutcome> {
                    let out = split_cancellable(p, cfg, cancel)?;
                    tracing::debug!(
                        component = i,
                        pieces = out.pieces.len(),
                        max_depth = out.diag.max_depth_reached,
                        "component split"
                    );
                    Ok(out)
                })
                .collect::<Result<Vec<_>>>()
        })
    }

    fn check_cancel(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}
