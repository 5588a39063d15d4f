use anyhow::{Context, Result};
use areasplit::features::{read_feature_collection, to_feature_collection, ParsedFeatures};
use areasplit::merge::MergeCfg;
use areasplit::pipeline::{Pipeline, PipelineCfg, PipelineOutput};
use areasplit::project::{AffineProjection, CylindricalEqualArea, Projection};
use areasplit::split::SplitCfg;
use clap::{Args, Parser, Subcommand};
use geo::Area;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::EnvFilter;

mod provenance;

use provenance::{write_sidecar, Provenance};

const M2_PER_KM2: f64 = 1.0e6;
const M_PER_KM: f64 = 1.0e3;

#[derive(Parser)]
#[command(name = "areasplit")]
#[command(about = "Split polygons into pieces of bounded ground area")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Split (and optionally merge) a GeoJSON FeatureCollection
    Split(SplitArgs),
    /// Summarise an input collection, or print build provenance without one
    Report {
        #[arg(long)]
        input: Option<PathBuf>,
        /// Coordinates are already planar
        #[arg(long)]
        planar: bool,
        /// Metres per planar input unit
        #[arg(long, default_value_t = 1.0)]
        planar_scale: f64,
    },
}

#[derive(Args, Debug, Default)]
struct SplitArgs {
    #[arg(long)]
    input: PathBuf,
    #[arg(long)]
    out: PathBuf,
    /// JSON file with the same option names (snake_case); flags override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Target piece area [default: 5000]
    #[arg(long)]
    max_area_km2: Option<f64>,
    #[arg(long)]
    tolerance_pct: Option<f64>,
    #[arg(long)]
    max_depth: Option<u32>,
    /// Merge fragments below this area; 0 disables merging
    #[arg(long)]
    min_area_km2: Option<f64>,
    #[arg(long)]
    compactness: Option<f64>,
    #[arg(long)]
    island_merge: bool,
    #[arg(long)]
    island_max_distance_km: Option<f64>,
    #[arg(long)]
    workers: Option<usize>,
    /// Coordinates are already planar; skip the geographic projection
    #[arg(long)]
    planar: bool,
    /// Metres per planar input unit [default: 1]
    #[arg(long)]
    planar_scale: Option<f64>,
}

/// Resolved options; also the `--config` file format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct Settings {
    max_area_km2: f64,
    tolerance_pct: f64,
    max_depth: u32,
    min_area_km2: f64,
    compactness: f64,
    island_merge: bool,
    island_max_distance_km: Option<f64>,
    workers: Option<usize>,
    planar: bool,
    planar_scale: f64,
}

impl Default for Settings {
    fn default() -> Self {
        let split = SplitCfg::default();
        let merge = MergeCfg::default();
        Self {
            max_area_km2: 5000.0,
            tolerance_pct: split.tolerance_pct,
            max_depth: split.max_depth,
            min_area_km2: merge.min_area,
            compactness: merge.compactness_threshold,
            island_merge: merge.allow_island_merge,
            island_max_distance_km: None,
            workers: None,
            planar: false,
            planar_scale: 1.0,
        }
    }
}

impl Settings {
    fn resolve(args: &SplitArgs) -> Result<Self> {
        let mut s = match &args.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => Settings::default(),
        };
        if let Some(v) = args.max_area_km2 {
            s.max_area_km2 = v;
        }
        if let Some(v) = args.tolerance_pct {
            s.tolerance_pct = v;
        }
        if let Some(v) = args.max_depth {
            s.max_depth = v;
        }
        if let Some(v) = args.min_area_km2 {
            s.min_area_km2 = v;
        }
        if let Some(v) = args.compactness {
            s.compactness = v;
        }
        if args.island_merge {
            s.island_merge = true;
        }
        if let Some(v) = args.island_max_distance_km {
            s.island_max_distance_km = Some(v);
        }
        if let Some(v) = args.workers {
            s.workers = Some(v);
        }
        if args.planar {
            s.planar = true;
        }
        if let Some(v) = args.planar_scale {
            s.planar_scale = v;
        }
        Ok(s)
    }

    /// Both projections land in metres, so km options convert the same way.
    fn pipeline_cfg(&self) -> PipelineCfg {
        let max_area = self.max_area_km2 * M2_PER_KM2;
        PipelineCfg {
            split: SplitCfg {
                max_area,
                tolerance_pct: self.tolerance_pct,
                max_depth: self.max_depth,
                min_fragment_area: max_area * 1e-9,
            },
            merge: MergeCfg {
                min_area: self.min_area_km2 * M2_PER_KM2,
                compactness_threshold: self.compactness,
                allow_island_merge: self.island_merge,
                island_max_distance: self.island_max_distance_km.map(|d| d * M_PER_KM),
                ..MergeCfg::default()
            },
            workers: self.workers,
        }
    }

    /// Input units → metres for `--planar` inputs.
    fn planar_projection(&self) -> Result<AffineProjection> {
        planar_projection(self.planar_scale)
    }
}

fn planar_projection(scale: f64) -> Result<AffineProjection> {
    anyhow::ensure!(
        scale.is_finite() && scale > 0.0,
        "planar_scale must be finite and > 0 (got {scale})"
    );
    AffineProjection::scale(scale).context("planar_scale gives a singular map")
}

fn main() -> Result<()> {
    SubscriberBuilder::default()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Split(args) => split(&args).map(|_| ()),
        Action::Report {
            input,
            planar,
            planar_scale,
        } => report(input.as_deref(), planar.then_some(planar_scale)),
    }
}

fn read_input(path: &Path) -> Result<ParsedFeatures> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading input {}", path.display()))?;
    read_feature_collection(&text).with_context(|| format!("parsing {}", path.display()))
}

fn execute<P: Projection>(
    cfg: PipelineCfg,
    projection: P,
    parsed: ParsedFeatures,
) -> Result<PipelineOutput> {
    let pipeline = Pipeline::new(cfg, projection).context("invalid configuration")?;
    Ok(pipeline.run_features(parsed)?)
}

fn split(args: &SplitArgs) -> Result<PipelineOutput> {
    let settings = Settings::resolve(args)?;
    let cfg = settings.pipeline_cfg();
    cfg.validate().context("invalid configuration")?;
    let planar = if settings.planar {
        Some(settings.planar_projection()?)
    } else {
        None
    };
    tracing::info!(
        input = %args.input.display(),
        out = %args.out.display(),
        max_area = cfg.split.max_area,
        min_area = cfg.merge.min_area,
        planar = settings.planar,
        "split"
    );
    let parsed = read_input(&args.input)?;
    let output = match planar {
        Some(projection) => execute(cfg, projection, parsed)?,
        None => execute(cfg, CylindricalEqualArea::default(), parsed)?,
    };

    if let Some(parent) = args.out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    let fc = to_feature_collection(&output.shapes)?;
    fs::write(&args.out, serde_json::to_vec(&fc)?)
        .with_context(|| format!("writing {}", args.out.display()))?;

    let prov = Provenance::new(
        serde_json::json!({ "settings": settings, "pipeline": cfg }),
        serde_json::to_value(&output.diagnostics)?,
    )
    .input(&args.input);
    let sidecar = write_sidecar(&args.out, prov)?;
    tracing::info!(
        pieces = output.shapes.len(),
        warnings = output.diagnostics.warnings().count(),
        sidecar = %sidecar.display(),
        "wrote output"
    );
    Ok(output)
}

#[derive(Debug, Serialize)]
struct InputSummary {
    polygons: usize,
    skipped: usize,
    features_with_polygons: usize,
    total_area_km2: f64,
    largest_polygon_area_km2: f64,
}

/// `planar_scale` is metres per input unit; `None` means lon/lat input.
fn summarize(parsed: &ParsedFeatures, planar_scale: Option<f64>) -> InputSummary {
    let projection = CylindricalEqualArea::default();
    let areas: Vec<f64> = parsed
        .polygons
        .iter()
        .map(|p| match planar_scale {
            Some(scale) => p.polygon.unsigned_area() * scale * scale / M2_PER_KM2,
            None => projection.forward_polygon(&p.polygon).unsigned_area() / M2_PER_KM2,
        })
        .collect();
    let mut features: Vec<usize> = parsed.polygons.iter().map(|p| p.feature_index).collect();
    features.dedup();
    InputSummary {
        polygons: parsed.polygons.len(),
        skipped: parsed.skipped.len(),
        features_with_polygons: features.len(),
        total_area_km2: areas.iter().sum(),
        largest_polygon_area_km2: areas.iter().copied().fold(0.0, f64::max),
    }
}

fn report(input: Option<&Path>, planar_scale: Option<f64>) -> Result<()> {
    if let Some(scale) = planar_scale {
        planar_projection(scale)?;
    }
    let summary = match input {
        Some(path) => serde_json::to_value(summarize(&read_input(path)?, planar_scale))?,
        None => serde_json::Value::Null,
    };
    let obj = serde_json::json!({
        "code_rev": provenance::current_git_rev(),
        "tool_version": areasplit::VERSION,
        "input": input.map(|p| p.to_string_lossy().into_owned()),
        "summary": summary,
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::tempdir;

    const SQUARE_10K_KM2: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {},
         "geometry": {"type": "Polygon",
                      "coordinates": [[[0,0],[100000,0],[100000,100000],[0,100000],[0,0]]]}},
        {"type": "Feature", "properties": {}, "geometry": null}
    ]}"#;

    fn planar_args(dir: &Path) -> SplitArgs {
        let input = dir.join("in.geojson");
        fs::write(&input, SQUARE_10K_KM2).unwrap();
        SplitArgs {
            input,
            out: dir.join("out").join("pieces.geojson"),
            max_area_km2: Some(5_000.0),
            planar: true,
            ..SplitArgs::default()
        }
    }

    #[test]
    fn split_writes_output_and_sidecar() {
        let dir = tempdir().unwrap();
        let args = planar_args(dir.path());
        let out = split(&args).unwrap();
        assert_eq!(out.shapes.len(), 2);
        assert_eq!(out.diagnostics.skipped.len(), 1);

        let written = read_feature_collection(&fs::read_to_string(&args.out).unwrap()).unwrap();
        assert_eq!(written.polygons.len(), 2);
        let sidecar = dir.path().join("out").join("pieces.provenance.json");
        let prov: Value = serde_json::from_slice(&fs::read(sidecar).unwrap()).unwrap();
        assert_eq!(prov["params"]["settings"]["max_area_km2"], 5_000.0);
        assert_eq!(prov["params"]["pipeline"]["split"]["max_area"], 5.0e9);
        assert_eq!(prov["summary"]["components"], 1);
        assert_eq!(prov["summary"]["skipped"][0]["feature_index"], 1);
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("cfg.json");
        fs::write(&cfg_path, r#"{"max_area_km2": 100.0, "min_area_km2": 2.0, "workers": 3}"#)
            .unwrap();
        let args = SplitArgs {
            config: Some(cfg_path),
            max_area_km2: Some(250.0),
            ..SplitArgs::default()
        };
        let s = Settings::resolve(&args).unwrap();
        assert_eq!(s.max_area_km2, 250.0);
        assert_eq!(s.min_area_km2, 2.0);
        assert_eq!(s.workers, Some(3));
        assert_eq!(s.tolerance_pct, SplitCfg::default().tolerance_pct);

        let cfg = s.pipeline_cfg();
        assert_eq!(cfg.split.max_area, 250.0e6);
        assert_eq!(cfg.merge.min_area, 2.0e6);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn invalid_settings_fail_before_reading_geometry() {
        let dir = tempdir().unwrap();
        let args = SplitArgs {
            max_area_km2: Some(-1.0),
            ..planar_args(dir.path())
        };
        let err = split(&args).unwrap_err();
        assert!(format!("{err:#}").contains("max_area"));
        assert!(!args.out.exists());
    }

    #[test]
    fn planar_scale_keeps_km2_meaning() {
        // Same 10 000 km² square given in kilometres.
        let dir = tempdir().unwrap();
        let input = dir.path().join("km.geojson");
        fs::write(&input, SQUARE_10K_KM2.replace("100000", "100")).unwrap();
        let args = SplitArgs {
            input,
            out: dir.path().join("km_pieces.geojson"),
            max_area_km2: Some(5_000.0),
            planar: true,
            planar_scale: Some(1_000.0),
            ..SplitArgs::default()
        };
        let out = split(&args).unwrap();
        assert_eq!(out.shapes.len(), 2);
        // Output stays in input units.
        let max_x = out
            .shapes
            .iter()
            .filter_map(|s| s.bounds())
            .map(|b| b.max.x)
            .fold(f64::MIN, f64::max);
        assert!((max_x - 100.0).abs() < 1e-6);
        let total: f64 = out.shapes.iter().map(|s| s.area()).sum();
        assert!((total - 1.0e4).abs() < 1e-6 * 1.0e4);
    }

    #[test]
    fn non_positive_planar_scale_is_rejected() {
        let dir = tempdir().unwrap();
        for bad in [0.0, -2.0, f64::NAN] {
            let args = SplitArgs {
                planar_scale: Some(bad),
                ..planar_args(dir.path())
            };
            let err = split(&args).unwrap_err();
            assert!(format!("{err:#}").contains("planar_scale"));
            assert!(!args.out.exists());
        }
        assert!(report(None, Some(0.0)).is_err());
    }

    #[test]
    fn summary_counts_features() {
        let parsed = read_feature_collection(SQUARE_10K_KM2).unwrap();
        let s = summarize(&parsed, Some(1.0));
        assert_eq!(s.polygons, 1);
        assert_eq!(s.skipped, 1);
        assert_eq!(s.features_with_polygons, 1);
        assert!((s.total_area_km2 - 1.0e4).abs() < 1e-9);
        // Same square in kilometres.
        let km = read_feature_collection(&SQUARE_10K_KM2.replace("100000", "100")).unwrap();
        let s = summarize(&km, Some(1_000.0));
        assert!((s.total_area_km2 - 1.0e4).abs() < 1e-6);
    }
}
