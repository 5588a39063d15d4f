use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// What produced an artifact: inputs, resolved parameters and a run summary.
#[derive(Debug, Serialize)]
pub struct Provenance {
    pub code_rev: String,
    pub tool_version: &'static str,
    pub callsite: Callsite,
    pub inputs: Vec<String>,
    pub params: Value,
    pub summary: Value,
    pub outputs: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct Callsite {
    pub file: &'static str,
    pub line: u32,
}

impl Provenance {
    #[track_caller]
    pub fn new(params: Value, summary: Value) -> Self {
        let loc = Location::caller();
        Self {
            code_rev: current_git_rev(),
            tool_version: areasplit::VERSION,
            callsite: Callsite {
                file: loc.file(),
                line: loc.line(),
            },
            inputs: Vec::new(),
            params,
            summary,
            outputs: Vec::new(),
        }
    }

    pub fn input(mut self, path: &Path) -> Self {
        self.inputs.push(path.to_string_lossy().into_owned());
        self
    }
}

/// Write `<stem>.provenance.json` next to `artifact`, listing it as the output.
pub fn write_sidecar(artifact: &Path, mut prov: Provenance) -> Result<PathBuf> {
    let path = sidecar_path(artifact);
    prov.outputs.push(artifact.to_string_lossy().into_owned());
    fs::write(&path, serde_json::to_vec_pretty(&prov)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn sidecar_path(artifact: &Path) -> PathBuf {
    let stem = artifact
        .file_stem()
        .map_or_else(|| "artifact".into(), |s| s.to_string_lossy().into_owned());
    artifact.with_file_name(format!("{stem}.provenance.json"))
}

/// `GIT_COMMIT` (build time, then run time), else `git rev-parse HEAD`, else "unknown".
pub fn current_git_rev() -> String {
    let from_env = option_env!("GIT_COMMIT")
        .map(str::to_string)
        .or_else(|| std::env::var("GIT_COMMIT").ok())
        .filter(|s| !s.is_empty());
    if let Some(rev) = from_env {
        return rev;
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
