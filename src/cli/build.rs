//! `build` command and the single build pass shared with `watch`.
//!
//! A pass resolves the manifest, runs the incremental graph over every input
//! and writes the generated sources. Diagnostics are printed through the
//! logger and never fail the pass; manifest and write errors do.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use super::args::BuildArgs;
use crate::config::{
    Manifest, RawConfig, ResolvedManifest, find_manifest, init_manifest, keys, resolve_global,
};
use crate::diagnostic::LogSink;
use crate::emit::{self, EmitReport};
use crate::graph::IncrementalGraph;
use crate::input::{DiskFile, SharedFile};
use crate::{debug, log};

/// Outcome of one build pass.
#[derive(Debug, Clone, Default)]
pub struct BuildSummary {
    pub assets: usize,
    pub routes: usize,
    /// Artifacts that differ from the previous pass.
    pub changed: usize,
    pub removed: usize,
    pub diagnostics: usize,
    pub report: EmitReport,
    pub elapsed: Duration,
}

impl BuildSummary {
    /// Nothing new was written to disk.
    pub fn is_unchanged(&self) -> bool {
        self.report.written.is_empty() && self.report.removed.is_empty()
    }
}

impl fmt::Display for BuildSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {} changed",
            count(self.assets, "asset"),
            count(self.routes, "route"),
            self.changed
        )?;
        if self.removed > 0 {
            write!(f, ", {} removed", self.removed)?;
        }
        if self.diagnostics > 0 {
            write!(f, ", {}", count(self.diagnostics, "warning"))?;
        }
        write!(f, " in {}ms", self.elapsed.as_millis())
    }
}

fn count(n: usize, noun: &str) -> String {
    let suffix = if n == 1 { "" } else { "s" };
    format!("{n} {noun}{suffix}")
}

/// Run `embedkit build`.
pub fn run_build(config: &Path, args: &BuildArgs) -> Result<()> {
    let manifest = load_manifest(config)?;
    let graph = IncrementalGraph::new();
    let summary = build_once(&graph, &manifest, args)?;

    let out_dir = output_dir(&manifest, args);
    for path in &summary.report.written {
        log!("build"; "wrote {}", display_relative(path, &out_dir));
    }
    for path in &summary.report.removed {
        log!("build"; "removed {}", display_relative(path, &out_dir));
    }
    log!("build"; "{}", summary);
    Ok(())
}

/// Locate, parse and install the manifest.
pub fn load_manifest(path: &Path) -> Result<Arc<Manifest>> {
    let found = find_manifest(path)
        .with_context(|| format!("manifest `{}` not found", path.display()))?;
    let found = found.canonicalize().unwrap_or(found);
    let manifest = Manifest::load(&found)
        .with_context(|| format!("failed to load `{}`", found.display()))?;
    Ok(init_manifest(manifest))
}

/// One pass: resolve, build, emit.
pub fn build_once(
    graph: &IncrementalGraph,
    manifest: &Manifest,
    args: &BuildArgs,
) -> Result<BuildSummary> {
    let start = Instant::now();

    let ResolvedManifest { mut config, inputs } = manifest.resolve();
    apply_overrides(&mut config, args);
    let files: Vec<SharedFile> = inputs.into_iter().map(DiskFile::shared).collect();

    let output = graph.build_from_config(&config, &files, &LogSink);
    debug!("build"; "cache: {:?}", output.stats);
    let global = resolve_global(&config);

    let out_dir = output_dir(manifest, args);
    let report = emit::emit(&output, &global, &out_dir)
        .with_context(|| format!("failed to write sources to `{}`", out_dir.display()))?;

    Ok(BuildSummary {
        assets: output.artifacts.len(),
        routes: output.table.len(),
        changed: output.changed_count(),
        removed: output.removed.len(),
        diagnostics: output.diagnostics.len(),
        report,
        elapsed: start.elapsed(),
    })
}

/// Generated sources directory, honoring `--output`.
pub fn output_dir(manifest: &Manifest, args: &BuildArgs) -> PathBuf {
    match &args.output {
        Some(dir) => manifest.root_join(dir),
        None => manifest.output_dir(),
    }
}

/// Command-line flags win over `[build]` properties.
fn apply_overrides(config: &mut RawConfig, args: &BuildArgs) {
    if let Some(minify) = args.minify {
        config.set_global(keys::MINIFY, minify.to_string());
    }
    if let Some(routes) = args.routes {
        config.set_global(keys::ROUTES, routes.to_string());
    }
}

fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}
