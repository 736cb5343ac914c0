//! Incremental build graph.
//!
//! ```text
//! FileOptions + content hash + GlobalOptions ──► FileArtifact     (per file)
//! FileArtifact + default cache-control       ──► RouteDescriptor  (per file)
//! [RouteDescriptor]                          ──► RouteTable       (barrier)
//! ```
//!
//! Every edge is memoized on the value of its inputs, so a file whose bytes
//! and options are unchanged is never transformed again, and an unchanged
//! descriptor list reuses the previous table. Artifacts also remember the
//! hashes of the templates they inlined; editing an include invalidates
//! every file that pulled it in.
//!
//! One graph instance lives across builds (watch mode). Cache entries not
//! used by a build are evicted when it finishes.

mod memo;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::config::{ConfigView, FileOptions, GlobalOptions, resolve_file, resolve_global};
use crate::debug;
use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::freshness::{ContentHash, IncludeHashes};
use crate::input::SharedFile;
use crate::route::{self, RouteDescriptor, RouteError, RouteTable};
use crate::transform::{FileArtifact, read_source, transform, unix_now};
use crate::utils::path::relative_path;

use memo::Memo;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ArtifactKey {
    options: FileOptions,
    content: ContentHash,
    global: GlobalOptions,
}

/// Cached transform result plus the include hashes it was built from.
#[derive(Debug)]
struct ArtifactEntry {
    result: Result<FileArtifact, Diagnostic>,
    includes: Vec<(PathBuf, ContentHash)>,
}

impl ArtifactEntry {
    fn compute(
        options: &FileOptions,
        global: &GlobalOptions,
        bytes: &[u8],
        relative: &str,
        now: u64,
        hashes: &IncludeHashes,
    ) -> Self {
        match transform(options, global, bytes, now) {
            Ok(transformed) => {
                let mut includes: Vec<_> = transformed
                    .includes
                    .into_iter()
                    .map(|path| {
                        let hash = hashes.hash(&path);
                        (path, hash)
                    })
                    .collect();
                includes.sort_by(|a, b| a.0.cmp(&b.0));
                includes.dedup_by(|a, b| a.0 == b.0);
                Self {
                    result: Ok(transformed.artifact),
                    includes,
                }
            }
            Err(err) => Self {
                result: Err(Diagnostic::file_processing(relative, &err)),
                includes: Vec::new(),
            },
        }
    }

    /// Failures are never reused; successes only while includes match.
    fn is_fresh(&self, hashes: &IncludeHashes) -> bool {
        self.result.is_ok() && hashes.all_match(&self.includes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RouteKey {
    artifact: FileArtifact,
    default_cache_control: Option<String>,
}

type TableEntry = Arc<(RouteTable, Vec<RouteError>)>;

/// Per-stage cache accounting for one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub artifacts_computed: usize,
    pub artifacts_reused: usize,
    pub routes_computed: usize,
    pub routes_reused: usize,
    pub table_computed: bool,
    /// Cache entries dropped after the build.
    pub evicted: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactOutput {
    pub artifact: FileArtifact,
    /// Differs from the previous build's artifact for the same file.
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOutput {
    pub route: RouteDescriptor,
    pub changed: bool,
}

/// Everything one build produced, in input order.
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub artifacts: Vec<ArtifactOutput>,
    /// Empty when routes are disabled.
    pub routes: Vec<RouteOutput>,
    pub table: RouteTable,
    pub table_changed: bool,
    /// Global options differ from the previous build.
    pub globals_changed: bool,
    /// Relative paths that had an artifact last build but not this one.
    pub removed: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: BuildStats,
}

impl BuildOutput {
    /// Whether anything an emitter would write differs from last build.
    pub fn has_changes(&self) -> bool {
        self.table_changed
            || self.globals_changed
            || !self.removed.is_empty()
            || self.artifacts.iter().any(|a| a.changed)
            || self.routes.iter().any(|r| r.changed)
    }

    pub fn changed_count(&self) -> usize {
        self.artifacts.iter().filter(|a| a.changed).count()
    }
}

/// Outputs of the last build, keyed by source path.
#[derive(Default)]
struct Previous {
    artifacts: FxHashMap<PathBuf, FileArtifact>,
    routes: FxHashMap<PathBuf, RouteDescriptor>,
    table: Option<RouteTable>,
    global: Option<GlobalOptions>,
}

/// Memoizing pipeline driver, reused across builds.
pub struct IncrementalGraph {
    generation: AtomicU64,
    artifacts: Memo<ArtifactKey, Arc<ArtifactEntry>>,
    routes: Memo<RouteKey, Result<RouteDescriptor, RouteError>>,
    tables: Memo<Vec<RouteDescriptor>, TableEntry>,
    previous: Mutex<Previous>,
}

impl IncrementalGraph {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            artifacts: Memo::new(),
            routes: Memo::new(),
            tables: Memo::new(),
            previous: Mutex::new(Previous::default()),
        }
    }

    /// Resolve options from `view` and build every file that has a class.
    pub fn build_from_config(
        &self,
        view: &impl ConfigView,
        files: &[SharedFile],
        sink: &dyn DiagnosticSink,
    ) -> BuildOutput {
        let global = resolve_global(view);
        let options: Vec<FileOptions> = files
            .iter()
            .map(|file| resolve_file(view, Arc::clone(file)))
            .collect();
        self.build(&options, &global, sink)
    }

    /// Build with the current time as the token timestamp.
    pub fn build(
        &self,
        files: &[FileOptions],
        global: &GlobalOptions,
        sink: &dyn DiagnosticSink,
    ) -> BuildOutput {
        self.build_at(files, global, unix_now(), sink)
    }

    /// Build with an explicit timestamp. Files without a class are skipped.
    ///
    /// The timestamp only reaches files that are (re)transformed; reused
    /// artifacts keep the value from the build that produced them.
    pub fn build_at(
        &self,
        files: &[FileOptions],
        global: &GlobalOptions,
        now: u64,
        sink: &dyn DiagnosticSink,
    ) -> BuildOutput {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let hashes = IncludeHashes::new();
        let counters = Counters::default();
        let included: Vec<&FileOptions> = files.iter().filter(|o| o.is_included()).collect();

        // Stage 1: artifacts
        let artifact_results: Vec<(PathBuf, Result<FileArtifact, Diagnostic>)> = included
            .par_iter()
            .map(|options| {
                let path = options.file.path().to_path_buf();
                let result = self.artifact(options, global, now, generation, &hashes, &counters);
                (path, result)
            })
            .collect();

        let mut diagnostics = Vec::new();
        let mut artifacts: Vec<(PathBuf, FileArtifact)> = Vec::with_capacity(artifact_results.len());
        for (path, result) in artifact_results {
            match result {
                Ok(artifact) => artifacts.push((path, artifact)),
                Err(diagnostic) => diagnostics.push(diagnostic),
            }
        }

        // Stage 2: routes, then the table barrier
        let mut routes: Vec<(PathBuf, RouteDescriptor)> = Vec::new();
        let mut table = RouteTable::default();
        let mut table_computed = false;
        if global.routes {
            let default_cc = global.cache_control.as_deref();
            let route_results: Vec<_> = artifacts
                .par_iter()
                .map(|(path, artifact)| {
                    let key = RouteKey {
                        artifact: artifact.clone(),
                        default_cache_control: default_cc.map(str::to_string),
                    };
                    let (result, computed) = self.routes.get_or_compute(key, generation, || {
                        route::derive(artifact, default_cc)
                    });
                    counters.route(computed);
                    (path.clone(), result)
                })
                .collect();

            for (path, result) in route_results {
                match result {
                    Ok(route) => routes.push((path, route)),
                    Err(err) => diagnostics.push(Diagnostic::route_generation(&err)),
                }
            }

            let descriptors: Vec<RouteDescriptor> = routes.iter().map(|(_, r)| r.clone()).collect();
            let (entry, computed) = self.tables.get_or_compute(descriptors.clone(), generation, || {
                Arc::new(RouteTable::build(descriptors))
            });
            table_computed = computed;
            table = entry.0.clone();
            diagnostics.extend(entry.1.iter().map(Diagnostic::route_generation));
        }

        let evicted = self.artifacts.sweep(generation)
            + self.routes.sweep(generation)
            + self.tables.sweep(generation);

        for diagnostic in &diagnostics {
            sink.report(diagnostic.clone());
        }

        let stats = BuildStats {
            artifacts_computed: counters.artifacts_computed.load(Ordering::Relaxed),
            artifacts_reused: counters.artifacts_reused.load(Ordering::Relaxed),
            routes_computed: counters.routes_computed.load(Ordering::Relaxed),
            routes_reused: counters.routes_reused.load(Ordering::Relaxed),
            table_computed,
            evicted,
        };
        debug!("graph"; "build #{}: {} diagnostic(s)", generation, diagnostics.len());

        self.diff_with_previous(artifacts, routes, table, global, diagnostics, stats)
    }

    fn artifact(
        &self,
        options: &FileOptions,
        global: &GlobalOptions,
        now: u64,
        generation: u64,
        hashes: &IncludeHashes,
        counters: &Counters,
    ) -> Result<FileArtifact, Diagnostic> {
        let path = options.file.path();
        let relative = relative_path(path, global.project_dir.as_deref());

        let bytes = read_source(options.file.as_ref())
            .map_err(|err| Diagnostic::file_processing(relative.as_str(), &err))?;

        let key = ArtifactKey {
            options: options.clone(),
            content: ContentHash::of(&bytes),
            global: global.clone(),
        };
        let (entry, computed) = self.artifacts.get_or_compute_if(
            key,
            generation,
            |entry| entry.is_fresh(hashes),
            || Arc::new(ArtifactEntry::compute(options, global, &bytes, &relative, now, hashes)),
        );
        counters.artifact(computed);
        entry.result.clone()
    }

    fn diff_with_previous(
        &self,
        artifacts: Vec<(PathBuf, FileArtifact)>,
        routes: Vec<(PathBuf, RouteDescriptor)>,
        table: RouteTable,
        global: &GlobalOptions,
        diagnostics: Vec<Diagnostic>,
        stats: BuildStats,
    ) -> BuildOutput {
        let mut previous = self.previous.lock();

        let artifact_outputs = artifacts
            .iter()
            .map(|(path, artifact)| ArtifactOutput {
                changed: previous.artifacts.get(path) != Some(artifact),
                artifact: artifact.clone(),
            })
            .collect();
        let route_outputs = routes
            .iter()
            .map(|(path, route)| RouteOutput {
                changed: previous.routes.get(path) != Some(route),
                route: route.clone(),
            })
            .collect();

        let mut removed: Vec<String> = previous
            .artifacts
            .iter()
            .filter(|(path, _)| !artifacts.iter().any(|(p, _)| p == *path))
            .map(|(path, _)| relative_path(path, global.project_dir.as_deref()))
            .collect();
        removed.sort();

        let table_changed = previous.table.as_ref() != Some(&table);
        let globals_changed = previous.global.as_ref() != Some(global);

        *previous = Previous {
            artifacts: artifacts.into_iter().collect(),
            routes: routes.into_iter().collect(),
            table: Some(table.clone()),
            global: Some(global.clone()),
        };

        BuildOutput {
            artifacts: artifact_outputs,
            routes: route_outputs,
            table,
            table_changed,
            globals_changed,
            removed,
            diagnostics,
            stats,
        }
    }
}

impl Default for IncrementalGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct Counters {
    artifacts_computed: AtomicUsize,
    artifacts_reused: AtomicUsize,
    routes_computed: AtomicUsize,
    routes_reused: AtomicUsize,
}

impl Counters {
    fn artifact(&self, computed: bool) {
        let counter = if computed {
            &self.artifacts_computed
        } else {
            &self.artifacts_reused
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn route(&self, computed: bool) {
        let counter = if computed {
            &self.routes_computed
        } else {
            &self.routes_reused
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}
