//! `watch` command: rebuild whenever inputs or the manifest change.
//!
//! One [`IncrementalGraph`] lives for the whole session, so each rebuild only
//! recomputes what the edited files affect. Events from the generated
//! sources directory are ignored, otherwise every write would trigger
//! another pass.

mod debouncer;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam::channel::{self, RecvTimeoutError};
use notify::{RecursiveMode, Watcher};

use super::args::BuildArgs;
use super::build::{BuildSummary, build_once, load_manifest, output_dir};
use crate::config::{self, Manifest, reload_manifest};
use crate::core::is_shutdown;
use crate::graph::IncrementalGraph;
use crate::logger::{status_error, status_success, status_unchanged, status_warning};
use crate::{debug, log};
use debouncer::{Changes, Debouncer, normalize};

/// Upper bound on one blocking wait, so Ctrl+C is noticed promptly.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

type Targets = Vec<(PathBuf, RecursiveMode)>;

/// Run `embedkit watch` until Ctrl+C.
pub fn run_watch(config_path: &Path, args: &BuildArgs) -> Result<()> {
    let mut manifest = load_manifest(config_path)?;
    let graph = IncrementalGraph::new();
    report(build_once(&graph, &manifest, args));

    let (tx, rx) = channel::unbounded();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        let _ = tx.send(res);
    })
    .context("failed to create file watcher")?;

    let mut targets = attach(&mut watcher, &[], watch_targets(&manifest));
    log!("watch"; "watching {} path(s), press Ctrl+C to stop", targets.len());

    let mut debouncer = Debouncer::new();
    while !is_shutdown() {
        match rx.recv_timeout(debouncer.sleep_duration().min(POLL_INTERVAL)) {
            Ok(Ok(event)) => debouncer.add_event(&event),
            Ok(Err(e)) => log!("watch"; "watcher error: {}", e),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        let Some(changes) = debouncer.take_if_ready() else {
            continue;
        };
        let changes = relevant(changes, &normalize(&output_dir(&manifest, args)));
        if changes.is_empty() {
            continue;
        }

        if changes.contains_key(&manifest.manifest_path) {
            match reload_manifest() {
                Ok(true) => {
                    manifest = config::manifest();
                    log!("watch"; "manifest reloaded");
                    targets = attach(&mut watcher, &targets, watch_targets(&manifest));
                }
                Ok(false) => {}
                Err(e) => {
                    status_error("manifest error", &format!("{:#}", anyhow::Error::from(e)));
                    continue;
                }
            }
        }

        report(build_once(&graph, &manifest, args));
    }

    Ok(())
}

/// Drop events for files under the generated sources directory.
fn relevant(changes: Changes, out_dir: &Path) -> Changes {
    changes
        .into_iter()
        .filter(|(path, _)| !path.starts_with(out_dir))
        .collect()
}

/// Watch roots from the manifest plus the manifest's own directory.
///
/// The directory (not the file) is watched so editors that save by
/// renaming a temp file over the manifest are still seen.
fn watch_targets(manifest: &Arc<Manifest>) -> Targets {
    let mut targets: Targets = manifest
        .watch_roots()
        .into_iter()
        .filter(|root| root.is_dir())
        .map(|root| (normalize(&root), RecursiveMode::Recursive))
        .collect();

    if let Some(dir) = manifest.manifest_path.parent().map(normalize)
        && !targets.iter().any(|(root, _)| dir.starts_with(root))
    {
        targets.push((dir, RecursiveMode::NonRecursive));
    }
    targets
}

/// Move the watcher from `old` to `new`. Returns what is actually watched.
fn attach(watcher: &mut impl Watcher, old: &[(PathBuf, RecursiveMode)], new: Targets) -> Targets {
    for target in old.iter().filter(|t| !new.contains(t)) {
        if let Err(e) = watcher.unwatch(&target.0) {
            debug!("watch"; "unwatch {}: {}", target.0.display(), e);
        }
    }

    new.into_iter()
        .filter(|target| {
            if old.contains(target) {
                return true;
            }
            match watcher.watch(&target.0, target.1) {
                Ok(()) => true,
                Err(e) => {
                    log!("watch"; "cannot watch {}: {}", target.0.display(), e);
                    false
                }
            }
        })
        .collect()
}

fn report(result: Result<BuildSummary>) {
    match result {
        Ok(summary) if summary.diagnostics > 0 => status_warning(&summary.to_string()),
        Ok(summary) if summary.is_unchanged() => status_unchanged(&summary.to_string()),
        Ok(summary) => status_success(&summary.to_string()),
        Err(e) => status_error("build failed", &format!("{e:#}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::debouncer::ChangeKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_relevant_skips_output_dir() {
        let mut changes = Changes::default();
        changes.insert(PathBuf::from("/p/www/a.css"), ChangeKind::Modified);
        changes.insert(PathBuf::from("/p/generated/assets.rs"), ChangeKind::Modified);

        let kept = relevant(changes, Path::new("/p/generated"));
        assert_eq!(kept.len(), 1);
        assert!(kept.contains_key(Path::new("/p/www/a.css")));
    }

    #[test]
    fn test_watch_targets() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("www")).unwrap();
        let path = dir.path().join("embedkit.toml");
        fs::write(&path, "[[dirs]]\ndir = \"www\"\n\n[[dirs]]\ndir = \"missing\"\n").unwrap();
        let manifest = Arc::new(Manifest::load(&path).unwrap());

        let targets = watch_targets(&manifest);
        let root = dir.path().canonicalize().unwrap();
        assert_eq!(
            targets,
            vec![
                (root.join("www"), RecursiveMode::Recursive),
                (root, RecursiveMode::NonRecursive),
            ]
        );
    }
}
