//! Coalesces bursts of filesystem events into one rebuild.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::EventKind;
use notify::event::ModifyKind;
use rustc_hash::FxHashMap;

use crate::debug;

/// Quiet period after the last event before a rebuild starts.
pub(super) const DEBOUNCE_MS: u64 = 300;
/// Minimum gap between two rebuilds.
pub(super) const REBUILD_COOLDOWN_MS: u64 = 800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub(super) fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

pub(super) type Changes = FxHashMap<PathBuf, ChangeKind>;

pub(super) struct Debouncer {
    pub(super) changes: Changes,
    last_event: Option<Instant>,
    last_build: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            changes: FxHashMap::default(),
            last_event: None,
            last_build: None,
        }
    }

    /// Record one notify event.
    ///
    /// Per path: a removal followed by a write keeps the write, a write
    /// followed by a removal keeps the removal, and a file created and
    /// removed inside one window is dropped. Otherwise the first kind wins.
    pub(super) fn add_event(&mut self, event: &notify::Event) {
        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Remove(_) => ChangeKind::Removed,
            // chmod/mtime noise; our own writes would otherwise retrigger us
            EventKind::Modify(ModifyKind::Metadata(_)) => return,
            EventKind::Modify(_) => ChangeKind::Modified,
            _ => return,
        };

        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }
            let path = normalize(path);

            match self.changes.get(&path).copied() {
                None => {
                    debug!("watch"; "{}: {}", kind.label(), path.display());
                    self.changes.insert(path, kind);
                }
                Some(ChangeKind::Removed) if kind != ChangeKind::Removed => {
                    self.changes.insert(path, kind);
                }
                Some(ChangeKind::Modified) if kind == ChangeKind::Removed => {
                    self.changes.insert(path, ChangeKind::Removed);
                }
                Some(ChangeKind::Created) if kind == ChangeKind::Removed => {
                    self.changes.remove(&path);
                }
                Some(_) => {}
            }
            self.last_event = Some(Instant::now());
        }
    }

    /// Drain the pending changes once the window and cooldown have passed.
    pub(super) fn take_if_ready(&mut self) -> Option<Changes> {
        if !self.is_ready() {
            return None;
        }
        self.last_event = None;
        self.last_build = Some(Instant::now());
        Some(std::mem::take(&mut self.changes))
    }

    pub(super) fn is_ready(&self) -> bool {
        let Some(last_event) = self.last_event else {
            return false;
        };
        if last_event.elapsed() < Duration::from_millis(DEBOUNCE_MS) {
            return false;
        }
        if let Some(last_build) = self.last_build
            && last_build.elapsed() < Duration::from_millis(REBUILD_COOLDOWN_MS)
        {
            return false;
        }
        !self.changes.is_empty()
    }

    /// How long the watch loop may block before the next readiness check.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return Duration::from_secs(86400);
        };

        let debounce = Duration::from_millis(DEBOUNCE_MS).saturating_sub(last_event.elapsed());
        let cooldown = self
            .last_build
            .map(|t| Duration::from_millis(REBUILD_COOLDOWN_MS).saturating_sub(t.elapsed()))
            .unwrap_or(Duration::ZERO);

        debounce.max(cooldown).max(Duration::from_millis(1))
    }

    #[cfg(test)]
    fn backdate(&mut self, by: Duration) {
        self.last_event = self.last_event.map(|t| t - by);
        self.last_build = self.last_build.map(|t| t - by);
    }
}

/// Editor swap and backup files.
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bak" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with(".#")
}

/// Canonical form of `path`, also for files that no longer exist.
pub(super) fn normalize(path: &Path) -> PathBuf {
    if let Ok(path) = path.canonicalize() {
        return path;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map(|p| p.join(name))
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    }
}
