//! Recursive source watcher for development mode.
//!
//! Forwards every relevant change as soon as notify reports it. Coalescing
//! happens downstream in the orchestrator's [`Debouncer`](crate::dev::Debouncer),
//! which needs each individual path to classify the rebuild.

use crate::error::{CliError, Result, ResultExt};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Component, Path, PathBuf};
use tokio::sync::mpsc;

/// Changes buffered between the notify thread and the orchestrator.
const CHANGE_BUFFER: usize = 256;

/// File change event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// File was modified
    Modified(PathBuf),
    /// File was created
    Created(PathBuf),
    /// File was removed
    Removed(PathBuf),
}

impl FileChange {
    /// Get the path affected by this change.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }

    pub fn into_path(self) -> PathBuf {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }

    /// Map one path of a notify event. Access and metadata-only events
    /// (permissions, timestamps) do not change bundle inputs.
    fn from_event(kind: &EventKind, path: &Path) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(FileChange::Created(path.to_path_buf())),
            EventKind::Modify(ModifyKind::Metadata(_)) => None,
            EventKind::Modify(_) => Some(FileChange::Modified(path.to_path_buf())),
            EventKind::Remove(_) => Some(FileChange::Removed(path.to_path_buf())),
            _ => None,
        }
    }
}

/// Recursive watcher over the source tree.
///
/// Dropping it stops watching and closes the change channel.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
}

impl FileWatcher {
    /// Start watching `root` recursively.
    ///
    /// # Arguments
    ///
    /// * `root` - Directory to watch
    /// * `ignore_patterns` - Path component names (`node_modules`) or
    ///   extension patterns (`*.swp`) to drop
    ///
    /// # Returns
    ///
    /// Tuple of (FileWatcher, receiver for change events)
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` if `root` doesn't exist, `Watch` if notify
    /// cannot set up the watch
    pub fn new(
        root: PathBuf,
        ignore_patterns: Vec<String>,
    ) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        if !root.is_dir() {
            return Err(CliError::FileNotFound(root));
        }
        // notify reports canonical paths on some platforms
        let root = root.canonicalize().with_path(&root)?;

        let (tx, rx) = mpsc::channel(CHANGE_BUFFER);
        let filter_root = root.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!("file watcher error: {}", e);
                    return;
                }
            };

            for path in &event.paths {
                if Self::should_ignore(path, &filter_root, &ignore_patterns) {
                    continue;
                }
                let Some(change) = FileChange::from_event(&event.kind, path) else {
                    continue;
                };

                tracing::trace!(?change, "file change");
                // Runs on notify's thread, so blocking is fine. A send error
                // means the orchestrator is gone.
                if tx.blocking_send(change).is_err() {
                    return;
                }
            }
        })?;

        watcher.watch(&root, RecursiveMode::Recursive)?;
        tracing::debug!("watching {}", root.display());

        Ok((
            Self {
                _watcher: watcher,
                root,
            },
            rx,
        ))
    }

    /// Whether a reported path is dropped before reaching the orchestrator.
    ///
    /// Paths outside `root`, paths with a hidden component, paths with a
    /// component equal to a plain pattern and file names ending in the
    /// suffix of a `*` pattern are ignored.
    pub fn should_ignore(path: &Path, root: &Path, ignore_patterns: &[String]) -> bool {
        let Ok(rel_path) = path.strip_prefix(root) else {
            return true;
        };

        let names: Vec<&str> = rel_path
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => name.to_str(),
                _ => None,
            })
            .collect();

        if names.iter().any(|name| name.starts_with('.')) {
            return true;
        }

        let file_name = names.last().copied().unwrap_or_default();

        ignore_patterns.iter().any(|pattern| match pattern.strip_prefix('*') {
            Some(suffix) => !suffix.is_empty() && file_name.ends_with(suffix),
            None => names.iter().any(|name| *name == pattern.as_str()),
        })
    }

    /// Get the root directory being watched.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
