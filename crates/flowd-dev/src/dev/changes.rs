//! Pending change set and change classification.
//!
//! The set collects every path reported by the watcher since the last
//! notification. After a rebuild it decides whether browsers can swap
//! stylesheets in place (`update`) or must reload the page (`reload`).

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Notification sent to connected browser tabs after a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReloadKind {
    /// Only stylesheets changed; clients re-fetch styles and keep the page.
    Update,
    /// Anything else changed; clients reload and reconnect.
    Reload,
}

impl ReloadKind {
    /// Event name on the wire (`event: update` / `event: reload`).
    pub fn as_str(self) -> &'static str {
        match self {
            ReloadKind::Update => "update",
            ReloadKind::Reload => "reload",
        }
    }

    /// A reload makes every open connection stale.
    pub fn invalidates_connections(self) -> bool {
        matches!(self, ReloadKind::Reload)
    }
}

impl fmt::Display for ReloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paths changed since the last notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    paths: BTreeSet<PathBuf>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a changed path. Returns `false` if it was already pending.
    pub fn record(&mut self, path: impl Into<PathBuf>) -> bool {
        self.paths.insert(path.into())
    }

    /// Move every path of `other` into this set.
    pub fn merge(&mut self, other: ChangeSet) {
        self.paths.extend(other.paths);
    }

    /// Take the current contents, leaving the set empty.
    pub fn take(&mut self) -> ChangeSet {
        std::mem::take(self)
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    /// Classify the set against the stylesheet extensions.
    ///
    /// An empty set (the initial build, or a rebuild whose paths were
    /// filtered out) is a reload.
    pub fn classify(&self, style_extensions: &[String]) -> ReloadKind {
        if self.is_empty() {
            return ReloadKind::Reload;
        }

        let style_only = self
            .iter()
            .all(|path| is_style_path(path, style_extensions));

        if style_only {
            ReloadKind::Update
        } else {
            ReloadKind::Reload
        }
    }
}

impl fmt::Display for ChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for path in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}", path.display())?;
            first = false;
        }
        Ok(())
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Whether `path` ends in one of `extensions` (each given with its dot).
///
/// Compared as a suffix of the file name, so `.module.css` style entries work
/// and `a.CSS` is not a stylesheet.
pub fn is_style_path(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };

    extensions.iter().any(|ext| name.ends_with(ext.as_str()))
}
