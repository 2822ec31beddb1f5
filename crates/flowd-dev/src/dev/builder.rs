//! Build invocation for development mode.
//!
//! The orchestrator only sees the [`BuildContext`] trait: one persistent
//! handle that can be rebuilt and cancelled. [`BundlerContext`] is the real
//! implementation. It runs the configured bundler executable with arguments
//! rendered from the [`BuildSpec`] and then applies the asset copy rules.

use crate::config::{BuildSpec, CopyRule};
use crate::error::BuildError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::process::Command;
use tokio::task::JoinHandle;
use walkdir::WalkDir;

/// Outcome of a successful build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Wall time of bundling plus asset copy
    pub duration_ms: u64,
    /// Number of files copied by the copy rules
    pub copied: usize,
}

/// A persistent, rebuildable bundler handle.
///
/// Exactly one context exists per dev session. A rebuild future may be
/// dropped at any await point; implementations must leave the context usable
/// for the next rebuild when that happens. [`cancel`](Self::cancel) is called
/// after such a drop so the context can release whatever the aborted build
/// still holds.
#[async_trait]
pub trait BuildContext: Send + 'static {
    async fn rebuild(&mut self) -> Result<BuildReport, BuildError>;

    async fn cancel(&mut self) {}
}

/// Asset copy running on the blocking pool, with the flag that stops it.
#[derive(Debug)]
struct CopyTask {
    abort: Arc<AtomicBool>,
    handle: JoinHandle<Result<usize, BuildError>>,
}

impl CopyTask {
    /// Stop the copy at the next file and wait until it has stopped writing.
    async fn abort(self) {
        self.abort.store(true, Ordering::SeqCst);
        if let Err(e) = self.handle.await {
            tracing::warn!("asset copy task failed: {}", e);
        }
    }
}

/// Runs an external bundler (esbuild by default) as a child process.
#[derive(Debug)]
pub struct BundlerContext {
    root: PathBuf,
    spec: BuildSpec,
    /// Copy left behind by a rebuild that was dropped mid-copy
    copy: Option<CopyTask>,
}

impl BundlerContext {
    /// Create a bundler context.
    ///
    /// # Arguments
    ///
    /// * `root` - Project root; the bundler runs there and relative paths in
    ///   `spec` resolve against it
    /// * `spec` - Build description
    pub fn new(root: impl Into<PathBuf>, spec: BuildSpec) -> Self {
        Self {
            root: root.into(),
            spec,
            copy: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn spec(&self) -> &BuildSpec {
        &self.spec
    }

    /// Command line passed to the bundler, without the program name.
    pub fn args(&self) -> Vec<String> {
        bundler_args(&self.spec)
    }

    async fn run_bundler(&self) -> Result<(), BuildError> {
        let program = &self.spec.bundler;
        let args = self.args();
        tracing::debug!(program = %program, ?args, "running bundler");

        // The child is killed if this future is dropped mid-build
        let output = Command::new(program)
            .args(&args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| BuildError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(BuildError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::debug!("bundler output:\n{}", stderr.trim_end());
        }

        Ok(())
    }
}

#[async_trait]
impl BuildContext for BundlerContext {
    async fn rebuild(&mut self) -> Result<BuildReport, BuildError> {
        let start = Instant::now();

        // Never bundle while an earlier copy still writes the served tree
        if let Some(stale) = self.copy.take() {
            stale.abort().await;
        }

        self.run_bundler().await?;

        let abort = Arc::new(AtomicBool::new(false));
        let root = self.root.clone();
        let rules = self.spec.copy.clone();
        let flag = abort.clone();
        let handle = tokio::task::spawn_blocking(move || copy_assets(&root, &rules, &flag));

        // Stays in `self` if this future is dropped while the copy runs
        let task = self.copy.insert(CopyTask { abort, handle });
        let joined = (&mut task.handle).await;
        self.copy = None;

        let copied = joined.map_err(|e| BuildError::CopyFailed {
            from: self.root.clone(),
            to: self.root.clone(),
            reason: e.to_string(),
        })??;

        Ok(BuildReport {
            duration_ms: start.elapsed().as_millis() as u64,
            copied,
        })
    }

    async fn cancel(&mut self) {
        match self.copy.take() {
            Some(copy) => {
                tracing::debug!("rebuild cancelled during asset copy, stopping it");
                copy.abort().await;
            }
            None => tracing::debug!("bundler run cancelled"),
        }
    }
}

/// Files bundled as CSS modules when `cssModules` is on.
const CSS_MODULE_SUFFIX: &str = ".module.css";

/// Render esbuild-style command line arguments for `spec`.
pub fn bundler_args(spec: &BuildSpec) -> Vec<String> {
    let mut args: Vec<String> = spec.entry_points.clone();

    if spec.bundle {
        args.push("--bundle".to_string());
    }
    args.push(format!("--outfile={}", spec.outfile.display()));
    args.push(format!("--format={}", spec.format.as_str()));
    args.push(format!("--platform={}", spec.platform.as_str()));
    if !spec.target.is_empty() {
        args.push(format!("--target={}", spec.target.join(",")));
    }
    if spec.minify {
        args.push("--minify".to_string());
    }
    if spec.sourcemap {
        args.push("--sourcemap".to_string());
    }
    args.push(format!("--tree-shaking={}", spec.tree_shaking));
    if let Some(tsconfig) = &spec.tsconfig {
        args.push(format!("--tsconfig={}", tsconfig.display()));
    }
    if let Some(jsx) = &spec.jsx {
        args.push(format!("--jsx={}", jsx));
    }
    if spec.jsx_dev {
        args.push("--jsx-dev".to_string());
    }
    if spec.css_modules {
        args.push(format!("--loader:{}=local-css", CSS_MODULE_SUFFIX));
    }
    args.extend(spec.extra_args.iter().cloned());

    args
}

/// Apply copy rules relative to `root`.
///
/// A file source is copied to `to`; a directory source is copied
/// recursively into `to`. Missing sources are skipped with a warning.
/// `abort` is checked before every file; once set, the copy stops with
/// [`BuildError::Cancelled`].
///
/// # Returns
///
/// Number of files copied
pub fn copy_assets(
    root: &Path,
    rules: &[CopyRule],
    abort: &AtomicBool,
) -> Result<usize, BuildError> {
    let mut copied = 0;

    for rule in rules {
        check_abort(abort)?;

        let from = root.join(&rule.from);
        let to = root.join(&rule.to);

        if from.is_file() {
            copy_file(&from, &to)?;
            copied += 1;
        } else if from.is_dir() {
            copied += copy_dir(&from, &to, abort)?;
        } else {
            tracing::warn!("copy source {} does not exist, skipping", from.display());
        }
    }

    Ok(copied)
}

fn copy_dir(from: &Path, to: &Path, abort: &AtomicBool) -> Result<usize, BuildError> {
    let mut copied = 0;

    for entry in WalkDir::new(from).follow_links(true) {
        check_abort(abort)?;
        let entry = entry.map_err(|e| copy_failed(from, to, e))?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| copy_failed(from, to, e))?;
        let dest = to.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest).map_err(|e| copy_failed(entry.path(), &dest, e))?;
        } else {
            copy_file(entry.path(), &dest)?;
            copied += 1;
        }
    }

    Ok(copied)
}

fn check_abort(abort: &AtomicBool) -> Result<(), BuildError> {
    if abort.load(Ordering::SeqCst) {
        return Err(BuildError::Cancelled);
    }
    Ok(())
}

fn copy_file(from: &Path, to: &Path) -> Result<(), BuildError> {
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent).map_err(|e| copy_failed(from, to, e))?;
    }
    std::fs::copy(from, to).map_err(|e| copy_failed(from, to, e))?;
    Ok(())
}

fn copy_failed(from: &Path, to: &Path, reason: impl std::fmt::Display) -> BuildError {
    BuildError::CopyFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_default_args() {
        let args = bundler_args(&BuildSpec::default());
        assert_eq!(
            args,
            vec![
                "src/index.js",
                "--bundle",
                "--outfile=dev/index.js",
                "--format=esm",
                "--platform=browser",
                "--target=chrome120,firefox130",
                "--sourcemap",
                "--tree-shaking=true",
                "--tsconfig=tsconfig.json",
                "--jsx=automatic",
                "--jsx-dev",
                "--loader:.module.css=local-css",
            ]
        );
    }

    #[test]
    fn test_optional_args() {
        let spec = BuildSpec {
            minify: true,
            sourcemap: false,
            jsx: None,
            jsx_dev: false,
            css_modules: false,
            tsconfig: Some(PathBuf::from("tsconfig.json")),
            extra_args: vec!["--log-level=warning".to_string()],
            ..BuildSpec::default()
        };
        let args = bundler_args(&spec);

        assert!(args.contains(&"--minify".to_string()));
        assert!(args.contains(&"--tsconfig=tsconfig.json".to_string()));
        assert!(!args.contains(&"--sourcemap".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("--jsx")));
        assert!(!args.iter().any(|a| a.starts_with("--loader")));
        assert_eq!(args.last().map(String::as_str), Some("--log-level=warning"));
    }

    #[test]
    fn test_copy_file_and_directory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("build-templates")).unwrap();
        fs::write(root.join("build-templates/index.dev.html"), "<html></html>").unwrap();
        fs::create_dir_all(root.join("assets/icons")).unwrap();
        fs::write(root.join("assets/logo.svg"), "<svg/>").unwrap();
        fs::write(root.join("assets/icons/flow.png"), [0u8; 4]).unwrap();

        let copied = copy_assets(
            root,
            &crate::config::default_copy_rules(),
            &AtomicBool::new(false),
        )
        .unwrap();

        assert_eq!(copied, 3);
        assert_eq!(
            fs::read_to_string(root.join("dev/index.html")).unwrap(),
            "<html></html>"
        );
        assert!(root.join("dev/assets/logo.svg").is_file());
        assert!(root.join("dev/assets/icons/flow.png").is_file());
    }

    #[test]
    fn test_copy_skips_missing_source() {
        let temp = TempDir::new().unwrap();
        let rules = vec![CopyRule::new("assets", "dev/assets")];

        assert_eq!(
            copy_assets(temp.path(), &rules, &AtomicBool::new(false)).unwrap(),
            0
        );
        assert!(!temp.path().join("dev/assets").exists());
    }

    #[test]
    fn test_copy_stops_when_aborted() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("assets")).unwrap();
        fs::write(temp.path().join("assets/a.txt"), "a").unwrap();
        let rules = vec![CopyRule::new("assets", "dev/assets")];

        let err = copy_assets(temp.path(), &rules, &AtomicBool::new(true)).unwrap_err();
        assert!(matches!(err, BuildError::Cancelled));
        assert!(!temp.path().join("dev/assets/a.txt").exists());
    }

    fn count_files(dir: &Path) -> usize {
        WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .count()
    }

    #[cfg(unix)]
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancel_waits_for_interrupted_copy() {
        let temp = TempDir::new().unwrap();
        let assets = temp.path().join("assets");
        for dir in 0..20 {
            let sub = assets.join(format!("set_{}", dir));
            fs::create_dir_all(&sub).unwrap();
            for file in 0..200 {
                fs::write(sub.join(format!("{}.txt", file)), [7u8; 512]).unwrap();
            }
        }
        let spec = BuildSpec {
            bundler: "true".to_string(),
            copy: vec![CopyRule::new("assets", "dev/assets")],
            ..BuildSpec::default()
        };
        let mut ctx = BundlerContext::new(temp.path(), spec);
        let dest = temp.path().join("dev/assets");

        // Drop the rebuild as soon as the copy has started writing
        {
            let mut rebuild = ctx.rebuild();
            loop {
                tokio::select! {
                    _ = &mut rebuild => break,
                    _ = tokio::time::sleep(Duration::from_millis(1)) => {
                        if dest.exists() {
                            break;
                        }
                    }
                }
            }
        }
        ctx.cancel().await;

        let after_cancel = count_files(&dest);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(count_files(&dest), after_cancel);

        // The context is usable again and completes the copy
        let report = ctx.rebuild().await.unwrap();
        assert_eq!(report.copied, 4000);
        assert_eq!(count_files(&dest), 4000);
    }

    #[tokio::test]
    async fn test_missing_bundler_is_spawn_error() {
        let temp = TempDir::new().unwrap();
        let spec = BuildSpec {
            bundler: "flowd-missing-bundler-binary".to_string(),
            ..BuildSpec::default()
        };
        let mut ctx = BundlerContext::new(temp.path(), spec);

        let err = ctx.rebuild().await.unwrap_err();
        assert!(matches!(err, BuildError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_bundler_skips_copy() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("assets")).unwrap();
        fs::write(temp.path().join("assets/a.txt"), "a").unwrap();
        let spec = BuildSpec {
            bundler: "false".to_string(),
            ..BuildSpec::default()
        };
        let mut ctx = BundlerContext::new(temp.path(), spec);

        let err = ctx.rebuild().await.unwrap_err();
        assert!(matches!(err, BuildError::Failed { .. }));
        assert!(!temp.path().join("dev/assets/a.txt").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_bundler_copies_assets() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("assets")).unwrap();
        fs::write(temp.path().join("assets/a.txt"), "a").unwrap();
        let spec = BuildSpec {
            bundler: "true".to_string(),
            ..BuildSpec::default()
        };
        let mut ctx = BundlerContext::new(temp.path(), spec);

        let report = ctx.rebuild().await.unwrap();
        assert_eq!(report.copied, 1);
        assert!(temp.path().join("dev/assets/a.txt").is_file());
    }
}
