//! The watch, rebuild and notify loop.
//!
//! One task owns the pending [`ChangeSet`], the [`Debouncer`] and the build
//! context. Rebuilds run on their own task so a newer trigger can cancel
//! them: the context moves into the build task and comes back when the task
//! finishes or is cancelled.
//!
//! Ordering rules:
//! - When a rebuild starts, the pending set becomes the in-flight set.
//! - A completed rebuild (successful or not) broadcasts one notification
//!   classified over the in-flight set, which is then dropped.
//! - A cancelled rebuild sends nothing; its paths go back into the pending
//!   set so the next classification sees the union.

use crate::dev::{
    BuildContext, BuildReport, Broadcaster, ChangeSet, Debouncer, FileChange, ReloadKind,
};
use crate::error::{BuildError, CliError, Result};
use crate::ui;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinHandle};

/// Counters returned when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Rebuilds started by a debounced trigger
    pub rebuilds: usize,
    /// Rebuilds cancelled by a newer trigger or by shutdown
    pub cancelled: usize,
    /// Rebuilds that completed with an error
    pub failed: usize,
    /// Notifications broadcast
    pub notifications: usize,
}

/// How a build task ended.
#[derive(Debug)]
enum BuildOutcome {
    Finished(std::result::Result<BuildReport, BuildError>),
    Cancelled,
}

/// Handle to the rebuild currently running on its own task.
struct ActiveBuild<B> {
    cancel: Option<oneshot::Sender<()>>,
    handle: JoinHandle<(B, BuildOutcome)>,
    changes: ChangeSet,
}

/// Owns the rebuild loop state. See the module docs for the ordering rules.
pub struct DevOrchestrator<B: BuildContext> {
    /// Present while no rebuild is running
    build: Option<B>,
    active: Option<ActiveBuild<B>>,
    pending: ChangeSet,
    debouncer: Debouncer,
    broadcaster: Arc<Broadcaster>,
    style_extensions: Vec<String>,
    summary: RunSummary,
}

impl<B: BuildContext> DevOrchestrator<B> {
    /// Create an orchestrator.
    ///
    /// # Arguments
    ///
    /// * `build` - The session's build context
    /// * `broadcaster` - Connection registry shared with the HTTP server
    /// * `quiet` - Debounce quiet period
    /// * `style_extensions` - Extensions that make a change set style-only
    pub fn new(
        build: B,
        broadcaster: Arc<Broadcaster>,
        quiet: Duration,
        style_extensions: Vec<String>,
    ) -> Self {
        Self {
            build: Some(build),
            active: None,
            pending: ChangeSet::new(),
            debouncer: Debouncer::new(quiet),
            broadcaster,
            style_extensions,
            summary: RunSummary::default(),
        }
    }

    /// Paths recorded since the last rebuild started.
    pub fn pending(&self) -> &ChangeSet {
        &self.pending
    }

    /// Run the first full build before anything is watched or served.
    ///
    /// # Errors
    ///
    /// Any build error. The dev command treats it as fatal.
    pub async fn initial_build(&mut self) -> Result<BuildReport> {
        let build = self.build.as_mut().ok_or_else(|| {
            CliError::Custom("initial build requested while a rebuild is running".to_string())
        })?;

        ui::pending("building project...");
        let report = build.rebuild().await?;
        ui::success(&format!("project built in {}ms", report.duration_ms));

        Ok(report)
    }

    /// Drive the loop until `shutdown` flips to `true` or the change channel
    /// closes.
    ///
    /// # Errors
    ///
    /// Returns error only if a build task panicked, which loses the build
    /// context. Build failures are logged and never end the loop.
    pub async fn run(
        mut self,
        mut changes: mpsc::Receiver<FileChange>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<RunSummary> {
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    // A dropped sender also means shut down
                    if changed.is_err() || *shutdown.borrow_and_update() {
                        tracing::debug!("shutdown requested");
                        break;
                    }
                }

                change = changes.recv() => match change {
                    Some(change) => self.record(change),
                    None => {
                        tracing::debug!("change channel closed");
                        break;
                    }
                },

                () = self.debouncer.fired() => {
                    if self.debouncer.take_fired() {
                        self.trigger().await?;
                    }
                }

                joined = join_active(&mut self.active) => {
                    if let Some(active) = self.active.take() {
                        self.finish(joined, active.changes)?;
                    }
                }
            }
        }

        if let Some(active) = self.active.take() {
            self.cancel_active(active).await?;
        }
        if self.debouncer.is_armed() || !self.pending.is_empty() {
            tracing::debug!(paths = self.pending.len(), "stopping with unbuilt changes");
        }

        Ok(self.summary)
    }

    fn record(&mut self, change: FileChange) {
        tracing::debug!(?change, "recorded change");
        self.pending.record(change.into_path());
        self.debouncer.poke();
    }

    /// Cancel any running rebuild, then start a fresh one over the pending set.
    async fn trigger(&mut self) -> Result<()> {
        if let Some(active) = self.active.take() {
            self.cancel_active(active).await?;
        }

        let Some(mut build) = self.build.take() else {
            return Err(CliError::Custom("build context is unavailable".to_string()));
        };

        let changes = self.pending.take();
        ui::info(&format!("changed files: {}", changes));
        ui::pending("rebuilding...");

        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let outcome = tokio::select! {
                result = build.rebuild() => BuildOutcome::Finished(result),
                _ = cancel_rx => BuildOutcome::Cancelled,
            };
            if matches!(outcome, BuildOutcome::Cancelled) {
                build.cancel().await;
            }
            (build, outcome)
        });

        self.summary.rebuilds += 1;
        self.active = Some(ActiveBuild {
            cancel: Some(cancel_tx),
            handle,
            changes,
        });

        Ok(())
    }

    /// Ask the running rebuild to stop and wait for the context to come back.
    async fn cancel_active(&mut self, mut active: ActiveBuild<B>) -> Result<()> {
        if let Some(cancel) = active.cancel.take() {
            if cancel.send(()).is_err() {
                tracing::debug!("rebuild already finished while cancelling");
            }
        }

        let joined = (&mut active.handle).await;
        self.finish(joined, active.changes)
    }

    /// Take the context back from a finished build task and act on the outcome.
    fn finish(
        &mut self,
        joined: std::result::Result<(B, BuildOutcome), JoinError>,
        changes: ChangeSet,
    ) -> Result<()> {
        let (build, outcome) =
            joined.map_err(|e| CliError::Custom(format!("build task failed: {}", e)))?;
        self.build = Some(build);

        match outcome {
            BuildOutcome::Cancelled => {
                tracing::debug!(paths = changes.len(), "rebuild cancelled");
                self.summary.cancelled += 1;
                self.pending.merge(changes);
            }
            BuildOutcome::Finished(result) => {
                match result {
                    Ok(report) => {
                        ui::success(&format!("build complete in {}ms", report.duration_ms));
                    }
                    Err(e) => {
                        self.summary.failed += 1;
                        ui::error(&format!("build failed: {}", e));
                    }
                }
                self.notify(&changes);
            }
        }

        Ok(())
    }

    fn notify(&mut self, changes: &ChangeSet) {
        let kind = changes.classify(&self.style_extensions);
        ui::pending("sending notification to connected clients...");

        let delivered = self.broadcaster.broadcast(kind);
        self.summary.notifications += 1;

        match kind {
            ReloadKind::Update => ui::debug(&format!("sent update to {} client(s)", delivered)),
            ReloadKind::Reload => ui::debug(&format!(
                "sent reload to {} client(s), connections reset",
                delivered
            )),
        }
    }
}

/// Resolve when the running build task finishes; pending while idle.
async fn join_active<B>(
    active: &mut Option<ActiveBuild<B>>,
) -> std::result::Result<(B, BuildOutcome), JoinError> {
    match active {
        Some(active) => (&mut active.handle).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Build context that sleeps and counts completed rebuilds.
    struct SlowBuild {
        delay: Duration,
        completed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl BuildContext for SlowBuild {
        async fn rebuild(&mut self) -> std::result::Result<BuildReport, BuildError> {
            tokio::time::sleep(self.delay).await;
            self.completed.fetch_add(1, Ordering::SeqCst);
            Ok(BuildReport::default())
        }
    }

    fn css() -> Vec<String> {
        vec![".css".to_string()]
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_trigger_cancels_running_build() {
        let completed = Arc::new(AtomicUsize::new(0));
        let build = SlowBuild {
            delay: Duration::from_secs(2),
            completed: completed.clone(),
        };
        let broadcaster = Arc::new(Broadcaster::new());
        let (_id, mut events) = broadcaster.subscribe();
        let orchestrator =
            DevOrchestrator::new(build, broadcaster.clone(), Duration::from_millis(500), css());

        let (change_tx, change_rx) = mpsc::channel(16);
        let (stop_tx, stop_rx) = watch::channel(false);
        let run = tokio::spawn(orchestrator.run(change_rx, stop_rx));

        change_tx
            .send(FileChange::Modified(PathBuf::from("src/a.css")))
            .await
            .unwrap();
        // Debounce fires at 500ms, the build would finish at 2500ms
        tokio::time::sleep(Duration::from_millis(1000)).await;
        change_tx
            .send(FileChange::Modified(PathBuf::from("src/b.tsx")))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;

        stop_tx.send(true).unwrap();
        let summary = run.await.unwrap().unwrap();

        assert_eq!(summary.rebuilds, 2);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.notifications, 1);
        assert_eq!(completed.load(Ordering::SeqCst), 1);

        // The cancelled a.css is classified together with b.tsx
        assert_eq!(
            events.recv().await,
            Some(crate::dev::SseFrame::Event(ReloadKind::Reload))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_running_build() {
        let completed = Arc::new(AtomicUsize::new(0));
        let build = SlowBuild {
            delay: Duration::from_secs(60),
            completed: completed.clone(),
        };
        let broadcaster = Arc::new(Broadcaster::new());
        let orchestrator =
            DevOrchestrator::new(build, broadcaster, Duration::from_millis(100), css());

        let (change_tx, change_rx) = mpsc::channel(16);
        let (stop_tx, stop_rx) = watch::channel(false);
        let run = tokio::spawn(orchestrator.run(change_rx, stop_rx));

        change_tx
            .send(FileChange::Created(PathBuf::from("src/new.tsx")))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        stop_tx.send(true).unwrap();

        let summary = run.await.unwrap().unwrap();
        assert_eq!(summary.rebuilds, 1);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.notifications, 0);
        assert_eq!(completed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_initial_build_reports() {
        let build = SlowBuild {
            delay: Duration::ZERO,
            completed: Arc::new(AtomicUsize::new(0)),
        };
        let mut orchestrator = DevOrchestrator::new(
            build,
            Arc::new(Broadcaster::new()),
            Duration::from_millis(500),
            css(),
        );

        let report = orchestrator.initial_build().await.unwrap();
        assert_eq!(report.copied, 0);
        assert!(orchestrator.pending().is_empty());
    }
}
