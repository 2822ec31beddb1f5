//! Quiet-period timer for coalescing bursts of file changes.
//!
//! The debouncer owns a single deadline. Every change pushes the deadline out
//! by the quiet period; the rebuild fires once the deadline passes without
//! another change. It carries no paths itself: the orchestrator records them
//! into the pending [`ChangeSet`](crate::dev::ChangeSet) as they arrive.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Single-deadline debounce timer.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// (Re)arm the timer: the deadline becomes now + quiet period.
    pub fn poke(&mut self) {
        self.deadline = Some(Instant::now() + self.quiet);
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Future that resolves when the current deadline passes.
    ///
    /// Pending forever while disarmed. The future captures the deadline at
    /// creation, so it must be recreated after every [`poke`](Self::poke);
    /// calling it inside a `select!` loop does exactly that.
    pub fn fired(&self) -> impl Future<Output = ()> + Send + 'static {
        let deadline = self.deadline;
        async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        }
    }

    /// Disarm if the deadline has passed. Returns whether it had.
    pub fn take_fired(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
