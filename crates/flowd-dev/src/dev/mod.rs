//! Development server module.
//!
//! Provides the rebuild/notify loop and the HTTP side of it:
//! - File watching with a quiet-period debounce
//! - Cancellable rebuilds through a [`BuildContext`]
//! - Live reload / style hot-update over Server-Sent Events
//! - Static serving with single-page fallback and an `/api` stub

pub mod builder;
pub mod changes;
pub mod config;
pub mod debounce;
pub mod orchestrator;
pub mod server;
pub mod sse;
pub mod state;
pub mod watcher;

// Re-exports
pub use builder::{BuildContext, BuildReport, BundlerContext};
pub use changes::{ChangeSet, ReloadKind};
pub use config::DevConfig;
pub use debounce::Debouncer;
pub use orchestrator::{DevOrchestrator, RunSummary};
pub use server::DevServer;
pub use sse::SseFrame;
pub use state::{Broadcaster, ConnectionId, DevServerState, ServeConfig, SharedState};
pub use watcher::{FileChange, FileWatcher};
