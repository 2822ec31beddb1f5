//! flowd-dev - development server for the flowd dashboard.
//!
//! Bundles the single-page application with an external bundler, serves the
//! output, stubs the backend API and pushes live-reload notifications to open
//! browser tabs over Server-Sent Events.
//!
//! # Architecture
//!
//! - [`error`] - Error types with actionable messages
//! - [`logger`] - Structured logging with tracing
//! - [`ui`] - Tagged status lines for the terminal
//! - [`config`] - `flowd.dev.json` loading and validation
//! - [`dev`] - Watcher, debouncer, rebuild loop, broadcaster and HTTP server
//! - [`commands`] - `dev`, `build` and `check`
//!
//! # Example
//!
//! ```rust
//! use flowd_dev::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     // CLI command implementations...
//!     Ok(())
//! }
//! ```

// Public modules
pub mod cli;
pub mod commands;
pub mod config;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

// Re-export commonly used types
pub use error::{BuildError, CliError, ConfigError, Result, ResultExt};
