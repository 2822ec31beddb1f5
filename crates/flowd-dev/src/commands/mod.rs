//! Command implementations for the flowd-dev CLI.
//!
//! - [`dev`] - Development server with live reload
//! - [`build`] - One-shot build
//! - [`check`] - Configuration validation
//!
//! Each command is implemented in its own module and provides an `execute`
//! function that takes the parsed command arguments and returns a Result.

pub mod build;
pub mod check;
pub mod dev;
pub(crate) mod utils;

// Re-export execute functions for convenience
pub use build::execute as build_execute;
pub use check::execute as check_execute;
pub use dev::execute as dev_execute;
