//! Command-line interface definition for the flowd dev server.
//!
//! This module defines the CLI structure using clap v4's derive macros.
//!
//! # Command Structure
//!
//! - `flowd-dev dev` - Build, serve and rebuild on change with live reload
//! - `flowd-dev build` - One-shot build including asset copy
//! - `flowd-dev check` - Configuration validation and schema output

mod commands;
mod validation;

use clap::Parser;

pub use commands::{BuildArgs, CheckArgs, Command, DevArgs, ProjectArgs};
pub use validation::parse_host;

/// flowd-dev - development server for the flowd dashboard
#[derive(Parser, Debug)]
#[command(
    name = "flowd-dev",
    version,
    about = "Development server for the flowd dashboard",
    long_about = "Bundles the dashboard, serves it locally and pushes live-reload events to\n\
                  open browser tabs. Stylesheet-only changes are hot-swapped without a reload,\n\
                  and /api requests are answered with 501 while the backend is unavailable."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Shows requested paths, bundler invocations and notification fan-out.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    ///
    /// Outputs plain text without ANSI color codes. Useful for logging to
    /// files or systems that don't support colored terminal output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
