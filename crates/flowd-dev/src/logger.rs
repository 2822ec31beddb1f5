//! Logging infrastructure for the dev server.
//!
//! Structured logging on top of the `tracing` ecosystem. User-facing status
//! lines go through [`crate::ui`]; `tracing` carries the diagnostic detail
//! (request paths, watcher events, bundler arguments).
//!
//! # Example
//!
//! ```rust,no_run
//! use flowd_dev::logger::init_logger;
//! use tracing::{debug, info};
//!
//! init_logger(false, false, false);
//!
//! info!("watching src/");
//! debug!(path = "/index.js", "requested");
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used with `--verbose`.
const VERBOSE_FILTER: &str = "flowd_dev=debug,tower_http=debug";
/// Filter used with `--quiet`.
const QUIET_FILTER: &str = "flowd_dev=error";
/// Filter used when neither flag nor `RUST_LOG` is set.
const DEFAULT_FILTER: &str = "flowd_dev=info";

/// Initialize the tracing subscriber with the specified options.
///
/// Should be called once at the start of the program, before any logging
/// occurs.
///
/// The logging level is determined in this order:
/// 1. `--verbose` flag: DEBUG for this crate and the HTTP trace layer
/// 2. `--quiet` flag: ERROR only
/// 3. `RUST_LOG` environment variable: custom filter
/// 4. Default: INFO for this crate
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false) // Don't show the module path (keeps output clean)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(select_filter(verbose, quiet))
        .with(fmt_layer)
        .init();
}

/// Pick the env filter for the given verbosity flags.
fn select_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}
