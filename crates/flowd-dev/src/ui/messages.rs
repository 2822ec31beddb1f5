//! Status message functions for terminal output.
//!
//! Every line carries the `[dev server]` tag so it stands out from the
//! bundler's own output, which shares the terminal. Lines are gated by the
//! same filter as the `tracing` output, so `--quiet` leaves only errors
//! (always printed) and `--verbose` adds debug lines.

use owo_colors::{OwoColorize, Stream::Stderr};
use tracing::Level;

/// Tag printed in front of every status line.
pub const TAG: &str = "[dev server]";

/// Print a success message to stderr.
///
/// ```no_run
/// use flowd_dev::ui::success;
///
/// success("build complete!");
/// ```
pub fn success(message: &str) {
    if !tracing::enabled!(Level::INFO) {
        return;
    }
    eprintln!(
        "{}\t{} {}",
        TAG.if_supports_color(Stderr, |t| t.dimmed()),
        "✓".if_supports_color(Stderr, |t| t.green()),
        message
    );
}

/// Print an info message to stderr.
pub fn info(message: &str) {
    if !tracing::enabled!(Level::INFO) {
        return;
    }
    eprintln!(
        "{}\t{} {}",
        TAG.if_supports_color(Stderr, |t| t.dimmed()),
        "ℹ".if_supports_color(Stderr, |t| t.blue()),
        message
    );
}

/// Print a warning message to stderr.
pub fn warning(message: &str) {
    if !tracing::enabled!(Level::WARN) {
        return;
    }
    eprintln!(
        "{}\t{} {}",
        TAG.if_supports_color(Stderr, |t| t.dimmed()),
        "⚠".if_supports_color(Stderr, |t| t.yellow()),
        message.if_supports_color(Stderr, |t| t.yellow())
    );
}

/// Print an error message to stderr.
pub fn error(message: &str) {
    eprintln!(
        "{}\t{} {}",
        TAG.if_supports_color(Stderr, |t| t.dimmed()),
        "✗".if_supports_color(Stderr, |t| t.red()),
        message.if_supports_color(Stderr, |t| t.red())
    );
}

/// Print a progress message ("rebuilding...", "sending notification...").
pub fn pending(message: &str) {
    if !tracing::enabled!(Level::INFO) {
        return;
    }
    eprintln!(
        "{}\t{} {}",
        TAG.if_supports_color(Stderr, |t| t.dimmed()),
        "⌛".if_supports_color(Stderr, |t| t.cyan()),
        message
    );
}

/// Print a debug message to stderr (only with `--verbose` or a debug `RUST_LOG`).
pub fn debug(message: &str) {
    if tracing::enabled!(Level::DEBUG) {
        eprintln!(
            "{}\t{} {}",
            TAG.if_supports_color(Stderr, |t| t.dimmed()),
            "◆".if_supports_color(Stderr, |t| t.dimmed()),
            message.if_supports_color(Stderr, |t| t.dimmed())
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages() {
        // These should not panic
        success("Success message");
        info("Info message");
        warning("Warning message");
        error("Error message");
        pending("Pending message");
        debug("Debug message");
    }
}
