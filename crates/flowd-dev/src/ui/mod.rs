//! Terminal UI utilities for dev server status output.
//!
//! # Examples
//!
//! ```no_run
//! use flowd_dev::ui;
//!
//! ui::init_colors(false);
//! ui::pending("building project...");
//! ui::success("project built!");
//! ```

mod messages;

pub use messages::{debug, error, info, pending, success, warning, TAG};

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR environment variables, falls back to
/// terminal capability detection.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::user_attended_stderr()
}

/// Initialize color support based on environment.
///
/// `--no-color` wins; otherwise [`should_use_color`] decides. The choice is
/// applied globally through the `owo-colors` override that the status
/// functions consult.
pub fn init_colors(no_color: bool) {
    owo_colors::set_override(!no_color && should_use_color());
}
