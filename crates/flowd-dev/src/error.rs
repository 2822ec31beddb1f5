//! Error handling for the flowd development server.
//!
//! This module provides a hierarchical error type system using `thiserror`.
//! Each variant is meant to be actionable: it says what failed and, where
//! possible, what to do about it.
//!
//! # Architecture
//!
//! - **Top-level errors** (`CliError`) represent broad categories of failures
//! - **Domain-specific errors** (`ConfigError`, `BuildError`) provide detailed context
//! - **Error conversion** is automatic via `#[from]` attributes
//! - **Context helpers** allow attaching additional information to errors
//!
//! # Example
//!
//! ```rust,no_run
//! use flowd_dev::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read_template(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_path(path)
//!         .with_hint("Check the `copy` rules in flowd.dev.json")
//! }
//! ```

mod report;

pub use report::cli_error_to_miette;

use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
///
/// This is the primary error type returned by commands. It converts from the
/// domain-specific errors via `From` implementations.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (file not found, invalid values, etc.)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Bundler invocation or asset copy errors
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Development server errors
    #[error("Server error: {0}")]
    Server(String),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file doesn't exist at the expected location
    #[error("Config file not found: {}\n\nHint: Create a flowd.dev.json file or pass --config <path>", .0.display())]
    NotFound(PathBuf),

    /// Config sources could not be merged or extracted
    #[error("Invalid configuration:\n{errors}\n\nHint: Run 'flowd-dev check --schema' to see the expected shape")]
    ValidationFailed {
        /// Formatted extraction error messages
        errors: String,
    },

    /// Missing required configuration field
    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField {
        /// Name of the missing field
        field: String,
        /// Helpful hint for providing the field
        hint: String,
    },

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

/// Build errors raised by a [`BuildContext`](crate::dev::BuildContext).
///
/// The watch loop logs and discards these. Only the initial build turns them
/// into a fatal error.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The bundler executable could not be started
    #[error("Failed to start bundler '{program}': {source}\n\nHint: Install it or set build.bundler in flowd.dev.json")]
    Spawn {
        /// Program that was executed
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The bundler ran and reported failure
    #[error("Bundler exited with {status}:\n{stderr}")]
    Failed {
        /// Exit status as displayed by the OS
        status: String,
        /// Captured stderr of the bundler
        stderr: String,
    },

    /// The build was cancelled before its output was complete
    #[error("Build cancelled")]
    Cancelled,

    /// Copying a static asset into the served directory failed
    #[error("Failed to copy {} to {}: {reason}\n\nHint: Check the `copy` rules in flowd.dev.json", .from.display(), .to.display())]
    CopyFailed {
        /// Copy source
        from: PathBuf,
        /// Copy destination
        to: PathBuf,
        /// Why the copy failed
        reason: String,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Add a file path to the error context.
    ///
    /// I/O "not found" errors become [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Add a helpful hint to the error context.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            match err {
                CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                    CliError::FileNotFound(path.as_ref().to_path_buf())
                }
                other => other,
            }
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_not_found() {
        let err = ConfigError::NotFound(PathBuf::from("flowd.dev.json"));
        let msg = err.to_string();
        assert!(msg.contains("Config file not found"));
        assert!(msg.contains("flowd.dev.json"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_build_error_failed_includes_stderr() {
        let err = BuildError::Failed {
            status: "exit status: 1".to_string(),
            stderr: "✘ [ERROR] Could not resolve \"react\"".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("exit status: 1"));
        assert!(msg.contains("Could not resolve"));
    }

    #[test]
    fn test_build_error_spawn_hint() {
        let err = BuildError::Spawn {
            program: "esbuild".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("esbuild"));
        assert!(msg.contains("build.bundler"));
    }

    #[test]
    fn test_cli_error_from_config_error() {
        let config_err = ConfigError::NotFound(PathBuf::from("test.json"));
        let cli_err: CliError = config_err.into();
        assert!(matches!(cli_err, CliError::Config(_)));
    }

    #[test]
    fn test_cli_error_from_build_error() {
        let build_err = BuildError::Failed {
            status: "exit status: 1".to_string(),
            stderr: String::new(),
        };
        let cli_err: CliError = build_err.into();
        assert!(matches!(cli_err, CliError::Build(BuildError::Failed { .. })));
    }

    #[test]
    fn test_result_ext_with_path() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));

        let err = result.with_path("/test/path.txt").unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }

    #[test]
    fn test_result_ext_with_hint() {
        let result: std::result::Result<(), ConfigError> =
            Err(ConfigError::NotFound(PathBuf::from("test.json")));

        let err = result.with_hint("Try creating the file").unwrap_err();
        assert!(err.to_string().contains("Hint: Try creating the file"));
    }

    #[test]
    fn test_config_error_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "apiPrefix".to_string(),
            value: "api".to_string(),
            hint: "Prefixes must start with '/'".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Invalid value for 'apiPrefix'"));
        assert!(msg.contains("must start with '/'"));
    }
}
