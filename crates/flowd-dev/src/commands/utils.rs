//! Shared utilities for command implementations.
//!
//! - Project root resolution
//! - Configuration loading for a resolved root

use crate::cli::ProjectArgs;
use crate::config::{CliOverrides, DevSettings};
use crate::error::{CliError, Result};
use std::path::{Path, PathBuf};

/// Resolve a path relative to a working directory.
///
/// If the path is absolute, returns it unchanged. Otherwise, joins it with
/// the working directory.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Get the current working directory.
///
/// # Errors
///
/// Returns I/O error if current directory cannot be determined.
pub fn get_cwd() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| {
        CliError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to get current directory: {}", e),
        ))
    })
}

/// Find the nearest directory containing `package.json`, walking up from
/// `start_dir`.
pub fn find_package_json(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .find(|dir| dir.join("package.json").is_file())
        .map(Path::to_path_buf)
}

/// Resolve the project root directory.
///
/// Resolution priority (highest to lowest):
/// 1. Explicit `--cwd` flag if provided
/// 2. Nearest package.json walking up from the current directory
/// 3. The current directory, with a warning
///
/// # Errors
///
/// - Explicit cwd doesn't exist or isn't a directory
/// - Cannot determine current working directory
pub fn resolve_project_root(explicit_cwd: Option<&Path>) -> Result<PathBuf> {
    use crate::ui;

    let current_dir = get_cwd()?;

    if let Some(cwd_path) = explicit_cwd {
        let absolute = resolve_path(cwd_path, &current_dir);

        if !absolute.exists() {
            return Err(CliError::InvalidArgument(format!(
                "Specified --cwd directory does not exist: {}",
                absolute.display()
            )));
        }

        if !absolute.is_dir() {
            return Err(CliError::InvalidArgument(format!(
                "Specified --cwd is not a directory: {}",
                absolute.display()
            )));
        }

        tracing::debug!("project root {} (from --cwd)", absolute.display());
        return Ok(absolute);
    }

    if let Some(package_root) = find_package_json(&current_dir) {
        tracing::debug!("project root {} (nearest package.json)", package_root.display());
        return Ok(package_root);
    }

    ui::warning(&format!(
        "No package.json found. Using current directory: {}",
        current_dir.display()
    ));
    ui::info("Consider using --cwd to specify your project root explicitly.");

    Ok(current_dir)
}

/// Resolve the project root and load the settings for it.
///
/// # Errors
///
/// Root resolution errors and configuration loading errors.
pub fn load_project(project: &ProjectArgs, cli: &CliOverrides) -> Result<(PathBuf, DevSettings)> {
    let root = resolve_project_root(project.cwd.as_deref())?;
    let settings = DevSettings::load(&root, project.config.as_deref(), cli)?;
    Ok((root, settings))
}
