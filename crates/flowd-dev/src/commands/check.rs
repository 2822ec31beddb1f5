//! Check command implementation.
//!
//! Validates configuration without building.

use crate::cli::CheckArgs;
use crate::commands::utils;
use crate::config::{CliOverrides, DevSettings};
use crate::dev::DevConfig;
use crate::error::{ConfigError, Result};
use crate::ui;
use std::path::Path;

/// Execute the check command.
///
/// # Validation Steps
///
/// 1. `--schema` / `--example`: print and exit
/// 2. Load flowd.dev.json with environment overrides and validate it
/// 3. Check the watched directory and entry points exist
/// 4. Report warnings (if --warnings flag)
///
/// # Errors
///
/// Returns errors for invalid configuration or missing files.
pub async fn execute(args: CheckArgs) -> Result<()> {
    if args.schema {
        println!("{}", serde_json::to_string_pretty(&DevSettings::json_schema())?);
        return Ok(());
    }

    if args.example {
        println!("{}", DevSettings::example_config());
        return Ok(());
    }

    ui::info("Checking configuration...");
    let (root, settings) = utils::load_project(&args.project, &CliOverrides::default())?;

    let config = DevConfig::from_settings(settings, root)?;
    config.validate()?;
    ui::success("Configuration is valid!");

    ui::info("Checking entry points...");
    for entry in &config.settings.build.entry_points {
        let entry_path = utils::resolve_path(Path::new(entry), &config.root);
        if !entry_path.is_file() {
            ui::error(&format!("Entry point not found: {}", entry_path.display()));
            return Err(ConfigError::InvalidValue {
                field: "build.entryPoints".to_string(),
                value: entry.clone(),
                hint: format!("File does not exist: {}", entry_path.display()),
            }
            .into());
        }
        ui::success(&format!("  {} exists", entry));
    }

    if args.warnings {
        ui::info("Checking for warnings...");
        report_warnings(&collect_warnings(&config));
    }

    ui::success("All checks passed!");
    Ok(())
}

/// Problems that do not stop a build but are probably mistakes.
fn collect_warnings(config: &DevConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let build = &config.settings.build;

    for rule in &build.copy {
        let from = utils::resolve_path(&rule.from, &config.root);
        if !from.exists() {
            warnings.push(format!(
                "Copy source does not exist and will be skipped: {}",
                rule.from.display()
            ));
        }
    }

    if let Some(tsconfig) = &build.tsconfig {
        if !utils::resolve_path(tsconfig, &config.root).is_file() {
            warnings.push(format!("tsconfig not found: {}", tsconfig.display()));
        }
    }

    let outfile = utils::resolve_path(&build.outfile, &config.root);
    if !outfile.starts_with(config.serve_dir()) {
        warnings.push(format!(
            "outfile {} is outside serveDir {}; the dev server will not serve it",
            build.outfile.display(),
            config.settings.serve_dir.display()
        ));
    }

    if build.minify {
        warnings.push(
            "minify is enabled; stack traces in development will be hard to read".to_string(),
        );
    }

    warnings
}

fn report_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        ui::info("No warnings found");
    } else {
        ui::warning(&format!("Found {} potential issues:", warnings.len()));
        for warning in warnings {
            ui::warning(&format!("  - {}", warning));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CopyRule;
    use std::path::PathBuf;

    fn test_config() -> DevConfig {
        let mut settings = DevSettings::default_config();
        settings.build.tsconfig = None;
        DevConfig::from_settings(settings, PathBuf::from("/project")).unwrap()
    }

    #[test]
    fn test_collect_warnings_missing_sources() {
        let warnings = collect_warnings(&test_config());

        // Both default copy rules point at files that do not exist
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.contains("Copy source")));
    }

    #[test]
    fn test_collect_warnings_outfile_outside_serve_dir() {
        let mut config = test_config();
        config.settings.build.copy = vec![];
        config.settings.build.outfile = PathBuf::from("dist/index.js");

        let warnings = collect_warnings(&config);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("outside serveDir"));
    }

    #[test]
    fn test_collect_warnings_minify_and_tsconfig() {
        let mut config = test_config();
        config.settings.build.copy = vec![CopyRule::new("/", "dev/root")];
        config.settings.build.minify = true;
        config.settings.build.tsconfig = Some(PathBuf::from("tsconfig.json"));

        let warnings = collect_warnings(&config);
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().any(|w| w.contains("minify")));
        assert!(warnings.iter().any(|w| w.contains("tsconfig")));
    }
}
