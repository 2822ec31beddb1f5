//! Miette diagnostic conversion for CLI errors.

use crate::error::{BuildError, CliError};
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Build(e) => build_error_to_miette(e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        _ => miette::miette!("{}", err),
    }
}

/// Convert BuildError to miette Report
pub fn build_error_to_miette(err: BuildError) -> Report {
    match err {
        BuildError::Failed { status, stderr } => {
            miette::miette!(
                "Build failed ({})\n\n{}\n\nHint: Fix the errors above and run again",
                status,
                stderr.trim_end()
            )
        }
        _ => miette::miette!("{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_failure_report_keeps_stderr() {
        let report = cli_error_to_miette(CliError::Build(BuildError::Failed {
            status: "exit status: 1".to_string(),
            stderr: "src/index.js: syntax error\n".to_string(),
        }));
        let msg = report.to_string();
        assert!(msg.contains("exit status: 1"));
        assert!(msg.contains("src/index.js: syntax error"));
    }
}
