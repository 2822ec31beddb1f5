//! Build command implementation.
//!
//! Runs the bundler and the asset copy rules once, exactly like the dev
//! server's startup build, without watching or serving.

use crate::cli::BuildArgs;
use crate::commands::utils;
use crate::config::CliOverrides;
use crate::dev::{BuildContext, BuildReport, BundlerContext};
use crate::error::Result;
use crate::ui;

/// Execute the build command.
///
/// # Build Process
///
/// 1. Load and validate configuration (Env > File > Defaults)
/// 2. Run the bundler from the project root
/// 3. Apply the copy rules
/// 4. Display build summary
///
/// # Errors
///
/// Returns errors for invalid configuration, a bundler that cannot be
/// started or exits unsuccessfully, and failed asset copies.
pub async fn execute(args: BuildArgs) -> Result<()> {
    ui::info("Loading configuration...");
    let (root, settings) = utils::load_project(&args.project, &CliOverrides::default())?;
    settings.validate()?;

    let entries = settings.build.entry_points.join(", ");
    ui::info(&format!("Building: {}", entries));

    let mut ctx = BundlerContext::new(root, settings.build);
    ui::pending("building project...");
    let report = ctx.rebuild().await?;

    print_summary(&ctx, &report);
    Ok(())
}

fn print_summary(ctx: &BundlerContext, report: &BuildReport) {
    ui::success(&format!("Built {}", ctx.spec().outfile.display()));
    if report.copied > 0 {
        ui::info(&format!("Copied {} asset file(s)", report.copied));
    }
    ui::success(&format!("Build completed in {}ms", report.duration_ms));
}
