use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::validation::parse_host;

/// Available flowd-dev subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the development server with watch mode
    ///
    /// Builds once, then serves the output directory, rebuilds whenever the
    /// watched sources change and notifies open browser tabs over an event
    /// stream.
    Dev(DevArgs),

    /// Build once without serving
    ///
    /// Runs the bundler and the asset copy rules exactly as the dev server
    /// does on startup. Useful in CI or to inspect the output.
    Build(BuildArgs),

    /// Validate configuration
    ///
    /// Loads flowd.dev.json together with environment overrides and reports
    /// any problem. Can also print the JSON schema or an example file.
    Check(CheckArgs),
}

/// Options shared by every command that loads the project configuration
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Path to the configuration file
    ///
    /// Defaults to flowd.dev.json in the project root. Missing defaults are
    /// fine; a missing explicit file is an error.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Project root (defaults to the current directory)
    ///
    /// All relative paths in the configuration are resolved against it and
    /// the bundler runs there.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

/// Arguments for the dev command (development server)
#[derive(Args, Debug)]
pub struct DevArgs {
    /// Port for the development server
    ///
    /// Overrides `port` from the configuration. There is no fallback port:
    /// open tabs reconnect to the same address after a restart.
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Address to bind (an IP address)
    #[arg(long, value_parser = parse_host, value_name = "ADDR")]
    pub host: Option<String>,

    #[command(flatten)]
    pub project: ProjectArgs,
}

/// Arguments for the build command (one-shot build)
#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

/// Arguments for the check command (configuration validation)
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Print the JSON schema of flowd.dev.json and exit
    #[arg(long, conflicts_with = "example")]
    pub schema: bool,

    /// Print an example flowd.dev.json with every default filled in
    #[arg(long)]
    pub example: bool,

    /// Show warnings in addition to errors
    ///
    /// Reports paths that do not exist yet (entry points, copy sources)
    /// without failing the check.
    #[arg(short, long)]
    pub warnings: bool,

    #[command(flatten)]
    pub project: ProjectArgs,
}
