//! Development server command implementation.
//!
//! Orchestrates the entire dev server lifecycle:
//! - Initial build (fatal on failure)
//! - File watching with a quiet-period debounce
//! - HTTP server with the live-reload event stream
//! - Cancellable rebuilds on file changes
//! - Graceful shutdown on Ctrl+C

use crate::cli::DevArgs;
use crate::commands::utils;
use crate::config::CliOverrides;
use crate::dev::{
    Broadcaster, BundlerContext, DevConfig, DevOrchestrator, DevServer, DevServerState,
    FileWatcher,
};
use crate::error::{CliError, Result, ResultExt};
use crate::ui;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinError;

/// Execute the dev command.
///
/// # Process Flow
///
/// 1. Load and validate configuration
/// 2. Perform the initial build
/// 3. Start the file watcher
/// 4. Bind the HTTP server
/// 5. Run the rebuild loop and the server until Ctrl+C
///
/// # Errors
///
/// Returns errors for:
/// - Invalid configuration
/// - Initial build failures
/// - Server startup failures
/// - File watcher errors
pub async fn execute(args: DevArgs) -> Result<()> {
    ui::info("Starting development server...");

    let overrides = CliOverrides {
        host: args.host.clone(),
        port: args.port,
    };
    let (root, settings) = utils::load_project(&args.project, &overrides)?;
    let config = DevConfig::from_settings(settings, root)?;
    config.validate()?;
    tracing::debug!(?config, "resolved dev config");

    let broadcaster = Arc::new(Broadcaster::new());
    let build = BundlerContext::new(config.root.clone(), config.settings.build.clone());
    let mut orchestrator = DevOrchestrator::new(
        build,
        broadcaster.clone(),
        config.debounce(),
        config.settings.style_extensions.clone(),
    );

    orchestrator.initial_build().await?;

    let (watcher, change_rx) =
        FileWatcher::new(config.watch_dir(), config.settings.watch_ignore.clone())?;
    ui::info(&format!(
        "watching for changes at: {}",
        watcher.root().display()
    ));

    let state = Arc::new(DevServerState::new(config.serve_config(), broadcaster));
    let server = DevServer::start(&config, state)
        .await
        .with_hint("Stop the process using the port or pick another one with --port")?;
    ui::success(&format!("proxy server running at {}", config.server_url()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut server_task = tokio::spawn(server.serve(shutdown_rx.clone()));
    let loop_task = tokio::spawn(orchestrator.run(change_rx, shutdown_rx));

    ui::info("Press Ctrl+C to stop");

    let server_exit = tokio::select! {
        signal = signal::ctrl_c() => {
            if let Err(e) = signal {
                ui::warning(&format!("Failed to listen for Ctrl+C: {}", e));
            }
            ui::info("Shutting down development server...");
            None
        }
        joined = &mut server_task => {
            ui::warning("Server task completed unexpectedly");
            Some(joined)
        }
    };

    // Stops the loop, closes event streams and the listener
    let _ = shutdown_tx.send(true);
    drop(watcher);

    let summary = flatten(loop_task.await)?;
    tracing::debug!(?summary, "rebuild loop stopped");

    let server_exit = match server_exit {
        Some(joined) => joined,
        None => server_task.await,
    };
    flatten(server_exit)?;

    ui::success("Development server stopped");
    Ok(())
}

fn flatten<T>(joined: std::result::Result<Result<T>, JoinError>) -> Result<T> {
    joined.map_err(|e| CliError::Server(format!("task failed: {}", e)))?
}
