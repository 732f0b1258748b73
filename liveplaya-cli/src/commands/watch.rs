//! Watch command - keep a live session and print every state change.

use chrono::Local;
use liveplaya::session::SessionController;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::common::{build_transport, describe_state, resolve_session_config, ConnectionArgs, QueryArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the watch command.
pub struct WatchArgs {
    pub query: QueryArgs,
    pub connection: ConnectionArgs,
    pub interval_ms: Option<u64>,
}

/// Run the watch command until Ctrl+C.
pub fn run(args: WatchArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("watch");
    let config = runner.config();

    let query = args.query.to_query();
    let session_config = resolve_session_config(args.interval_ms, config);
    let transport = build_transport(&args.connection, config)?;

    // Print banner
    println!("LivePlaya Watch v{}", liveplaya::VERSION);
    println!("=====================");
    println!();
    println!("Source:  {}", transport.name());
    println!("Query:   {}", query);
    match session_config.refresh_interval() {
        Some(period) => println!("Refresh: every {} ms", period.as_millis()),
        None => println!("Refresh: disabled"),
    }
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let runtime = runner.create_runtime()?;

    // Set up signal handler for graceful shutdown
    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();
    ctrlc::set_handler(move || {
        println!();
        println!("Received shutdown signal, closing session...");
        shutdown_clone.cancel();
    })
    .map_err(|e| CliError::Signal(e.to_string()))?;

    let controller = SessionController::start(query, session_config, transport, runtime.handle());

    let handle = controller.handle();
    let _subscription = controller.subscribe(move || {
        let state = handle.state();
        println!("[{}] {}", Local::now().format("%H:%M:%S"), describe_state(&state));
    })?;

    runtime.block_on(shutdown.cancelled());

    let last = controller.state();
    controller.dispose();
    info!(loading = last.is_loading, "Watch stopped");

    println!();
    println!("Session closed.");
    Ok(())
}
