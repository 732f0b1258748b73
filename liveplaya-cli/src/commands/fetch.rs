//! Fetch command - one request, no session.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::common::{build_transport, describe_view, ConnectionArgs, QueryArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the fetch command.
pub struct FetchArgs {
    pub query: QueryArgs,
    pub connection: ConnectionArgs,
}

/// Fetch a single view and print it.
pub fn run(args: FetchArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("fetch");

    let query = args.query.to_query();
    let transport = build_transport(&args.connection, runner.config())?;
    let runtime = runner.create_runtime()?;

    let result = runtime.block_on(transport.fetch_view(&query, CancellationToken::new()));
    let view = match result {
        Ok(view) => view,
        Err(e) => {
            warn!(query = %query, error = %e, "Fetch failed");
            return Err(e.into());
        }
    };
    info!(query = %query, name = %view.name, "Fetch succeeded");

    println!("{}", describe_view(&view));
    if let Some(ref description) = view.description {
        println!("  {}", description);
    }
    for message in &view.log {
        println!(
            "  {} {:>5} {}",
            message.time,
            message.level,
            message.text
        );
    }

    Ok(())
}
