//! LivePlaya CLI - Command-line interface
//!
//! Watches a LivePlaya backend from the terminal, printing each update of
//! the session state, and manages the configuration file.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::common::{ConnectionArgs, QueryArgs};
use commands::config::ConfigCommands;
use error::CliError;

#[derive(Parser)]
#[command(name = "liveplaya")]
#[command(about = "Live map and log view of a LivePlaya backend", long_about = None)]
#[command(version = liveplaya::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep a live session open and print every state change
    Watch {
        #[command(flatten)]
        query: QueryArgs,

        #[command(flatten)]
        connection: ConnectionArgs,

        /// Refresh period in milliseconds, 0 disables (overrides config)
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Fetch a single view and print it
    Fetch {
        #[command(flatten)]
        query: QueryArgs,

        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// View and modify configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Watch {
            query,
            connection,
            interval_ms,
        } => commands::watch::run(commands::watch::WatchArgs {
            query,
            connection,
            interval_ms,
        }),
        Commands::Fetch { query, connection } => {
            commands::fetch::run(commands::fetch::FetchArgs { query, connection })
        }
        Commands::Config { command } => commands::config::run(command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_watch_arguments() {
        let cli = Cli::try_parse_from([
            "liveplaya",
            "watch",
            "--zoom",
            "6",
            "--bounds",
            "-119.3,40.7,-119.1,40.8",
            "--at",
            "2023-08-30T18:00:00Z",
            "--interval-ms",
            "0",
        ])
        .unwrap();

        match cli.command {
            Commands::Watch {
                query, interval_ms, ..
            } => {
                assert_eq!(query.zoom, Some(6.0));
                assert_eq!(query.bounds.unwrap().min.lng, -119.3);
                assert!(query.at.is_some());
                assert_eq!(interval_ms, Some(0));
            }
            _ => panic!("expected watch"),
        }
    }

    #[test]
    fn test_synthetic_conflicts_with_endpoint() {
        let result = Cli::try_parse_from([
            "liveplaya",
            "fetch",
            "--synthetic",
            "--endpoint",
            "http://localhost:8000/api",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_bounds_rejected() {
        let result = Cli::try_parse_from(["liveplaya", "fetch", "--bounds", "1,2,3"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::try_parse_from(["liveplaya", "config", "set", "session.endpoint", "http://x/api"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommands::Set { .. }
            }
        ));
    }
}
