//! msgboard - terminal client for a paginated message service
//!
//! Browses `GET /messages?page=&per_page=` in a terminal UI or prints a
//! single page, and carries the project template rename utility.

mod api;
mod config;
mod models;
mod query;
mod rename;
mod tui;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Overrides, Settings};

#[derive(Parser)]
#[command(name = "msgboard")]
#[command(about = "Terminal client for a paginated message service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Base URL of the message service (overrides MSGBOARD_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one page of messages
    List {
        /// Page number (1-based)
        #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        /// Messages per page
        #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..))]
        per_page: Option<u32>,
    },

    /// Check that the message service is up
    Health,

    /// Store or read the service's timestamp object
    Timestamp {
        #[command(subcommand)]
        action: TimestampAction,
    },

    /// Launch the terminal user interface
    Tui {
        /// Messages per page
        #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..))]
        per_page: Option<u32>,
    },

    /// Rename the project template
    Rename {
        /// New project name (e.g. `myapp`)
        new_name: String,

        /// Project root containing the template files
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

#[derive(Subcommand)]
enum TimestampAction {
    /// Print the last stored timestamp
    Read,
    /// Store the current time
    Write,
}

/// Route tracing output to stderr, or into `capture` while the TUI owns the screen.
fn init_logging(verbose: bool, capture: Option<tui::LogBuffer>) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    let registry = tracing_subscriber::registry().with(filter);

    match capture {
        Some(buffer) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(buffer),
            )
            .init(),
        None => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let capture = matches!(cli.command, Commands::Tui { .. }).then(tui::LogBuffer::new);
    init_logging(cli.verbose, capture.clone());

    let mut overrides = Overrides {
        api_url: cli.api_url,
        per_page: None,
    };

    match cli.command {
        Commands::List { page, per_page } => {
            overrides.per_page = per_page;
            let settings = Settings::load(&overrides)?;
            tracing::debug!("Using {}", settings.api_url);
            api::list_messages(&settings.api_url, page, settings.per_page).await?;
        }
        Commands::Health => {
            let settings = Settings::load(&overrides)?;
            api::health(&settings.api_url).await?;
        }
        Commands::Timestamp { action } => {
            let settings = Settings::load(&overrides)?;
            match action {
                TimestampAction::Read => api::read_timestamp(&settings.api_url).await?,
                TimestampAction::Write => api::write_timestamp(&settings.api_url).await?,
            }
        }
        Commands::Tui { per_page } => {
            overrides.per_page = per_page;
            let settings = Settings::load(&overrides)?;
            tui::run(settings, capture.unwrap_or_default()).await?;
        }
        Commands::Rename { new_name, root } => {
            tracing::info!("Renaming project to '{}'...", new_name);
            rename::run(&root, &new_name)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_rename_requires_name() {
        let err = Cli::try_parse_from(["msgboard", "rename"]).err().unwrap();
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_list_rejects_page_zero() {
        assert!(Cli::try_parse_from(["msgboard", "list", "--page", "0"]).is_err());
        let cli = Cli::try_parse_from(["msgboard", "list", "-p", "3", "-n", "10"]).unwrap();
        match cli.command {
            Commands::List { page, per_page } => {
                assert_eq!(page, 3);
                assert_eq!(per_page, Some(10));
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_global_api_url() {
        let cli =
            Cli::try_parse_from(["msgboard", "health", "--api-url", "http://svc:8000"]).unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://svc:8000"));
    }

    #[test]
    fn test_timestamp_subcommands() {
        let cli = Cli::try_parse_from(["msgboard", "timestamp", "write"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Timestamp {
                action: TimestampAction::Write
            }
        ));
        let cli = Cli::try_parse_from(["msgboard", "timestamp", "read"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Timestamp {
                action: TimestampAction::Read
            }
        ));
        assert!(Cli::try_parse_from(["msgboard", "timestamp"]).is_err());
    }
}
