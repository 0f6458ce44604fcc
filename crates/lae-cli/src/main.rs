use clap::Parser;
use lae_core::db;
use lae_core::error::CoreError;
use lae_core::repository::SqliteRepository;
use owo_colors::{OwoColorize, Style};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod parser;
mod util;
mod views;

#[tokio::main]
async fn main() {
    let (config, config_error) = match config::Config::new() {
        Ok(config) => (config, None),
        Err(e) => (config::Config::default(), Some(e)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Some(e) = config_error {
        warn!(error = %e, "invalid configuration, falling back to defaults");
    }

    let cli = cli::Cli::parse();

    debug!(path = %config.database_path, "opening database");
    let db_pool = match db::establish_connection(&config.database_path).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    let repository = SqliteRepository::with_delete_policies(db_pool, config.delete_policy);

    if let Err(e) = commands::run(&repository, cli.command, &config).await {
        handle_error(e);
        std::process::exit(1);
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    match err.downcast_ref::<CoreError>() {
        Some(CoreError::NotFound(s)) => {
            eprintln!("{} {}", "Error:".style(error_style), s);
        }
        Some(CoreError::Validation(s)) => {
            eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
        }
        Some(CoreError::AmbiguousId(matches)) => {
            eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
            eprintln!("Did you mean one of these?");
            for (id, name) in matches {
                eprintln!("  {} ({})", id.yellow(), name);
            }
        }
        Some(CoreError::CircularParent(node, parent)) => {
            eprintln!(
                "{} Circular parent: '{}' cannot be placed under '{}'",
                "Error:".style(error_style),
                node.yellow(),
                parent.yellow()
            );
        }
        _ => eprintln!("{} {}", "Error:".style(error_style), err),
    }
}
