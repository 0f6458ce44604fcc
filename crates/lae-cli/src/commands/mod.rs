use anyhow::Result;
use dialoguer::Confirm;
use lae_core::models::TaxonomyKind;
use lae_core::repository::Repository;
use serde::Serialize;

use crate::cli::{Commands, OutputArgs};
use crate::config::Config;

pub mod calendar;
pub mod event;
pub mod schedule;
pub mod stats;
pub mod taxonomy;

pub async fn run(repo: &impl Repository, command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Domain(command) => taxonomy::taxonomy_command(repo, TaxonomyKind::Domain, command).await,
        Commands::Type(command) => taxonomy::taxonomy_command(repo, TaxonomyKind::ActivityType, command).await,
        Commands::Activity(command) => taxonomy::taxonomy_command(repo, TaxonomyKind::Activity, command).await,
        Commands::Schedule(command) => schedule::schedule_command(repo, command).await,
        Commands::Event(command) => event::event_command(repo, command, config).await,
        Commands::Calendar(command) => calendar::calendar_command(repo, command).await,
        Commands::Stats(command) => stats::stats_command(repo, command).await,
    }
}

/// Prints `value` as JSON when asked, otherwise hands it to `render`.
pub(crate) fn emit<T: Serialize>(output: OutputArgs, value: &T, render: impl FnOnce(&T)) -> Result<()> {
    if output.json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        render(value);
    }
    Ok(())
}

/// Asks before a destructive action unless `force` is set.
pub(crate) fn confirm(force: bool, prompt: String) -> bool {
    if force {
        return true;
    }
    let confirmed = Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or(false);
    if !confirmed {
        println!("Deletion cancelled.");
    }
    confirmed
}
