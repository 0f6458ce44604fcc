use anyhow::Result;
use lae_core::models::TaxonomyKind;
use lae_core::repository::Repository;

use crate::cli::{NodeStatsCommand, OutputArgs, StatsCommand, StatsSubcommand, TreeStatsCommand};
use crate::commands::emit;
use crate::util::resolve_node_id;
use crate::views::table::{display_node_statistics, display_summary, display_tree_statistics};

pub async fn stats_command(repo: &impl Repository, command: StatsCommand) -> Result<()> {
    match command.command {
        StatsSubcommand::Summary(output) => show_summary(repo, output).await,
        StatsSubcommand::Node(node_command) => show_node_statistics(repo, node_command).await,
        StatsSubcommand::Tree(tree_command) => show_tree_statistics(repo, tree_command).await,
    }
}

async fn show_summary(repo: &impl Repository, output: OutputArgs) -> Result<()> {
    let summary = repo.summary().await?;
    emit(output, &summary, display_summary)
}

async fn show_node_statistics(repo: &impl Repository, command: NodeStatsCommand) -> Result<()> {
    let kind = TaxonomyKind::from(command.kind);
    let id = resolve_node_id(repo, kind, &command.id).await?;
    let stats = repo.node_statistics(kind, id).await?;
    emit(command.output, &stats, display_node_statistics)
}

async fn show_tree_statistics(repo: &impl Repository, command: TreeStatsCommand) -> Result<()> {
    let kind = TaxonomyKind::from(command.kind);
    let forest = repo.tree_statistics(kind).await?;
    emit(command.output, &forest, |forest| display_tree_statistics(kind, forest))
}
