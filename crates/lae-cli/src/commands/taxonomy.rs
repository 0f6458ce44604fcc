use anyhow::Result;
use lae_core::models::{NewNodeData, TaxonomyKind, UpdateNodeData};
use lae_core::repository::Repository;

use crate::cli::{AddNodeCommand, DeleteCommand, EditNodeCommand, OutputArgs, ShowCommand, TaxonomyCommand, TaxonomySubcommand};
use crate::commands::{confirm, emit};
use crate::util::{clearable, missing, resolve_node_id, resolve_node_link, resolve_optional_node_id};
use crate::views::table::{display_node, display_nodes, display_tree};

pub async fn taxonomy_command(repo: &impl Repository, kind: TaxonomyKind, command: TaxonomyCommand) -> Result<()> {
    match command.command {
        TaxonomySubcommand::Add(add_command) => add_node(repo, kind, add_command).await,
        TaxonomySubcommand::List(output) => list_nodes(repo, kind, output).await,
        TaxonomySubcommand::Tree(output) => show_tree(repo, kind, output).await,
        TaxonomySubcommand::Show(show_command) => show_node(repo, kind, show_command).await,
        TaxonomySubcommand::Edit(edit_command) => edit_node(repo, kind, edit_command).await,
        TaxonomySubcommand::Delete(delete_command) => delete_node(repo, kind, delete_command).await,
    }
}

async fn add_node(repo: &impl Repository, kind: TaxonomyKind, command: AddNodeCommand) -> Result<()> {
    let parent_id = resolve_optional_node_id(repo, kind, command.parent.as_deref()).await?;
    let node = repo
        .add_node(
            kind,
            NewNodeData {
                name: command.name,
                description: command.description,
                parent_id,
            },
        )
        .await?;
    println!("Added {}: {} ({})", kind.label().to_lowercase(), node.name, node.id);
    Ok(())
}

async fn list_nodes(repo: &impl Repository, kind: TaxonomyKind, output: OutputArgs) -> Result<()> {
    let nodes = repo.find_nodes(kind).await?;
    emit(output, &nodes, |nodes| display_nodes(kind, nodes))
}

async fn show_tree(repo: &impl Repository, kind: TaxonomyKind, output: OutputArgs) -> Result<()> {
    let forest = repo.find_tree(kind).await?;
    emit(output, &forest, |forest| display_tree(kind, forest))
}

async fn show_node(repo: &impl Repository, kind: TaxonomyKind, command: ShowCommand) -> Result<()> {
    let id = resolve_node_id(repo, kind, &command.id).await?;
    let node = repo
        .find_node_by_id(kind, id)
        .await?
        .ok_or_else(|| missing(kind.label(), id))?;
    let parent_name = match node.parent_id {
        Some(parent_id) => repo.find_node_by_id(kind, parent_id).await?.map(|p| p.name),
        None => None,
    };
    emit(command.output, &node, |node| display_node(kind, node, parent_name.as_deref()))
}

async fn edit_node(repo: &impl Repository, kind: TaxonomyKind, command: EditNodeCommand) -> Result<()> {
    let id = resolve_node_id(repo, kind, &command.id).await?;
    let description = clearable(command.description, command.description_clear);
    let parent_id = resolve_node_link(repo, kind, command.parent.as_deref(), command.parent_clear).await?;

    let node = repo
        .update_node(
            kind,
            id,
            UpdateNodeData {
                name: command.name,
                description,
                parent_id,
            },
        )
        .await?;
    println!("Updated {}: {}", kind.label().to_lowercase(), node.name);
    Ok(())
}

async fn delete_node(repo: &impl Repository, kind: TaxonomyKind, command: DeleteCommand) -> Result<()> {
    let id = resolve_node_id(repo, kind, &command.id).await?;
    let node = repo
        .find_node_by_id(kind, id)
        .await?
        .ok_or_else(|| missing(kind.label(), id))?;

    if !confirm(
        command.force,
        format!("Are you sure you want to delete {} '{}'?", kind.label().to_lowercase(), node.name),
    ) {
        return Ok(());
    }

    let summary = repo.delete_node(kind, id).await?;
    if summary.schedules_deleted > 0 {
        println!(
            "Deleted {} node(s) and {} schedule(s).",
            summary.nodes_deleted, summary.schedules_deleted
        );
    } else {
        println!("Deleted {} node(s).", summary.nodes_deleted);
    }
    Ok(())
}
