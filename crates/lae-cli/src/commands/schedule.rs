use anyhow::Result;
use lae_core::models::{NewScheduleData, ScheduleFilter, ScheduleWithDomain, TaxonomyKind, UpdateScheduleData};
use lae_core::repository::Repository;

use crate::cli::{
    AddScheduleCommand, DeleteCommand, EditScheduleCommand, ListSchedulesCommand, ScheduleCommand,
    ScheduleSubcommand, ShowCommand,
};
use crate::commands::{confirm, emit};
use crate::parser::parse_date;
use crate::util::{clearable, missing, resolve_node_id, resolve_optional_node_id, resolve_schedule_id};
use crate::views::table::{display_schedule, display_schedules};

pub async fn schedule_command(repo: &impl Repository, command: ScheduleCommand) -> Result<()> {
    match command.command {
        ScheduleSubcommand::Add(add_command) => add_schedule(repo, add_command).await,
        ScheduleSubcommand::List(list_command) => list_schedules(repo, list_command).await,
        ScheduleSubcommand::Show(show_command) => show_schedule(repo, show_command).await,
        ScheduleSubcommand::Edit(edit_command) => edit_schedule(repo, edit_command).await,
        ScheduleSubcommand::Delete(delete_command) => delete_schedule(repo, delete_command).await,
    }
}

async fn add_schedule(repo: &impl Repository, command: AddScheduleCommand) -> Result<()> {
    let domain_id = resolve_node_id(repo, TaxonomyKind::Domain, &command.domain).await?;
    let start_date = command.start.as_deref().map(parse_date).transpose()?;
    let deadline = command.deadline.as_deref().map(parse_date).transpose()?;

    let schedule = repo
        .add_schedule(NewScheduleData {
            domain_id,
            name: command.name,
            description: command.description,
            start_date,
            deadline,
            status: command.status,
        })
        .await?;
    println!("Added schedule: {} ({})", schedule.name, schedule.id);
    Ok(())
}

async fn list_schedules(repo: &impl Repository, command: ListSchedulesCommand) -> Result<()> {
    let filter = ScheduleFilter {
        domain_id: resolve_optional_node_id(repo, TaxonomyKind::Domain, command.domain.as_deref()).await?,
        status: command.status,
        ..Default::default()
    };
    let schedules = repo.find_schedules_with_domain(&filter).await?;
    emit(command.output, &schedules, |schedules| display_schedules(schedules))
}

async fn show_schedule(repo: &impl Repository, command: ShowCommand) -> Result<()> {
    let id = resolve_schedule_id(repo, &command.id).await?;
    let schedule = repo
        .find_schedule_by_id(id)
        .await?
        .ok_or_else(|| missing("Schedule", id))?;
    let domain_name = repo
        .find_node_by_id(TaxonomyKind::Domain, schedule.domain_id)
        .await?
        .map(|domain| domain.name);
    let item = ScheduleWithDomain { schedule, domain_name };
    emit(command.output, &item, display_schedule)
}

async fn edit_schedule(repo: &impl Repository, command: EditScheduleCommand) -> Result<()> {
    let id = resolve_schedule_id(repo, &command.id).await?;
    let domain_id = resolve_optional_node_id(repo, TaxonomyKind::Domain, command.domain.as_deref()).await?;
    let start_date = command.start.as_deref().map(parse_date).transpose()?;
    let deadline = command.deadline.as_deref().map(parse_date).transpose()?;

    let schedule = repo
        .update_schedule(
            id,
            UpdateScheduleData {
                domain_id,
                name: command.name,
                description: clearable(command.description, command.description_clear),
                start_date: clearable(start_date, command.start_clear),
                deadline: clearable(deadline, command.deadline_clear),
                status: command.status,
            },
        )
        .await?;
    println!("Updated schedule: {}", schedule.name);
    Ok(())
}

async fn delete_schedule(repo: &impl Repository, command: DeleteCommand) -> Result<()> {
    let id = resolve_schedule_id(repo, &command.id).await?;
    let schedule = repo
        .find_schedule_by_id(id)
        .await?
        .ok_or_else(|| missing("Schedule", id))?;

    if !confirm(
        command.force,
        format!("Are you sure you want to delete schedule '{}'?", schedule.name),
    ) {
        return Ok(());
    }

    repo.delete_schedule(id).await?;
    println!("Deleted schedule: {}", schedule.name);
    Ok(())
}
