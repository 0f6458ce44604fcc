use anyhow::Result;
use lae_core::models::{
    EventDetails, EventFilter, EventStatus, NewEventData, TaxonomyKind, UpdateEventData,
};
use lae_core::repository::Repository;
use uuid::Uuid;

use crate::cli::{
    AddEventCommand, DeleteCommand, DoCommand, EditEventCommand, EventCommand, EventSubcommand,
    ListEventsCommand, ShowCommand,
};
use crate::commands::{confirm, emit};
use crate::config::Config;
use crate::parser::{parse_date, parse_time};
use crate::util::{
    clearable, missing, resolve_event_id, resolve_node_link, resolve_optional_node_id, resolve_schedule_id,
    short_id,
};
use crate::views::table::{display_event, display_events};

pub async fn event_command(repo: &impl Repository, command: EventCommand, config: &Config) -> Result<()> {
    match command.command {
        EventSubcommand::Add(add_command) => add_event(repo, add_command).await,
        EventSubcommand::List(list_command) => list_events(repo, list_command, config).await,
        EventSubcommand::Show(show_command) => show_event(repo, show_command).await,
        EventSubcommand::Edit(edit_command) => edit_event(repo, edit_command).await,
        EventSubcommand::Delete(delete_command) => delete_event(repo, delete_command).await,
        EventSubcommand::Do(do_command) => complete_event(repo, do_command).await,
    }
}

async fn resolve_optional_schedule_id(repo: &impl Repository, short_id: Option<&str>) -> Result<Option<Uuid>> {
    match short_id {
        Some(short_id) => Ok(Some(resolve_schedule_id(repo, short_id).await?)),
        None => Ok(None),
    }
}

async fn add_event(repo: &impl Repository, command: AddEventCommand) -> Result<()> {
    let event_date = parse_date(&command.date)?;
    let start_time = command.at.as_deref().map(parse_time).transpose()?;

    let data = NewEventData {
        notes: command.notes,
        status: command.status,
        domain_id: resolve_optional_node_id(repo, TaxonomyKind::Domain, command.domain.as_deref()).await?,
        activity_type_id: resolve_optional_node_id(repo, TaxonomyKind::ActivityType, command.activity_type.as_deref())
            .await?,
        schedule_id: resolve_optional_schedule_id(repo, command.schedule.as_deref()).await?,
        activity_id: resolve_optional_node_id(repo, TaxonomyKind::Activity, command.activity.as_deref()).await?,
        goal: command.goal,
        duration_minutes: command.duration,
        start_time,
        is_precise: command.precise,
        canvas_position_y: command.lane,
        ..NewEventData::new(command.name, event_date, command.slot)
    };

    let event = repo.add_event(data).await?;
    if event.canvas_position_y > 0 {
        println!(
            "Added event: {} on {} at {} (stacked in lane {}) ({})",
            event.name, event.event_date, event.time_slot, event.canvas_position_y, event.id
        );
    } else {
        println!(
            "Added event: {} on {} at {} ({})",
            event.name, event.event_date, event.time_slot, event.id
        );
    }
    Ok(())
}

async fn list_events(repo: &impl Repository, command: ListEventsCommand, config: &Config) -> Result<()> {
    let filter = EventFilter {
        start_date: command.from.as_deref().map(parse_date).transpose()?,
        end_date: command.to.as_deref().map(parse_date).transpose()?,
        domain_id: resolve_optional_node_id(repo, TaxonomyKind::Domain, command.domain.as_deref()).await?,
        activity_type_id: resolve_optional_node_id(repo, TaxonomyKind::ActivityType, command.activity_type.as_deref())
            .await?,
        status: command.status,
        offset: command.offset,
        limit: Some(command.limit.unwrap_or(config.events.default_limit)),
    };
    let events = repo.find_events_with_details(&filter).await?;
    emit(command.output, &events, |events| display_events(events))
}

/// Looks the event up with its joined names through the dated listing.
async fn find_details(repo: &impl Repository, id: Uuid) -> Result<EventDetails> {
    let event = repo.find_event_by_id(id).await?.ok_or_else(|| missing("Event", id))?;
    repo.find_events_with_details(&EventFilter::between(event.event_date, event.event_date))
        .await?
        .into_iter()
        .find(|details| details.event.id == id)
        .ok_or_else(|| missing("Event", id))
}

async fn show_event(repo: &impl Repository, command: ShowCommand) -> Result<()> {
    let id = resolve_event_id(repo, &command.id).await?;
    let details = find_details(repo, id).await?;
    emit(command.output, &details, display_event)
}

async fn edit_event(repo: &impl Repository, command: EditEventCommand) -> Result<()> {
    let id = resolve_event_id(repo, &command.id).await?;
    let event_date = command.date.as_deref().map(parse_date).transpose()?;
    let start_time = command.at.as_deref().map(parse_time).transpose()?;
    let schedule_id = if command.schedule_clear {
        Some(None)
    } else {
        resolve_optional_schedule_id(repo, command.schedule.as_deref()).await?.map(Some)
    };

    let data = UpdateEventData {
        event_date,
        time_slot: command.slot,
        name: command.name,
        notes: clearable(command.notes, command.notes_clear),
        status: command.status,
        domain_id: resolve_node_link(repo, TaxonomyKind::Domain, command.domain.as_deref(), command.domain_clear)
            .await?,
        activity_type_id: resolve_node_link(
            repo,
            TaxonomyKind::ActivityType,
            command.activity_type.as_deref(),
            command.activity_type_clear,
        )
        .await?,
        schedule_id,
        activity_id: resolve_node_link(repo, TaxonomyKind::Activity, command.activity.as_deref(), command.activity_clear)
            .await?,
        goal: clearable(command.goal, command.goal_clear),
        duration_minutes: clearable(command.duration, command.duration_clear),
        start_time: clearable(start_time, command.at_clear),
        is_precise: command.precise,
        canvas_position_y: command.lane,
    };

    let event = repo.update_event(id, data).await?;
    println!(
        "Updated event: {} ({} at {}, lane {})",
        event.name, event.event_date, event.time_slot, event.canvas_position_y
    );
    Ok(())
}

async fn delete_event(repo: &impl Repository, command: DeleteCommand) -> Result<()> {
    let id = resolve_event_id(repo, &command.id).await?;
    let event = repo.find_event_by_id(id).await?.ok_or_else(|| missing("Event", id))?;

    if !confirm(
        command.force,
        format!(
            "Are you sure you want to delete event '{}' on {}?",
            event.name, event.event_date
        ),
    ) {
        return Ok(());
    }

    repo.delete_event(id).await?;
    println!("Deleted event: {} ({})", event.name, short_id(id));
    Ok(())
}

async fn complete_event(repo: &impl Repository, command: DoCommand) -> Result<()> {
    let id = resolve_event_id(repo, &command.id).await?;
    let event = repo
        .update_event(
            id,
            UpdateEventData {
                status: Some(EventStatus::Completed),
                ..Default::default()
            },
        )
        .await?;
    println!("Completed event: '{}'", event.name);
    Ok(())
}
