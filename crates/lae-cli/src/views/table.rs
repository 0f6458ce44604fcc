use chrono_humanize::Humanize;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use lae_core::models::{
    EventDetails, EventStatus, ScheduleStatus, ScheduleWithDomain, TaxonomyKind, TaxonomyNode,
};
use lae_core::statistics::{NodeStatistics, SummaryStatistics, TreeStatistics};
use lae_core::taxonomy::TaxonomyTree;
use owo_colors::OwoColorize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::util::short_id;

fn or_none(value: Option<&str>) -> &str {
    value.unwrap_or("None")
}

fn rate_cell(rate: f64) -> Cell {
    let cell = Cell::new(format!("{rate:.2}%"));
    if rate >= 75.0 {
        cell.fg(Color::Green)
    } else if rate >= 40.0 {
        cell.fg(Color::Yellow)
    } else {
        cell
    }
}

fn event_status_cell(status: EventStatus) -> Cell {
    let cell = Cell::new(status.to_string());
    match status {
        EventStatus::Completed => cell.fg(Color::Green),
        EventStatus::Planned => cell,
    }
}

// ============================================================================
// Taxonomies
// ============================================================================

pub fn display_nodes(kind: TaxonomyKind, nodes: &[TaxonomyNode]) {
    if nodes.is_empty() {
        println!("No {} nodes found.", kind.label().to_lowercase());
        return;
    }

    let names: HashMap<Uuid, &str> = nodes.iter().map(|n| (n.id, n.name.as_str())).collect();
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Parent", "Description", "Created At"]);

    for node in nodes {
        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(node.id)));
        row.add_cell(Cell::new(&node.name));
        let parent_cell = match node.parent_id {
            None => Cell::new("None"),
            Some(parent_id) => match names.get(&parent_id) {
                Some(name) => Cell::new(name),
                // Dangling after an orphaning delete.
                None => Cell::new(format!("{} (missing)", short_id(parent_id))).fg(Color::DarkGrey),
            },
        };
        row.add_cell(parent_cell);
        row.add_cell(Cell::new(or_none(node.description.as_deref())));
        row.add_cell(Cell::new(node.created_at.humanize()));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_tree(kind: TaxonomyKind, forest: &[TaxonomyTree]) {
    if forest.is_empty() {
        println!("No {} nodes found.", kind.label().to_lowercase());
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Description"]);
    for tree in forest {
        for (depth, node) in tree.flatten() {
            let mut row = Row::new();
            row.add_cell(Cell::new(short_id(node.id)));
            let mut name_cell = Cell::new(format!("{}{}", "  ".repeat(depth), node.name));
            if depth == 0 {
                name_cell = name_cell.add_attribute(Attribute::Bold);
            }
            row.add_cell(name_cell);
            row.add_cell(Cell::new(or_none(node.description.as_deref())));
            table.add_row(row);
        }
    }
    println!("{table}");
}

pub fn display_node(kind: TaxonomyKind, node: &TaxonomyNode, parent_name: Option<&str>) {
    println!("{} {}", kind.label().bold(), node.name.bold());
    println!("  ID:          {}", node.id);
    println!("  Description: {}", or_none(node.description.as_deref()));
    match (node.parent_id, parent_name) {
        (Some(_), Some(name)) => println!("  Parent:      {}", name),
        (Some(parent_id), None) => println!("  Parent:      {} {}", parent_id, "(missing)".dimmed()),
        (None, _) => println!("  Parent:      None"),
    }
    println!("  Created:     {}", node.created_at.humanize());
}

// ============================================================================
// Schedules
// ============================================================================

pub fn display_schedules(schedules: &[ScheduleWithDomain]) {
    if schedules.is_empty() {
        println!("No schedules found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Domain", "Status", "Start", "Deadline"]);
    for item in schedules {
        let schedule = &item.schedule;
        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(schedule.id)));
        row.add_cell(Cell::new(&schedule.name));
        row.add_cell(Cell::new(or_none(item.domain_name.as_deref())));
        let status_cell = Cell::new(schedule.status.to_string());
        row.add_cell(match schedule.status {
            ScheduleStatus::Completed => status_cell.fg(Color::Green),
            ScheduleStatus::Paused => status_cell.fg(Color::DarkGrey),
            ScheduleStatus::Ongoing => status_cell,
        });
        row.add_cell(Cell::new(schedule.start_date.map_or("None".to_string(), |d| d.to_string())));
        row.add_cell(Cell::new(schedule.deadline.map_or("None".to_string(), |d| d.to_string())));
        table.add_row(row);
    }
    println!("{table}");
}

pub fn display_schedule(item: &ScheduleWithDomain) {
    let schedule = &item.schedule;
    println!("{} {}", "Schedule".bold(), schedule.name.bold());
    println!("  ID:          {}", schedule.id);
    println!("  Domain:      {}", or_none(item.domain_name.as_deref()));
    println!("  Status:      {}", schedule.status);
    println!("  Description: {}", or_none(schedule.description.as_deref()));
    println!("  Start:       {}", schedule.start_date.map_or("None".to_string(), |d| d.to_string()));
    println!("  Deadline:    {}", schedule.deadline.map_or("None".to_string(), |d| d.to_string()));
    println!("  Created:     {}", schedule.created_at.humanize());
}

// ============================================================================
// Events
// ============================================================================

pub fn display_events(events: &[EventDetails]) {
    if events.is_empty() {
        println!("No events found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Slot", "Lane", "Name", "Status", "Domain", "Type", "Schedule"]);
    for details in events {
        let event = &details.event;
        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(event.id)));
        row.add_cell(Cell::new(event.event_date.format("%a %Y-%m-%d").to_string()));
        row.add_cell(Cell::new(format!("{} {}", event.time_slot, event.time_slot.label())));
        row.add_cell(Cell::new(event.canvas_position_y));

        let mut name_cell = Cell::new(&event.name);
        if event.status == EventStatus::Completed {
            name_cell = name_cell.add_attribute(Attribute::CrossedOut).fg(Color::DarkGrey);
        }
        row.add_cell(name_cell);
        row.add_cell(event_status_cell(event.status));
        row.add_cell(Cell::new(or_none(details.domain_name.as_deref())));
        row.add_cell(Cell::new(or_none(details.activity_type_name.as_deref())));
        row.add_cell(Cell::new(or_none(details.schedule_name.as_deref())));
        table.add_row(row);
    }
    println!("{table}");
}

pub fn display_event(details: &EventDetails) {
    let event = &details.event;
    println!("{} {}", "Event".bold(), event.name.bold());
    println!("  ID:        {}", event.id);
    println!(
        "  When:      {} slot {} ({}), lane {}",
        event.event_date,
        event.time_slot,
        event.time_slot.label(),
        event.canvas_position_y
    );
    if let Some(start_time) = event.start_time {
        let precision = if event.is_precise { "exact" } else { "approximate" };
        println!("  Starts:    {} ({})", start_time.format("%H:%M"), precision);
    }
    if let Some(minutes) = event.duration_minutes {
        println!("  Duration:  {} min", minutes);
    }
    println!("  Status:    {}", event.status);
    println!("  Domain:    {}", or_none(details.domain_name.as_deref()));
    println!("  Type:      {}", or_none(details.activity_type_name.as_deref()));
    println!("  Schedule:  {}", or_none(details.schedule_name.as_deref()));
    if details.activity_name.is_some() || event.goal.is_some() {
        println!("  Activity:  {}", or_none(details.activity_name.as_deref()));
        println!("  Goal:      {}", or_none(event.goal.as_deref()));
    }
    println!("  Notes:     {}", or_none(event.notes.as_deref()));
    println!("  Updated:   {}", event.updated_at.humanize());
}

// ============================================================================
// Statistics
// ============================================================================

pub fn display_summary(summary: &SummaryStatistics) {
    let mut totals = Table::new();
    totals.set_header(vec!["Metric", "Value"]);
    totals.add_row(vec![Cell::new("Domains"), Cell::new(summary.total_domains)]);
    totals.add_row(vec![Cell::new("Activity types"), Cell::new(summary.total_activity_types)]);
    totals.add_row(vec![Cell::new("Activities (legacy)"), Cell::new(summary.total_activities)]);
    totals.add_row(vec![Cell::new("Schedules"), Cell::new(summary.total_schedules)]);
    totals.add_row(vec![Cell::new("Events"), Cell::new(summary.total_events)]);
    totals.add_row(vec![Cell::new("Completed events"), Cell::new(summary.completed_events)]);
    totals.add_row(vec![Cell::new("Completion rate"), rate_cell(summary.completion_rate)]);
    println!("{totals}");

    if !summary.status_distribution.is_empty() {
        let mut by_status = Table::new();
        by_status.set_header(vec!["Status", "Events"]);
        for row in &summary.status_distribution {
            by_status.add_row(vec![event_status_cell(row.status), Cell::new(row.count)]);
        }
        println!("{by_status}");
    }

    let mut by_slot = Table::new();
    by_slot.set_header(vec!["Slot", "Name", "Events"]);
    for row in &summary.timeslot_distribution {
        by_slot.add_row(vec![
            Cell::new(row.time_slot),
            Cell::new(row.slot_name),
            Cell::new(row.count),
        ]);
    }
    println!("{by_slot}");
}

pub fn display_node_statistics(stats: &NodeStatistics) {
    println!(
        "{} {}: {} of {} events completed ({:.2}%)",
        stats.kind.label().bold(),
        stats.name.bold(),
        stats.completed_events,
        stats.total_events,
        stats.completion_rate
    );
    if stats.breakdown.is_empty() {
        println!("No events linked to this subtree.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Node", "Events", "Completed", "Rate", "Goals"]);
    for entry in &stats.breakdown {
        let goals = entry
            .goals
            .iter()
            .map(|g| format!("{} {} [{}]", g.date, g.goal, g.status))
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(vec![
            Cell::new(&entry.name),
            Cell::new(entry.total_events),
            Cell::new(entry.completed_events),
            rate_cell(entry.completion_rate),
            Cell::new(if goals.is_empty() { "None".to_string() } else { goals }),
        ]);
    }
    println!("{table}");
}

pub fn display_tree_statistics(kind: TaxonomyKind, forest: &[TreeStatistics]) {
    if forest.is_empty() {
        println!("No {} nodes found.", kind.label().to_lowercase());
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Events", "Completed", "Rate"]);
    let mut stack: Vec<(usize, &TreeStatistics)> = forest.iter().rev().map(|t| (0, t)).collect();
    while let Some((depth, node)) = stack.pop() {
        table.add_row(vec![
            Cell::new(short_id(node.id)),
            Cell::new(format!("{}{}", "  ".repeat(depth), node.name)),
            Cell::new(node.total_events),
            Cell::new(node.completed_events),
            rate_cell(node.completion_rate),
        ]);
        stack.extend(node.children.iter().rev().map(|child| (depth + 1, child)));
    }
    println!("{table}");
}
