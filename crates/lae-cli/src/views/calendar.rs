use comfy_table::{Attribute, Cell, Color, Table};
use lae_core::calendar::{DayView, EventSummary, MonthView, SlotCell, WeekView};
use lae_core::models::{EventStatus, TimeSlot};
use owo_colors::OwoColorize;

fn summary_line(event: &EventSummary) -> String {
    let mut line = event.name.clone();
    if let Some(domain) = &event.domain_name {
        line.push_str(&format!(" [{domain}]"));
    }
    if event.status == EventStatus::Completed {
        line.push_str(" ✓");
    }
    line
}

fn cell_text(cell: &SlotCell) -> String {
    match &cell.event {
        None => String::new(),
        Some(primary) if cell.stacked.is_empty() => summary_line(primary),
        Some(primary) => format!("{} (+{})", summary_line(primary), cell.stacked.len()),
    }
}

pub fn display_week(week: &WeekView) {
    println!(
        "{} {} to {}",
        "Week".bold(),
        week.week_start.format("%a %Y-%m-%d"),
        week.week_end.format("%a %Y-%m-%d")
    );

    let mut header = vec![Cell::new("Slot")];
    header.extend(
        week.days
            .iter()
            .map(|day| Cell::new(day.date.format("%a %m-%d")).add_attribute(Attribute::Bold)),
    );
    let mut table = Table::new();
    table.set_header(header);

    for (index, slot) in TimeSlot::ALL.iter().enumerate() {
        let mut row = vec![Cell::new(slot.label())];
        row.extend(week.days.iter().map(|day| {
            let cell = &day.slots[index];
            let text = Cell::new(cell_text(cell));
            match &cell.event {
                Some(primary) if primary.status == EventStatus::Completed => text.fg(Color::Green),
                _ => text,
            }
        }));
        table.add_row(row);
    }
    println!("{table}");
}

pub fn display_month(month: &MonthView) {
    println!("{} {}", month.month_name.bold(), month.year.bold());

    let mut table = Table::new();
    table.set_header(vec!["Date", "Day", "Events", "Names"]);
    for day in &month.days {
        let names = day
            .events
            .iter()
            .map(|e| format!("{} {}", e.time_slot, summary_line(e)))
            .collect::<Vec<_>>()
            .join("\n");
        let count_cell = if day.event_count == 0 {
            Cell::new(day.event_count).fg(Color::DarkGrey)
        } else {
            Cell::new(day.event_count)
        };
        table.add_row(vec![
            Cell::new(day.date.format("%d").to_string()),
            Cell::new(&day.weekday[..3]),
            count_cell,
            Cell::new(names),
        ]);
    }
    println!("{table}");

    if month.schedules.is_empty() {
        println!("No active schedules this month.");
        return;
    }
    println!("{}", "Active schedules".bold());
    for schedule in &month.schedules {
        let start = schedule.start_date.map_or("…".to_string(), |d| d.to_string());
        let deadline = schedule.deadline.map_or("…".to_string(), |d| d.to_string());
        println!("  {} ({} to {}, {})", schedule.name, start, deadline, schedule.status);
    }
}

pub fn display_day(day: &DayView) {
    println!("{} {}", day.weekday.bold(), day.date);

    let mut table = Table::new();
    table.set_header(vec!["Slot", "Name", "Event", "Stacked"]);
    for cell in &day.slots {
        let event_cell = match &cell.event {
            Some(primary) => Cell::new(summary_line(primary)),
            None => Cell::new("free").fg(Color::DarkGrey),
        };
        let stacked = cell
            .stacked
            .iter()
            .map(|e| format!("{}: {}", e.canvas_position_y, summary_line(e)))
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(vec![
            Cell::new(cell.time_slot),
            Cell::new(cell.slot_name),
            event_cell,
            Cell::new(stacked),
        ]);
    }
    println!("{table}");
}
