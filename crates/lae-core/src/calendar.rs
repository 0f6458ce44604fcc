//! Dense calendar grids built from event rows.
//!
//! The projections never fail on missing linked records: names come from
//! outer joins and are simply `None`.

use crate::error::CoreError;
use crate::models::{EventDetails, EventStatus, Schedule, TimeSlot};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use serde::Serialize;
use uuid::Uuid;

/// Compact event shape used inside calendar cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSummary {
    pub id: Uuid,
    pub name: String,
    pub status: EventStatus,
    pub time_slot: TimeSlot,
    pub canvas_position_y: i64,
    pub notes: Option<String>,
    pub goal: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub duration_minutes: Option<i64>,
    pub is_precise: bool,
    pub domain_id: Option<Uuid>,
    pub domain_name: Option<String>,
    pub activity_type_id: Option<Uuid>,
    pub activity_type_name: Option<String>,
    pub schedule_id: Option<Uuid>,
    pub schedule_name: Option<String>,
    pub activity_id: Option<Uuid>,
    pub activity_name: Option<String>,
}

impl From<&EventDetails> for EventSummary {
    fn from(details: &EventDetails) -> Self {
        let event = &details.event;
        Self {
            id: event.id,
            name: event.name.clone(),
            status: event.status,
            time_slot: event.time_slot,
            canvas_position_y: event.canvas_position_y,
            notes: event.notes.clone(),
            goal: event.goal.clone(),
            start_time: event.start_time,
            duration_minutes: event.duration_minutes,
            is_precise: event.is_precise,
            domain_id: event.domain_id,
            domain_name: details.domain_name.clone(),
            activity_type_id: event.activity_type_id,
            activity_type_name: details.activity_type_name.clone(),
            schedule_id: event.schedule_id,
            schedule_name: details.schedule_name.clone(),
            activity_id: event.activity_id,
            activity_name: details.activity_name.clone(),
        }
    }
}

/// One `(date, slot)` cell. `event` is the lowest lane; `stacked` holds the
/// remaining lanes in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotCell {
    pub time_slot: TimeSlot,
    pub slot_name: &'static str,
    pub event: Option<EventSummary>,
    pub stacked: Vec<EventSummary>,
}

impl SlotCell {
    pub fn is_empty(&self) -> bool {
        self.event.is_none()
    }

    pub fn event_count(&self) -> usize {
        usize::from(self.event.is_some()) + self.stacked.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayColumn {
    pub date: NaiveDate,
    pub weekday: String,
    pub slots: Vec<SlotCell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekView {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub days: Vec<DayColumn>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthDay {
    pub date: NaiveDate,
    pub day: u32,
    pub weekday: String,
    pub event_count: usize,
    pub events: Vec<EventSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub days: Vec<MonthDay>,
    /// Schedules whose date range overlaps the month.
    pub schedules: Vec<Schedule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayView {
    pub date: NaiveDate,
    pub weekday: String,
    pub slots: Vec<SlotCell>,
}

fn weekday_name(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

/// The Monday-aligned week containing `date`.
pub fn week_dates(date: NaiveDate) -> [NaiveDate; 7] {
    let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
    std::array::from_fn(|offset| monday + Duration::days(offset as i64))
}

/// Every day of `year`-`month`, in order.
pub fn month_dates(year: i32, month: u32) -> Result<Vec<NaiveDate>, CoreError> {
    if !(1..=12).contains(&month) {
        return Err(CoreError::Validation(format!(
            "Invalid month: {month}. Must be between 1 and 12"
        )));
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| CoreError::Validation(format!("Invalid year: {year}")))?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| CoreError::Validation(format!("Invalid year: {year}")))?;

    Ok(first.iter_days().take_while(|day| *day < next_first).collect())
}

/// Builds the five cells of one day from that day's events.
pub fn day_slots(date: NaiveDate, events: &[EventDetails]) -> Vec<SlotCell> {
    TimeSlot::ALL
        .iter()
        .map(|&slot| {
            let mut in_cell: Vec<&EventDetails> = events
                .iter()
                .filter(|e| e.event.event_date == date && e.event.time_slot == slot)
                .collect();
            in_cell.sort_by_key(|e| e.event.canvas_position_y);
            let mut summaries = in_cell.into_iter().map(EventSummary::from);
            let event = summaries.next();
            SlotCell {
                time_slot: slot,
                slot_name: slot.label(),
                event,
                stacked: summaries.collect(),
            }
        })
        .collect()
}

pub fn build_week_view(date: NaiveDate, events: &[EventDetails]) -> WeekView {
    let dates = week_dates(date);
    WeekView {
        week_start: dates[0],
        week_end: dates[6],
        days: dates
            .iter()
            .map(|&day| DayColumn {
                date: day,
                weekday: weekday_name(day),
                slots: day_slots(day, events),
            })
            .collect(),
    }
}

pub fn build_month_view(
    year: i32,
    month: u32,
    events: &[EventDetails],
    schedules: Vec<Schedule>,
) -> Result<MonthView, CoreError> {
    let dates = month_dates(year, month)?;
    let (first, last) = (dates[0], dates[dates.len() - 1]);

    let days = dates
        .iter()
        .map(|&day| {
            let mut on_day: Vec<&EventDetails> =
                events.iter().filter(|e| e.event.event_date == day).collect();
            on_day.sort_by_key(|e| (e.event.time_slot, e.event.canvas_position_y));
            let events: Vec<EventSummary> = on_day.into_iter().map(EventSummary::from).collect();
            MonthDay {
                date: day,
                day: day.day(),
                weekday: weekday_name(day),
                event_count: events.len(),
                events,
            }
        })
        .collect();

    Ok(MonthView {
        year,
        month,
        month_name: first.format("%B").to_string(),
        days,
        schedules: schedules
            .into_iter()
            .filter(|s| s.overlaps(first, last))
            .collect(),
    })
}

pub fn build_day_view(date: NaiveDate, events: &[EventDetails]) -> DayView {
    DayView {
        date,
        weekday: weekday_name(date),
        slots: day_slots(date, events),
    }
}
