use crate::error::CoreError;
use crate::models::{
    EventDetails, EventFilter, EventStatus, NewEventData, ScheduledEvent, TaxonomyKind, TimeSlot,
    UpdateEventData,
};
use crate::placement::{resolve_placement, LaneRequest, Placement};
use crate::repository::filters::{Assignments, SqlFilterBuilder};
use crate::repository::{short_id_patterns, validate_name, SqliteRepository};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use tracing::{debug, info, warn};
use uuid::Uuid;

const EVENT_DETAILS_SELECT: &str = r#"SELECT e.*,
    d.name AS domain_name,
    t.name AS activity_type_name,
    s.name AS schedule_name,
    a.name AS activity_name
FROM scheduled_events e
LEFT JOIN domains d ON d.id = e.domain_id
LEFT JOIN activity_types t ON t.id = e.activity_type_id
LEFT JOIN schedules s ON s.id = e.schedule_id
LEFT JOIN activities a ON a.id = e.activity_id"#;

#[async_trait]
impl super::EventRepository for SqliteRepository {
    async fn add_event(&self, data: NewEventData) -> Result<ScheduledEvent, CoreError> {
        let time_slot = parse_slot(data.time_slot)?;
        let name = validate_name(&data.name, "Event")?;
        check_duration(data.duration_minutes)?;

        let mut tx = self.pool().begin().await?;
        Self::check_event_links(
            &mut tx,
            data.domain_id,
            data.activity_type_id,
            data.schedule_id,
            data.activity_id,
        )
        .await?;

        let occupied = Self::occupied_lanes(&mut tx, data.event_date, time_slot, None).await?;
        let placement = place(
            LaneRequest::from_requested(data.canvas_position_y),
            &occupied,
            data.event_date,
            time_slot,
        )?;

        let now = Utc::now();
        let event: ScheduledEvent = sqlx::query_as(
            r#"INSERT INTO scheduled_events (
                id, event_date, time_slot, name, notes, status,
                domain_id, activity_type_id, schedule_id, activity_id, goal,
                duration_minutes, start_time, is_precise, canvas_position_y,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(data.event_date)
        .bind(time_slot)
        .bind(name)
        .bind(data.notes)
        .bind(data.status.unwrap_or(EventStatus::Planned))
        .bind(data.domain_id)
        .bind(data.activity_type_id)
        .bind(data.schedule_id)
        .bind(data.activity_id)
        .bind(data.goal)
        .bind(data.duration_minutes)
        .bind(data.start_time)
        .bind(data.is_precise)
        .bind(placement.canvas_position_y)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(CoreError::from_placement_write)?;

        tx.commit().await?;
        info!(
            id = %event.id,
            date = %event.event_date,
            slot = %event.time_slot,
            lane = event.canvas_position_y,
            "added event"
        );
        Ok(event)
    }

    async fn find_event_by_id(&self, id: Uuid) -> Result<Option<ScheduledEvent>, CoreError> {
        let event = sqlx::query_as("SELECT * FROM scheduled_events WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(event)
    }

    async fn find_events_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<ScheduledEvent>, CoreError> {
        let (head, tail) = short_id_patterns(short_id);
        let events = sqlx::query_as(
            "SELECT * FROM scheduled_events WHERE lower(hex(id)) LIKE $1 OR lower(hex(id)) LIKE $2 ORDER BY rowid",
        )
        .bind(head)
        .bind(tail)
        .fetch_all(self.pool())
        .await?;
        Ok(events)
    }

    async fn find_events(&self, filter: &EventFilter) -> Result<Vec<ScheduledEvent>, CoreError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT e.* FROM scheduled_events e");
        SqlFilterBuilder::push_event_filter(filter, &mut qb);
        SqlFilterBuilder::push_event_paging(filter, &mut qb);
        let events: Vec<ScheduledEvent> = qb.build_query_as().fetch_all(self.pool()).await?;
        debug!(count = events.len(), "loaded events");
        Ok(events)
    }

    async fn find_events_with_details(&self, filter: &EventFilter) -> Result<Vec<EventDetails>, CoreError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(EVENT_DETAILS_SELECT);
        SqlFilterBuilder::push_event_filter(filter, &mut qb);
        SqlFilterBuilder::push_event_paging(filter, &mut qb);
        let events: Vec<EventDetails> = qb.build_query_as().fetch_all(self.pool()).await?;
        debug!(count = events.len(), "loaded events with details");
        Ok(events)
    }

    async fn update_event(&self, id: Uuid, data: UpdateEventData) -> Result<ScheduledEvent, CoreError> {
        let new_slot = data.time_slot.map(parse_slot).transpose()?;
        if let Some(duration) = data.duration_minutes {
            check_duration(duration)?;
        }

        let mut tx = self.pool().begin().await?;
        let current = Self::require_event(&mut tx, id).await?;

        Self::check_event_links(
            &mut tx,
            data.domain_id.flatten(),
            data.activity_type_id.flatten(),
            data.schedule_id.flatten(),
            data.activity_id.flatten(),
        )
        .await?;

        let event_date = data.event_date.unwrap_or(current.event_date);
        let time_slot = new_slot.unwrap_or(current.time_slot);
        let moves = event_date != current.event_date
            || time_slot != current.time_slot
            || data.canvas_position_y.is_some_and(|lane| lane != current.canvas_position_y);

        let mut set = Assignments::new("scheduled_events");
        if moves {
            let occupied = Self::occupied_lanes(&mut tx, event_date, time_slot, Some(id)).await?;
            let placement = place(
                LaneRequest::from_requested(data.canvas_position_y),
                &occupied,
                event_date,
                time_slot,
            )?;
            set.set("event_date", event_date);
            set.set("time_slot", time_slot);
            set.set("canvas_position_y", placement.canvas_position_y);
        }
        if let Some(name) = &data.name {
            set.set("name", validate_name(name, "Event")?);
        }
        if let Some(notes) = data.notes {
            set.set("notes", notes);
        }
        if let Some(status) = data.status {
            set.set("status", status);
        }
        if let Some(domain_id) = data.domain_id {
            set.set("domain_id", domain_id);
        }
        if let Some(activity_type_id) = data.activity_type_id {
            set.set("activity_type_id", activity_type_id);
        }
        if let Some(schedule_id) = data.schedule_id {
            set.set("schedule_id", schedule_id);
        }
        if let Some(activity_id) = data.activity_id {
            set.set("activity_id", activity_id);
        }
        if let Some(goal) = data.goal {
            set.set("goal", goal);
        }
        if let Some(duration_minutes) = data.duration_minutes {
            set.set("duration_minutes", duration_minutes);
        }
        if let Some(start_time) = data.start_time {
            set.set("start_time", start_time);
        }
        if let Some(is_precise) = data.is_precise {
            set.set("is_precise", is_precise);
        }

        if set.is_empty() {
            return Ok(current);
        }
        set.set("updated_at", Utc::now());
        set.execute(id, &mut tx)
            .await
            .map_err(CoreError::from_placement_write)?;
        let updated = Self::require_event(&mut tx, id).await?;
        tx.commit().await?;

        info!(%id, moved = moves, "updated event");
        Ok(updated)
    }

    async fn delete_event(&self, id: Uuid) -> Result<(), CoreError> {
        let result = sqlx::query("DELETE FROM scheduled_events WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Event with id {id} not found")));
        }
        info!(%id, "deleted event");
        Ok(())
    }
}

impl SqliteRepository {
    pub(crate) async fn require_event(conn: &mut SqliteConnection, id: Uuid) -> Result<ScheduledEvent, CoreError> {
        let event: Option<ScheduledEvent> = sqlx::query_as("SELECT * FROM scheduled_events WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        event.ok_or_else(|| CoreError::NotFound(format!("Event with id {id} not found")))
    }

    /// Every set link must point at an existing row. The first missing one
    /// is reported.
    async fn check_event_links(
        conn: &mut SqliteConnection,
        domain_id: Option<Uuid>,
        activity_type_id: Option<Uuid>,
        schedule_id: Option<Uuid>,
        activity_id: Option<Uuid>,
    ) -> Result<(), CoreError> {
        if let Some(id) = domain_id {
            Self::require_node(conn, TaxonomyKind::Domain, id).await?;
        }
        if let Some(id) = activity_type_id {
            Self::require_node(conn, TaxonomyKind::ActivityType, id).await?;
        }
        if let Some(id) = schedule_id {
            Self::require_schedule(conn, id).await?;
        }
        if let Some(id) = activity_id {
            Self::require_node(conn, TaxonomyKind::Activity, id).await?;
        }
        Ok(())
    }

    /// Lanes taken in `(date, slot)`, optionally ignoring one event.
    async fn occupied_lanes(
        conn: &mut SqliteConnection,
        event_date: NaiveDate,
        time_slot: TimeSlot,
        exclude: Option<Uuid>,
    ) -> Result<Vec<i64>, CoreError> {
        let lanes: Vec<(i64,)> = sqlx::query_as(
            r#"SELECT canvas_position_y FROM scheduled_events
            WHERE event_date = $1 AND time_slot = $2 AND ($3 IS NULL OR id <> $3)
            "#,
        )
        .bind(event_date)
        .bind(time_slot)
        .bind(exclude)
        .fetch_all(&mut *conn)
        .await?;
        Ok(lanes.into_iter().map(|(lane,)| lane).collect())
    }
}

fn parse_slot(code: i64) -> Result<TimeSlot, CoreError> {
    TimeSlot::try_from(code).map_err(|e| CoreError::Validation(e.to_string()))
}

fn check_duration(duration_minutes: Option<i64>) -> Result<(), CoreError> {
    match duration_minutes {
        Some(minutes) if minutes <= 0 => Err(CoreError::Validation(format!(
            "duration_minutes must be positive, got {minutes}"
        ))),
        _ => Ok(()),
    }
}

fn place(
    request: LaneRequest,
    occupied: &[i64],
    event_date: NaiveDate,
    time_slot: TimeSlot,
) -> Result<Placement, CoreError> {
    match resolve_placement(request, occupied) {
        Ok(placement) => {
            if placement.stacked {
                warn!(
                    date = %event_date,
                    slot = %time_slot,
                    lane = placement.canvas_position_y,
                    "primary lane taken, stacking event"
                );
            }
            Ok(placement)
        }
        Err(err) => {
            warn!(date = %event_date, slot = %time_slot, ?request, "rejected event placement");
            Err(err)
        }
    }
}
