use crate::models::{EventFilter, ScheduleFilter, DEFAULT_EVENT_LIMIT};
use sqlx::{Encode, QueryBuilder, Sqlite, SqliteConnection, Type};
use uuid::Uuid;

/// Utility functions for turning listing filters into SQL
pub struct SqlFilterBuilder;

impl SqlFilterBuilder {
    /// Appends ` WHERE ...` for an event filter over alias `e`.
    pub fn push_event_filter(filter: &EventFilter, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(" WHERE 1 = 1");
        if let Some(start) = filter.start_date {
            qb.push(" AND e.event_date >= ");
            qb.push_bind(start);
        }
        if let Some(end) = filter.end_date {
            qb.push(" AND e.event_date <= ");
            qb.push_bind(end);
        }
        if let Some(domain_id) = filter.domain_id {
            qb.push(" AND e.domain_id = ");
            qb.push_bind(domain_id);
        }
        if let Some(activity_type_id) = filter.activity_type_id {
            qb.push(" AND e.activity_type_id = ");
            qb.push_bind(activity_type_id);
        }
        if let Some(status) = filter.status {
            qb.push(" AND e.status = ");
            qb.push_bind(status);
        }
    }

    /// Appends the calendar ordering and paging for an event filter.
    pub fn push_event_paging(filter: &EventFilter, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(" ORDER BY e.event_date, e.time_slot, e.canvas_position_y, e.rowid LIMIT ");
        qb.push_bind(filter.limit.unwrap_or(DEFAULT_EVENT_LIMIT).max(0));
        qb.push(" OFFSET ");
        qb.push_bind(filter.offset.unwrap_or(0).max(0));
    }

    /// Appends ` WHERE ...` for a schedule filter over alias `s`.
    pub fn push_schedule_filter(filter: &ScheduleFilter, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(" WHERE 1 = 1");
        if let Some(domain_id) = filter.domain_id {
            qb.push(" AND s.domain_id = ");
            qb.push_bind(domain_id);
        }
        if let Some(status) = filter.status {
            qb.push(" AND s.status = ");
            qb.push_bind(status);
        }
        if let Some((from, to)) = filter.overlapping {
            // Open bounds count as unbounded.
            qb.push(" AND (s.start_date IS NULL OR s.start_date <= ");
            qb.push_bind(to);
            qb.push(") AND (s.deadline IS NULL OR s.deadline >= ");
            qb.push_bind(from);
            qb.push(")");
        }
        qb.push(" ORDER BY s.rowid");
    }
}

/// `UPDATE <table> SET a = ?, b = ? WHERE id = ?` built one column at a time.
pub(crate) struct Assignments<'q> {
    qb: QueryBuilder<'q, Sqlite>,
    updated: bool,
}

impl<'q> Assignments<'q> {
    pub(crate) fn new(table: &str) -> Self {
        Self {
            qb: QueryBuilder::new(format!("UPDATE {table} SET ")),
            updated: false,
        }
    }

    pub(crate) fn set<T>(&mut self, column: &str, value: T)
    where
        T: 'q + Encode<'q, Sqlite> + Type<Sqlite> + Send,
    {
        if self.updated {
            self.qb.push(", ");
        }
        self.qb.push(column);
        self.qb.push(" = ");
        self.qb.push_bind(value);
        self.updated = true;
    }

    pub(crate) fn is_empty(&self) -> bool {
        !self.updated
    }

    /// Runs the update against row `id`, returning the affected row count.
    pub(crate) async fn execute(mut self, id: Uuid, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
        if !self.updated {
            return Ok(0);
        }
        self.qb.push(" WHERE id = ");
        self.qb.push_bind(id);
        let result = self.qb.build().execute(conn).await?;
        Ok(result.rows_affected())
    }
}
