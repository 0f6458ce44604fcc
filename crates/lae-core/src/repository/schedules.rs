use crate::error::CoreError;
use crate::models::{
    NewScheduleData, Schedule, ScheduleFilter, ScheduleStatus, ScheduleWithDomain, TaxonomyKind,
    UpdateScheduleData,
};
use crate::repository::filters::{Assignments, SqlFilterBuilder};
use crate::repository::{short_id_patterns, validate_name, SqliteRepository};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use tracing::{debug, info};
use uuid::Uuid;

#[async_trait]
impl super::ScheduleRepository for SqliteRepository {
    async fn add_schedule(&self, data: NewScheduleData) -> Result<Schedule, CoreError> {
        let name = validate_name(&data.name, "Schedule")?;
        check_date_range(data.start_date, data.deadline)?;

        let mut tx = self.pool().begin().await?;
        Self::require_owning_domain(&mut tx, data.domain_id).await?;

        let schedule: Schedule = sqlx::query_as(
            r#"INSERT INTO schedules (id, domain_id, name, description, start_date, deadline, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(data.domain_id)
        .bind(name)
        .bind(data.description)
        .bind(data.start_date)
        .bind(data.deadline)
        .bind(data.status.unwrap_or(ScheduleStatus::Ongoing))
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(id = %schedule.id, name = %schedule.name, domain_id = %schedule.domain_id, "added schedule");
        Ok(schedule)
    }

    async fn find_schedule_by_id(&self, id: Uuid) -> Result<Option<Schedule>, CoreError> {
        let schedule = sqlx::query_as("SELECT * FROM schedules WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(schedule)
    }

    async fn find_schedules_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Schedule>, CoreError> {
        let (head, tail) = short_id_patterns(short_id);
        let schedules = sqlx::query_as(
            "SELECT * FROM schedules WHERE lower(hex(id)) LIKE $1 OR lower(hex(id)) LIKE $2 ORDER BY rowid",
        )
        .bind(head)
        .bind(tail)
        .fetch_all(self.pool())
        .await?;
        Ok(schedules)
    }

    async fn find_schedules(&self, filter: &ScheduleFilter) -> Result<Vec<Schedule>, CoreError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT s.* FROM schedules s");
        SqlFilterBuilder::push_schedule_filter(filter, &mut qb);
        let schedules: Vec<Schedule> = qb.build_query_as().fetch_all(self.pool()).await?;
        debug!(count = schedules.len(), "loaded schedules");
        Ok(schedules)
    }

    async fn find_schedules_with_domain(&self, filter: &ScheduleFilter) -> Result<Vec<ScheduleWithDomain>, CoreError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT s.*, d.name AS domain_name FROM schedules s LEFT JOIN domains d ON d.id = s.domain_id",
        );
        SqlFilterBuilder::push_schedule_filter(filter, &mut qb);
        let schedules = qb.build_query_as().fetch_all(self.pool()).await?;
        Ok(schedules)
    }

    async fn update_schedule(&self, id: Uuid, data: UpdateScheduleData) -> Result<Schedule, CoreError> {
        let mut tx = self.pool().begin().await?;
        let current = Self::require_schedule(&mut tx, id).await?;

        let start_date = data.start_date.unwrap_or(current.start_date);
        let deadline = data.deadline.unwrap_or(current.deadline);
        check_date_range(start_date, deadline)?;

        let mut set = Assignments::new("schedules");
        if let Some(domain_id) = data.domain_id {
            Self::require_owning_domain(&mut tx, domain_id).await?;
            set.set("domain_id", domain_id);
        }
        if let Some(name) = &data.name {
            set.set("name", validate_name(name, "Schedule")?);
        }
        if let Some(description) = data.description {
            set.set("description", description);
        }
        if let Some(start_date) = data.start_date {
            set.set("start_date", start_date);
        }
        if let Some(deadline) = data.deadline {
            set.set("deadline", deadline);
        }
        if let Some(status) = data.status {
            set.set("status", status);
        }

        if set.is_empty() {
            return Ok(current);
        }
        set.execute(id, &mut tx).await?;
        let updated = Self::require_schedule(&mut tx, id).await?;
        tx.commit().await?;

        info!(%id, "updated schedule");
        Ok(updated)
    }

    async fn delete_schedule(&self, id: Uuid) -> Result<(), CoreError> {
        let result = sqlx::query("DELETE FROM schedules WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Schedule with id {id} not found")));
        }
        info!(%id, "deleted schedule");
        Ok(())
    }
}

impl SqliteRepository {
    pub(crate) async fn require_schedule(conn: &mut SqliteConnection, id: Uuid) -> Result<Schedule, CoreError> {
        let schedule: Option<Schedule> = sqlx::query_as("SELECT * FROM schedules WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        schedule.ok_or_else(|| CoreError::NotFound(format!("Schedule with id {id} not found")))
    }

    /// Schedules must belong to an existing domain; a bad `domain_id` is
    /// rejected as input.
    async fn require_owning_domain(conn: &mut SqliteConnection, domain_id: Uuid) -> Result<(), CoreError> {
        match Self::require_node(conn, TaxonomyKind::Domain, domain_id).await {
            Ok(_) => Ok(()),
            Err(CoreError::NotFound(msg)) => Err(CoreError::Validation(msg)),
            Err(err) => Err(err),
        }
    }
}

fn check_date_range(start_date: Option<NaiveDate>, deadline: Option<NaiveDate>) -> Result<(), CoreError> {
    match (start_date, deadline) {
        (Some(start), Some(end)) if start > end => Err(CoreError::Validation(format!(
            "Schedule start date {start} is after its deadline {end}"
        ))),
        _ => Ok(()),
    }
}
