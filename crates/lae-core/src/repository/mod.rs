use crate::calendar::{DayView, MonthView, WeekView};
use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::{
    DeletePolicies, DeleteSummary, EventDetails, EventFilter, NewEventData, NewNodeData,
    NewScheduleData, Schedule, ScheduleFilter, ScheduleWithDomain, ScheduledEvent, TaxonomyKind,
    TaxonomyNode, UpdateEventData, UpdateNodeData, UpdateScheduleData,
};
use crate::statistics::{NodeStatistics, SummaryStatistics, TreeStatistics};
use crate::taxonomy::TaxonomyTree;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

// Re-export domain modules
pub mod taxonomy;
pub mod schedules;
pub mod events;
pub mod calendar;
pub mod statistics;
pub mod filters;

/// Domain-specific trait for taxonomy operations (domains, activity types,
/// legacy activities)
#[async_trait]
pub trait TaxonomyRepository {
    async fn add_node(&self, kind: TaxonomyKind, data: NewNodeData) -> Result<TaxonomyNode, CoreError>;
    async fn find_node_by_id(&self, kind: TaxonomyKind, id: Uuid) -> Result<Option<TaxonomyNode>, CoreError>;
    /// Nodes whose id starts or ends with `short_id` (hyphens ignored).
    async fn find_nodes_by_short_id_prefix(&self, kind: TaxonomyKind, short_id: &str) -> Result<Vec<TaxonomyNode>, CoreError>;
    async fn find_nodes(&self, kind: TaxonomyKind) -> Result<Vec<TaxonomyNode>, CoreError>;
    async fn update_node(&self, kind: TaxonomyKind, id: Uuid, data: UpdateNodeData) -> Result<TaxonomyNode, CoreError>;
    async fn delete_node(&self, kind: TaxonomyKind, id: Uuid) -> Result<DeleteSummary, CoreError>;
    async fn find_tree(&self, kind: TaxonomyKind) -> Result<Vec<TaxonomyTree>, CoreError>;
}

/// Domain-specific trait for schedule operations
#[async_trait]
pub trait ScheduleRepository {
    async fn add_schedule(&self, data: NewScheduleData) -> Result<Schedule, CoreError>;
    async fn find_schedule_by_id(&self, id: Uuid) -> Result<Option<Schedule>, CoreError>;
    async fn find_schedules_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Schedule>, CoreError>;
    async fn find_schedules(&self, filter: &ScheduleFilter) -> Result<Vec<Schedule>, CoreError>;
    async fn find_schedules_with_domain(&self, filter: &ScheduleFilter) -> Result<Vec<ScheduleWithDomain>, CoreError>;
    async fn update_schedule(&self, id: Uuid, data: UpdateScheduleData) -> Result<Schedule, CoreError>;
    async fn delete_schedule(&self, id: Uuid) -> Result<(), CoreError>;
}

/// Domain-specific trait for scheduled event operations
#[async_trait]
pub trait EventRepository {
    async fn add_event(&self, data: NewEventData) -> Result<ScheduledEvent, CoreError>;
    async fn find_event_by_id(&self, id: Uuid) -> Result<Option<ScheduledEvent>, CoreError>;
    async fn find_events_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<ScheduledEvent>, CoreError>;
    async fn find_events(&self, filter: &EventFilter) -> Result<Vec<ScheduledEvent>, CoreError>;
    async fn find_events_with_details(&self, filter: &EventFilter) -> Result<Vec<EventDetails>, CoreError>;
    async fn update_event(&self, id: Uuid, data: UpdateEventData) -> Result<ScheduledEvent, CoreError>;
    async fn delete_event(&self, id: Uuid) -> Result<(), CoreError>;
}

/// Read-only calendar projections
#[async_trait]
pub trait CalendarRepository {
    async fn week_view(&self, date: NaiveDate) -> Result<WeekView, CoreError>;
    async fn month_view(&self, year: i32, month: u32) -> Result<MonthView, CoreError>;
    async fn day_view(&self, date: NaiveDate) -> Result<DayView, CoreError>;
}

/// Read-only statistics rollups
#[async_trait]
pub trait StatisticsRepository {
    async fn summary(&self) -> Result<SummaryStatistics, CoreError>;
    async fn node_statistics(&self, kind: TaxonomyKind, id: Uuid) -> Result<NodeStatistics, CoreError>;
    async fn tree_statistics(&self, kind: TaxonomyKind) -> Result<Vec<TreeStatistics>, CoreError>;
}

/// Main repository trait that composes all domain traits
#[async_trait]
pub trait Repository:
    TaxonomyRepository +
    ScheduleRepository +
    EventRepository +
    CalendarRepository +
    StatisticsRepository
{
    // This trait automatically composes all domain-specific repositories
    // Individual domain operations are defined in their respective traits
}

/// SQLite implementation of the repository pattern
pub struct SqliteRepository {
    pool: DbPool,
    delete_policies: DeletePolicies,
}

impl SqliteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self::with_delete_policies(pool, DeletePolicies::default())
    }

    pub fn with_delete_policies(pool: DbPool, delete_policies: DeletePolicies) -> Self {
        Self { pool, delete_policies }
    }

    /// Get a reference to the database pool for internal use across modules
    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub(crate) fn delete_policies(&self) -> &DeletePolicies {
        &self.delete_policies
    }
}

impl Repository for SqliteRepository {}

/// `LIKE` patterns matching ids whose hex form starts or ends with
/// `short_id`. Ids are stored as 16-byte blobs, so the comparison runs on
/// `hex(id)`. The leading digits of a UUIDv7 are a timestamp shared by rows
/// created close together, so displays show the random tail instead.
pub(crate) fn short_id_patterns(short_id: &str) -> (String, String) {
    let digits: String = short_id.chars().filter(|c| *c != '-').flat_map(char::to_lowercase).collect();
    (format!("{digits}%"), format!("%{digits}"))
}

/// Pushes `(id1, id2, ...)` as bound parameters.
pub(crate) fn push_id_list(qb: &mut QueryBuilder<'_, Sqlite>, ids: &[Uuid]) {
    qb.push("(");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}

/// Trims a user supplied name and rejects blank ones.
pub(crate) fn validate_name(name: &str, what: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{what} name must not be blank")));
    }
    Ok(trimmed.to_string())
}
