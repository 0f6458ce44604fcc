use crate::error::CoreError;
use crate::models::{EventStatus, TaxonomyKind, TimeSlot};
use crate::repository::{SqliteRepository, TaxonomyRepository};
use crate::statistics::{
    completion_rate, node_statistics, slot_distribution, tree_statistics, EventLink,
    NodeStatistics, StatusCount, SummaryStatistics, TreeStatistics,
};
use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

#[async_trait]
impl super::StatisticsRepository for SqliteRepository {
    async fn summary(&self) -> Result<SummaryStatistics, CoreError> {
        let total_activities = self.count_rows("activities").await?;
        let total_domains = self.count_rows("domains").await?;
        let total_activity_types = self.count_rows("activity_types").await?;
        let total_schedules = self.count_rows("schedules").await?;
        let total_events = self.count_rows("scheduled_events").await?;

        let status_distribution: Vec<StatusCount> = sqlx::query_as(
            "SELECT status, COUNT(*) AS count FROM scheduled_events GROUP BY status ORDER BY status",
        )
        .fetch_all(self.pool())
        .await?;
        let completed_events = status_distribution
            .iter()
            .find(|row| row.status == EventStatus::Completed)
            .map_or(0, |row| row.count);

        let slot_counts: Vec<(TimeSlot, i64)> = sqlx::query_as(
            "SELECT time_slot, COUNT(*) FROM scheduled_events GROUP BY time_slot ORDER BY time_slot",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(SummaryStatistics {
            total_activities,
            total_domains,
            total_activity_types,
            total_schedules,
            total_events,
            completed_events,
            completion_rate: completion_rate(completed_events, total_events),
            status_distribution,
            timeslot_distribution: slot_distribution(&slot_counts),
        })
    }

    async fn node_statistics(&self, kind: TaxonomyKind, id: Uuid) -> Result<NodeStatistics, CoreError> {
        let root = self
            .find_node_by_id(kind, id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("{} with id {} not found", kind.label(), id)))?;
        let nodes = self.find_nodes(kind).await?;
        let events = self.event_links(kind).await?;
        Ok(node_statistics(kind, &nodes, &root, &events))
    }

    async fn tree_statistics(&self, kind: TaxonomyKind) -> Result<Vec<TreeStatistics>, CoreError> {
        let forest = self.find_tree(kind).await?;
        let events = self.event_links(kind).await?;
        Ok(tree_statistics(&forest, &events))
    }
}

impl SqliteRepository {
    async fn count_rows(&self, table: &str) -> Result<i64, CoreError> {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(self.pool())
            .await?;
        Ok(count.0)
    }

    /// Every event linked to some node of `kind`.
    async fn event_links(&self, kind: TaxonomyKind) -> Result<Vec<EventLink>, CoreError> {
        let column = kind.event_column();
        let links: Vec<EventLink> = sqlx::query_as(&format!(
            r#"SELECT {column} AS link_id, status, event_date, goal
            FROM scheduled_events
            WHERE {column} IS NOT NULL
            ORDER BY event_date, time_slot
            "#
        ))
        .fetch_all(self.pool())
        .await?;
        debug!(%kind, count = links.len(), "loaded event links");
        Ok(links)
    }
}
