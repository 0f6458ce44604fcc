use crate::error::CoreError;
use crate::models::{
    DeletePolicy, DeleteSummary, NewNodeData, TaxonomyKind, TaxonomyNode, UpdateNodeData,
};
use crate::repository::filters::Assignments;
use crate::repository::{push_id_list, short_id_patterns, validate_name, SqliteRepository};
use crate::taxonomy::{build_forest, descendant_closure, would_create_cycle, TaxonomyTree};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use tracing::{debug, info};
use uuid::Uuid;

#[async_trait]
impl super::TaxonomyRepository for SqliteRepository {
    async fn add_node(&self, kind: TaxonomyKind, data: NewNodeData) -> Result<TaxonomyNode, CoreError> {
        let name = validate_name(&data.name, kind.label())?;
        let mut tx = self.pool().begin().await?;

        if let Some(parent_id) = data.parent_id {
            Self::require_parent(&mut tx, kind, parent_id).await?;
        }

        let node: TaxonomyNode = sqlx::query_as(&format!(
            r#"INSERT INTO {} (id, name, description, parent_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, parent_id, created_at
            "#,
            kind.table()
        ))
        .bind(Uuid::now_v7())
        .bind(name)
        .bind(data.description)
        .bind(data.parent_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(%kind, id = %node.id, name = %node.name, "added taxonomy node");
        Ok(node)
    }

    async fn find_node_by_id(&self, kind: TaxonomyKind, id: Uuid) -> Result<Option<TaxonomyNode>, CoreError> {
        let node = sqlx::query_as(&format!("SELECT * FROM {} WHERE id = $1", kind.table()))
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(node)
    }

    async fn find_nodes_by_short_id_prefix(
        &self,
        kind: TaxonomyKind,
        short_id: &str,
    ) -> Result<Vec<TaxonomyNode>, CoreError> {
        let (head, tail) = short_id_patterns(short_id);
        let nodes = sqlx::query_as(&format!(
            "SELECT * FROM {} WHERE lower(hex(id)) LIKE $1 OR lower(hex(id)) LIKE $2 ORDER BY rowid",
            kind.table()
        ))
        .bind(head)
        .bind(tail)
        .fetch_all(self.pool())
        .await?;
        Ok(nodes)
    }

    async fn find_nodes(&self, kind: TaxonomyKind) -> Result<Vec<TaxonomyNode>, CoreError> {
        let nodes: Vec<TaxonomyNode> =
            sqlx::query_as(&format!("SELECT * FROM {} ORDER BY rowid", kind.table()))
                .fetch_all(self.pool())
                .await?;
        debug!(%kind, count = nodes.len(), "loaded taxonomy nodes");
        Ok(nodes)
    }

    async fn update_node(
        &self,
        kind: TaxonomyKind,
        id: Uuid,
        data: UpdateNodeData,
    ) -> Result<TaxonomyNode, CoreError> {
        let mut tx = self.pool().begin().await?;
        let current = Self::require_node(&mut tx, kind, id).await?;

        let mut set = Assignments::new(kind.table());
        if let Some(name) = &data.name {
            set.set("name", validate_name(name, kind.label())?);
        }
        if let Some(description) = data.description {
            set.set("description", description);
        }
        if let Some(parent_id) = data.parent_id {
            if let Some(parent_id) = parent_id {
                Self::check_new_parent(&mut tx, kind, &current, parent_id).await?;
            }
            set.set("parent_id", parent_id);
        }

        if set.is_empty() {
            return Ok(current);
        }
        set.execute(id, &mut tx).await?;
        let updated = Self::require_node(&mut tx, kind, id).await?;
        tx.commit().await?;

        info!(%kind, %id, "updated taxonomy node");
        Ok(updated)
    }

    async fn delete_node(&self, kind: TaxonomyKind, id: Uuid) -> Result<DeleteSummary, CoreError> {
        let mut tx = self.pool().begin().await?;
        let node = Self::require_node(&mut tx, kind, id).await?;
        let policy = self.delete_policies().for_kind(kind);

        let doomed = match policy {
            DeletePolicy::Restrict => {
                let child_count: (i64,) = sqlx::query_as(&format!(
                    "SELECT COUNT(*) FROM {} WHERE parent_id = $1",
                    kind.table()
                ))
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
                if child_count.0 > 0 {
                    return Err(CoreError::Validation(format!(
                        "Cannot delete {} '{}' because it has {} child node(s). Delete or move them first.",
                        kind.label().to_lowercase(),
                        node.name,
                        child_count.0
                    )));
                }
                vec![id]
            }
            DeletePolicy::Orphan => vec![id],
            DeletePolicy::Cascade => {
                let nodes = Self::all_nodes(&mut tx, kind).await?;
                descendant_closure(&nodes, id)
            }
        };

        let mut summary = DeleteSummary::default();
        if kind == TaxonomyKind::Domain {
            // Counted here because the foreign key cascade reports nothing back.
            let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("DELETE FROM schedules WHERE domain_id IN ");
            push_id_list(&mut qb, &doomed);
            summary.schedules_deleted = qb.build().execute(&mut *tx).await?.rows_affected();
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!("DELETE FROM {} WHERE id IN ", kind.table()));
        push_id_list(&mut qb, &doomed);
        summary.nodes_deleted = qb.build().execute(&mut *tx).await?.rows_affected();

        tx.commit().await?;
        info!(
            %kind,
            %id,
            ?policy,
            nodes_deleted = summary.nodes_deleted,
            schedules_deleted = summary.schedules_deleted,
            "deleted taxonomy node"
        );
        Ok(summary)
    }

    async fn find_tree(&self, kind: TaxonomyKind) -> Result<Vec<TaxonomyTree>, CoreError> {
        let nodes = self.find_nodes(kind).await?;
        Ok(build_forest(&nodes))
    }
}

impl SqliteRepository {
    /// Loads a node inside a transaction, or fails with `NotFound`.
    pub(crate) async fn require_node(
        conn: &mut SqliteConnection,
        kind: TaxonomyKind,
        id: Uuid,
    ) -> Result<TaxonomyNode, CoreError> {
        let node: Option<TaxonomyNode> =
            sqlx::query_as(&format!("SELECT * FROM {} WHERE id = $1", kind.table()))
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;
        node.ok_or_else(|| CoreError::NotFound(format!("{} with id {} not found", kind.label(), id)))
    }

    /// Like [`Self::require_node`], but a missing parent is bad input
    /// rather than a missing resource.
    async fn require_parent(
        conn: &mut SqliteConnection,
        kind: TaxonomyKind,
        parent_id: Uuid,
    ) -> Result<TaxonomyNode, CoreError> {
        match Self::require_node(conn, kind, parent_id).await {
            Err(CoreError::NotFound(_)) => Err(CoreError::Validation(format!(
                "Parent {} with id {} not found",
                kind.label().to_lowercase(),
                parent_id
            ))),
            other => other,
        }
    }

    async fn all_nodes(conn: &mut SqliteConnection, kind: TaxonomyKind) -> Result<Vec<TaxonomyNode>, CoreError> {
        let nodes = sqlx::query_as(&format!("SELECT * FROM {} ORDER BY rowid", kind.table()))
            .fetch_all(&mut *conn)
            .await?;
        Ok(nodes)
    }

    /// A new parent must exist in the same table, and must not be the node
    /// itself or one of its descendants.
    async fn check_new_parent(
        conn: &mut SqliteConnection,
        kind: TaxonomyKind,
        node: &TaxonomyNode,
        parent_id: Uuid,
    ) -> Result<(), CoreError> {
        if parent_id == node.id {
            return Err(CoreError::Validation(format!(
                "{} '{}' cannot be its own parent",
                kind.label(),
                node.name
            )));
        }
        let parent = Self::require_parent(conn, kind, parent_id).await?;
        let nodes = Self::all_nodes(conn, kind).await?;
        if would_create_cycle(&nodes, node.id, parent_id) {
            return Err(CoreError::CircularParent(node.name.clone(), parent.name));
        }
        Ok(())
    }
}
