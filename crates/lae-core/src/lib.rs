//! # Lae Core Library
//!
//! Personal life-activity planner: hierarchical taxonomies, goal-bound
//! schedules and events placed into fixed day-part slots, with calendar
//! projections and completion statistics on top.
//!
//! ## Core Modules
//!
//! - [`db`]: Database connection and migration management
//! - [`models`]: Core data structures and transfer objects
//! - [`repository`]: Data access layer with Repository pattern
//! - [`taxonomy`]: Forest building and subtree closure over adjacency lists
//! - [`placement`]: Lane assignment rules for `(date, slot)` cells
//! - [`calendar`]: Week, month and day projections
//! - [`statistics`]: Completion-rate rollups
//! - [`error`]: Error type and its caller-facing classification
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use lae_core::{
//!     db,
//!     models::{NewEventData, NewNodeData, TaxonomyKind},
//!     repository::{CalendarRepository, EventRepository, SqliteRepository, TaxonomyRepository},
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = db::establish_connection("lae.db").await?;
//!     let repo = SqliteRepository::new(pool);
//!
//!     let work = repo
//!         .add_node(TaxonomyKind::Domain, NewNodeData { name: "Work".into(), ..Default::default() })
//!         .await?;
//!
//!     let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
//!     let mut event = NewEventData::new("Write report", date, 21);
//!     event.domain_id = Some(work.id);
//!     repo.add_event(event).await?;
//!
//!     let week = repo.week_view(date).await?;
//!     println!("{} days from {}", week.days.len(), week.week_start);
//!     Ok(())
//! }
//! ```

pub mod calendar;
pub mod db;
pub mod error;
pub mod models;
pub mod placement;
pub mod repository;
pub mod statistics;
pub mod taxonomy;
