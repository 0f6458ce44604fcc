//! Completion-rate rollups over event rows.

use crate::models::{EventStatus, TaxonomyKind, TaxonomyNode, TimeSlot};
use crate::taxonomy::{descendant_closure, TaxonomyTree};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

/// `completed / total * 100` rounded to two decimals, and 0 for no events.
pub fn completion_rate(completed: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let rate = completed as f64 / total as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct StatusCount {
    pub status: EventStatus,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotCount {
    pub time_slot: TimeSlot,
    pub slot_name: &'static str,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub total_activities: i64,
    pub total_domains: i64,
    pub total_activity_types: i64,
    pub total_schedules: i64,
    pub total_events: i64,
    pub completed_events: i64,
    pub completion_rate: f64,
    pub status_distribution: Vec<StatusCount>,
    pub timeslot_distribution: Vec<SlotCount>,
}

/// The slice of an event the scoped rollups need. `link_id` is the event's
/// link column for the taxonomy kind being summarised.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct EventLink {
    pub link_id: Option<Uuid>,
    pub status: EventStatus,
    pub event_date: NaiveDate,
    pub goal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalEntry {
    pub goal: String,
    pub date: NaiveDate,
    pub status: EventStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeBreakdown {
    pub node_id: Uuid,
    pub name: String,
    pub total_events: i64,
    pub completed_events: i64,
    pub completion_rate: f64,
    pub goals: Vec<GoalEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeStatistics {
    pub kind: TaxonomyKind,
    pub node_id: Uuid,
    pub name: String,
    pub total_events: i64,
    pub completed_events: i64,
    pub completion_rate: f64,
    /// One entry per node of the subtree that has events, in tree order.
    pub breakdown: Vec<NodeBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeStatistics {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    /// Counts cover this node and all of its descendants.
    pub total_events: i64,
    pub completed_events: i64,
    pub completion_rate: f64,
    pub children: Vec<TreeStatistics>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    total: i64,
    completed: i64,
}

impl Tally {
    fn add(&mut self, status: EventStatus) {
        self.total += 1;
        if status == EventStatus::Completed {
            self.completed += 1;
        }
    }
}

fn tally_by_link(events: &[EventLink]) -> HashMap<Uuid, Tally> {
    let mut tallies: HashMap<Uuid, Tally> = HashMap::new();
    for event in events {
        if let Some(link_id) = event.link_id {
            tallies.entry(link_id).or_default().add(event.status);
        }
    }
    tallies
}

/// Fills in the per-slot histogram in day order, including empty slots.
pub fn slot_distribution(counts: &[(TimeSlot, i64)]) -> Vec<SlotCount> {
    TimeSlot::ALL
        .iter()
        .map(|&slot| SlotCount {
            time_slot: slot,
            slot_name: slot.label(),
            count: counts
                .iter()
                .filter(|(s, _)| *s == slot)
                .map(|(_, c)| *c)
                .sum(),
        })
        .collect()
}

/// Rollup for `root` and its descendants. `nodes` is the full node set of
/// `kind`, `events` every event whose link column for `kind` is set.
pub fn node_statistics(
    kind: TaxonomyKind,
    nodes: &[TaxonomyNode],
    root: &TaxonomyNode,
    events: &[EventLink],
) -> NodeStatistics {
    let closure = descendant_closure(nodes, root.id);
    let names: HashMap<Uuid, &str> = nodes.iter().map(|n| (n.id, n.name.as_str())).collect();

    let mut per_node: HashMap<Uuid, NodeBreakdown> = HashMap::new();
    let mut overall = Tally::default();
    for event in events {
        let Some(link_id) = event.link_id else { continue };
        if !closure.contains(&link_id) {
            continue;
        }
        overall.add(event.status);
        let entry = per_node.entry(link_id).or_insert_with(|| NodeBreakdown {
            node_id: link_id,
            name: names.get(&link_id).copied().unwrap_or_default().to_string(),
            total_events: 0,
            completed_events: 0,
            completion_rate: 0.0,
            goals: Vec::new(),
        });
        entry.total_events += 1;
        if event.status == EventStatus::Completed {
            entry.completed_events += 1;
        }
        if let Some(goal) = &event.goal {
            entry.goals.push(GoalEntry {
                goal: goal.clone(),
                date: event.event_date,
                status: event.status,
            });
        }
    }

    let breakdown = closure
        .iter()
        .filter_map(|id| per_node.remove(id))
        .map(|mut entry| {
            entry.completion_rate = completion_rate(entry.completed_events, entry.total_events);
            entry.goals.sort_by_key(|g| g.date);
            entry
        })
        .collect();

    NodeStatistics {
        kind,
        node_id: root.id,
        name: root.name.clone(),
        total_events: overall.total,
        completed_events: overall.completed,
        completion_rate: completion_rate(overall.completed, overall.total),
        breakdown,
    }
}

/// Embeds subtree rollups into an already built forest.
pub fn tree_statistics(forest: &[TaxonomyTree], events: &[EventLink]) -> Vec<TreeStatistics> {
    let tallies = tally_by_link(events);
    forest.iter().map(|tree| annotate(tree, &tallies)).collect()
}

fn annotate(tree: &TaxonomyTree, tallies: &HashMap<Uuid, Tally>) -> TreeStatistics {
    let children: Vec<TreeStatistics> = tree.children.iter().map(|c| annotate(c, tallies)).collect();
    let own = tallies.get(&tree.id).copied().unwrap_or_default();
    let total_events = own.total + children.iter().map(|c| c.total_events).sum::<i64>();
    let completed_events = own.completed + children.iter().map(|c| c.completed_events).sum::<i64>();
    TreeStatistics {
        id: tree.id,
        name: tree.name.clone(),
        description: tree.description.clone(),
        parent_id: tree.parent_id,
        created_at: tree.created_at,
        total_events,
        completed_events,
        completion_rate: completion_rate(completed_events, total_events),
        children,
    }
}
