use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Taxonomy Models
// ============================================================================

/// The three hierarchical taxonomies. Each kind lives in its own table and
/// parents may only reference nodes of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyKind {
    /// Life-area taxonomy ("Work", "Health"). Owns schedules.
    Domain,
    /// Nature of the work ("Coding", "Reading").
    ActivityType,
    /// Legacy activity tree kept for older events and statistics.
    Activity,
}

impl TaxonomyKind {
    pub const ALL: [TaxonomyKind; 3] = [
        TaxonomyKind::Domain,
        TaxonomyKind::ActivityType,
        TaxonomyKind::Activity,
    ];

    /// Backing table. Only ever one of these literals, so it is safe to
    /// splice into SQL text.
    pub fn table(self) -> &'static str {
        match self {
            TaxonomyKind::Domain => "domains",
            TaxonomyKind::ActivityType => "activity_types",
            TaxonomyKind::Activity => "activities",
        }
    }

    /// Column on `scheduled_events` that links an event to this kind.
    pub fn event_column(self) -> &'static str {
        match self {
            TaxonomyKind::Domain => "domain_id",
            TaxonomyKind::ActivityType => "activity_type_id",
            TaxonomyKind::Activity => "activity_id",
        }
    }

    /// Human readable label used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            TaxonomyKind::Domain => "Domain",
            TaxonomyKind::ActivityType => "Activity type",
            TaxonomyKind::Activity => "Activity",
        }
    }
}

impl std::fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaxonomyKind::Domain => write!(f, "domain"),
            TaxonomyKind::ActivityType => write!(f, "activity_type"),
            TaxonomyKind::Activity => write!(f, "activity"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid taxonomy kind: {0}")]
pub struct ParseTaxonomyKindError(String);

impl FromStr for TaxonomyKind {
    type Err = ParseTaxonomyKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "domain" | "domains" => Ok(TaxonomyKind::Domain),
            "type" | "activity_type" | "activity-type" | "types" => Ok(TaxonomyKind::ActivityType),
            "activity" | "activities" => Ok(TaxonomyKind::Activity),
            _ => Err(ParseTaxonomyKindError(s.to_string())),
        }
    }
}

/// What happens to the children of a taxonomy node when it is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Delete the whole subtree (and, for domains, the schedules they own).
    Cascade,
    /// Refuse while the node still has direct children.
    Restrict,
    /// Delete only the node; children keep a dangling `parent_id`.
    Orphan,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid delete policy: {0}")]
pub struct ParseDeletePolicyError(String);

impl FromStr for DeletePolicy {
    type Err = ParseDeletePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cascade" => Ok(DeletePolicy::Cascade),
            "restrict" => Ok(DeletePolicy::Restrict),
            "orphan" => Ok(DeletePolicy::Orphan),
            _ => Err(ParseDeletePolicyError(s.to_string())),
        }
    }
}

/// Delete policy per taxonomy kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeletePolicies {
    pub domain: DeletePolicy,
    pub activity_type: DeletePolicy,
    pub activity: DeletePolicy,
}

impl Default for DeletePolicies {
    fn default() -> Self {
        Self {
            domain: DeletePolicy::Cascade,
            activity_type: DeletePolicy::Restrict,
            activity: DeletePolicy::Orphan,
        }
    }
}

impl DeletePolicies {
    pub fn for_kind(&self, kind: TaxonomyKind) -> DeletePolicy {
        match kind {
            TaxonomyKind::Domain => self.domain,
            TaxonomyKind::ActivityType => self.activity_type,
            TaxonomyKind::Activity => self.activity,
        }
    }
}

/// A node of any taxonomy kind. The kind is implied by the table it was
/// loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TaxonomyNode {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewNodeData {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateNodeData {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub parent_id: Option<Option<Uuid>>,
}

/// Outcome of a taxonomy delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeleteSummary {
    pub nodes_deleted: u64,
    pub schedules_deleted: u64,
}

// ============================================================================
// Schedule Models
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    Ongoing,
    Completed,
    Paused,
}

impl std::fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleStatus::Ongoing => write!(f, "ongoing"),
            ScheduleStatus::Completed => write!(f, "completed"),
            ScheduleStatus::Paused => write!(f, "paused"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid schedule status: {0}")]
pub struct ParseScheduleStatusError(String);

impl FromStr for ScheduleStatus {
    type Err = ParseScheduleStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ongoing" => Ok(ScheduleStatus::Ongoing),
            "completed" => Ok(ScheduleStatus::Completed),
            "paused" => Ok(ScheduleStatus::Paused),
            _ => Err(ParseScheduleStatusError(s.to_string())),
        }
    }
}

/// A goal/deadline-bound initiative owned by exactly one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Schedule {
    pub id: Uuid,
    pub domain_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    pub status: ScheduleStatus,
    pub created_at: DateTime<Utc>,
}

impl Schedule {
    /// True when `[start_date, deadline]` intersects `[from, to]`. A missing
    /// bound is unbounded on that side.
    pub fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        let starts_in_time = self.start_date.map_or(true, |start| start <= to);
        let ends_in_time = self.deadline.map_or(true, |deadline| deadline >= from);
        starts_in_time && ends_in_time
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ScheduleWithDomain {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub schedule: Schedule,
    pub domain_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewScheduleData {
    pub domain_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    pub status: Option<ScheduleStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateScheduleData {
    pub domain_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub start_date: Option<Option<NaiveDate>>,
    pub deadline: Option<Option<NaiveDate>>,
    pub status: Option<ScheduleStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleFilter {
    pub domain_id: Option<Uuid>,
    pub status: Option<ScheduleStatus>,
    /// Keep only schedules whose date range overlaps `[from, to]`.
    pub overlapping: Option<(NaiveDate, NaiveDate)>,
}

// ============================================================================
// Time Slots
// ============================================================================

/// The five fixed day-part codes an event can be placed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(into = "i64", try_from = "i64")]
#[repr(i32)]
pub enum TimeSlot {
    Morning1 = 21,
    Morning2 = 22,
    Afternoon1 = 51,
    Afternoon2 = 52,
    Evening = 71,
}

impl TimeSlot {
    /// All slots in day order.
    pub const ALL: [TimeSlot; 5] = [
        TimeSlot::Morning1,
        TimeSlot::Morning2,
        TimeSlot::Afternoon1,
        TimeSlot::Afternoon2,
        TimeSlot::Evening,
    ];

    pub fn code(self) -> i64 {
        self as i64
    }

    /// Fixed label shown in day views and statistics.
    pub fn label(self) -> &'static str {
        match self {
            TimeSlot::Morning1 => "Morning 1",
            TimeSlot::Morning2 => "Morning 2",
            TimeSlot::Afternoon1 => "Afternoon 1",
            TimeSlot::Afternoon2 => "Afternoon 2",
            TimeSlot::Evening => "Evening",
        }
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<TimeSlot> for i64 {
    fn from(slot: TimeSlot) -> Self {
        slot.code()
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid time slot: {0}. Must be one of: 21, 22, 51, 52, 71")]
pub struct ParseTimeSlotError(pub String);

impl TryFrom<i64> for TimeSlot {
    type Error = ParseTimeSlotError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        TimeSlot::ALL
            .into_iter()
            .find(|slot| slot.code() == code)
            .ok_or_else(|| ParseTimeSlotError(code.to_string()))
    }
}

impl FromStr for TimeSlot {
    type Err = ParseTimeSlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: i64 = s
            .trim()
            .parse()
            .map_err(|_| ParseTimeSlotError(s.to_string()))?;
        TimeSlot::try_from(code)
    }
}

// ============================================================================
// Scheduled Event Models
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Planned,
    Completed,
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStatus::Planned => write!(f, "planned"),
            EventStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid event status: {0}")]
pub struct ParseEventStatusError(String);

impl FromStr for EventStatus {
    type Err = ParseEventStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "planned" => Ok(EventStatus::Planned),
            "completed" | "done" => Ok(EventStatus::Completed),
            _ => Err(ParseEventStatusError(s.to_string())),
        }
    }
}

/// A single unit of planned work placed at `(event_date, time_slot)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ScheduledEvent {
    pub id: Uuid,
    pub event_date: NaiveDate,
    pub time_slot: TimeSlot,
    pub name: String,
    /// Free text, never aggregated.
    pub notes: Option<String>,
    pub status: EventStatus,
    pub domain_id: Option<Uuid>,
    pub activity_type_id: Option<Uuid>,
    pub schedule_id: Option<Uuid>,
    /// Legacy link to the activity tree.
    pub activity_id: Option<Uuid>,
    /// Legacy free-text goal, surfaced by per-node statistics.
    pub goal: Option<String>,
    pub duration_minutes: Option<i64>,
    pub start_time: Option<NaiveTime>,
    pub is_precise: bool,
    /// Stacking lane inside the slot. Lane 0 is exclusive.
    pub canvas_position_y: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An event together with the names of the records it links to. Names are
/// resolved with outer joins and are `None` when the link is unset or the
/// target is gone.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub event: ScheduledEvent,
    pub domain_name: Option<String>,
    pub activity_type_name: Option<String>,
    pub schedule_name: Option<String>,
    pub activity_name: Option<String>,
}

/// Data for creating an event. `time_slot` is the raw code; it is validated
/// by the repository.
#[derive(Debug, Clone)]
pub struct NewEventData {
    pub event_date: NaiveDate,
    pub time_slot: i64,
    pub name: String,
    pub notes: Option<String>,
    pub status: Option<EventStatus>,
    pub domain_id: Option<Uuid>,
    pub activity_type_id: Option<Uuid>,
    pub schedule_id: Option<Uuid>,
    pub activity_id: Option<Uuid>,
    pub goal: Option<String>,
    pub duration_minutes: Option<i64>,
    pub start_time: Option<NaiveTime>,
    pub is_precise: bool,
    /// `None` lets the placement validator pick a lane.
    pub canvas_position_y: Option<i64>,
}

impl NewEventData {
    pub fn new(name: impl Into<String>, event_date: NaiveDate, time_slot: i64) -> Self {
        Self {
            event_date,
            time_slot,
            name: name.into(),
            notes: None,
            status: None,
            domain_id: None,
            activity_type_id: None,
            schedule_id: None,
            activity_id: None,
            goal: None,
            duration_minutes: None,
            start_time: None,
            is_precise: false,
            canvas_position_y: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateEventData {
    pub event_date: Option<NaiveDate>,
    pub time_slot: Option<i64>,
    pub name: Option<String>,
    pub notes: Option<Option<String>>,
    pub status: Option<EventStatus>,
    pub domain_id: Option<Option<Uuid>>,
    pub activity_type_id: Option<Option<Uuid>>,
    pub schedule_id: Option<Option<Uuid>>,
    pub activity_id: Option<Option<Uuid>>,
    pub goal: Option<Option<String>>,
    pub duration_minutes: Option<Option<i64>>,
    pub start_time: Option<Option<NaiveTime>>,
    pub is_precise: Option<bool>,
    pub canvas_position_y: Option<i64>,
}

/// Default page size for event listings.
pub const DEFAULT_EVENT_LIMIT: i64 = 100;

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub domain_id: Option<Uuid>,
    pub activity_type_id: Option<Uuid>,
    pub status: Option<EventStatus>,
    pub offset: Option<i64>,
    /// Defaults to [`DEFAULT_EVENT_LIMIT`].
    pub limit: Option<i64>,
}

impl EventFilter {
    /// All events in `[start, end]`, unpaged.
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: Some(start),
            end_date: Some(end),
            limit: Some(i64::MAX),
            ..Default::default()
        }
    }
}
