use clap::{Args, Parser, Subcommand, ValueEnum};
use lae_core::models::{EventStatus, ScheduleStatus, TaxonomyKind};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Plan your days in five fixed slots, grouped by life domains and schedules",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage life-area domains
    Domain(TaxonomyCommand),
    /// Manage activity types
    Type(TaxonomyCommand),
    /// Manage the legacy activity tree
    Activity(TaxonomyCommand),
    /// Manage schedules
    Schedule(ScheduleCommand),
    /// Manage scheduled events
    Event(EventCommand),
    /// Show calendar views
    Calendar(CalendarCommand),
    /// Show completion statistics
    Stats(StatsCommand),
}

/// Shared `--json` switch for read commands
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct OutputArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ShowCommand {
    /// The ID (or a unique prefix of at least 2 characters)
    pub id: String,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// The ID (or a unique prefix of at least 2 characters)
    pub id: String,
    /// Force deletion without confirmation
    #[clap(short, long)]
    pub force: bool,
}

// ============================================================================
// Taxonomies
// ============================================================================

#[derive(Parser, Debug, Clone)]
pub struct TaxonomyCommand {
    #[command(subcommand)]
    pub command: TaxonomySubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TaxonomySubcommand {
    /// Add a new node
    Add(AddNodeCommand),
    /// List all nodes in insertion order
    List(OutputArgs),
    /// Show nodes as a tree
    Tree(OutputArgs),
    /// Show a single node
    Show(ShowCommand),
    /// Edit a node
    Edit(EditNodeCommand),
    /// Delete a node according to the configured delete policy
    Delete(DeleteCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddNodeCommand {
    /// The name of the node
    pub name: String,
    #[arg(short, long)]
    pub description: Option<String>,
    /// ID of the parent node of the same kind
    #[arg(short, long)]
    pub parent: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct EditNodeCommand {
    /// The ID of the node to edit
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, conflicts_with = "description")]
    pub description_clear: bool,

    #[arg(long)]
    pub parent: Option<String>,
    /// Move the node to the top level
    #[arg(long, conflicts_with = "parent")]
    pub parent_clear: bool,
}

// ============================================================================
// Schedules
// ============================================================================

#[derive(Parser, Debug, Clone)]
pub struct ScheduleCommand {
    #[command(subcommand)]
    pub command: ScheduleSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ScheduleSubcommand {
    /// Add a new schedule
    Add(AddScheduleCommand),
    /// List schedules
    List(ListSchedulesCommand),
    /// Show a single schedule
    Show(ShowCommand),
    /// Edit a schedule
    Edit(EditScheduleCommand),
    /// Delete a schedule
    Delete(DeleteCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddScheduleCommand {
    /// The name of the schedule
    pub name: String,
    /// ID of the owning domain
    #[arg(long)]
    pub domain: String,
    #[arg(short, long)]
    pub description: Option<String>,
    /// Start date (e.g. "2025-06-01", "next monday")
    #[arg(long)]
    pub start: Option<String>,
    /// Deadline (e.g. "2025-09-30", "in 3 months")
    #[arg(long)]
    pub deadline: Option<String>,
    /// ongoing, completed or paused
    #[arg(long)]
    pub status: Option<ScheduleStatus>,
}

#[derive(Parser, Debug, Clone)]
pub struct ListSchedulesCommand {
    /// Only schedules owned by this domain
    #[arg(long)]
    pub domain: Option<String>,
    #[arg(long)]
    pub status: Option<ScheduleStatus>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct EditScheduleCommand {
    /// The ID of the schedule to edit
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    /// Move the schedule to another domain
    #[arg(long)]
    pub domain: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, conflicts_with = "description")]
    pub description_clear: bool,

    #[arg(long)]
    pub start: Option<String>,
    #[arg(long, conflicts_with = "start")]
    pub start_clear: bool,

    #[arg(long)]
    pub deadline: Option<String>,
    #[arg(long, conflicts_with = "deadline")]
    pub deadline_clear: bool,

    #[arg(long)]
    pub status: Option<ScheduleStatus>,
}

// ============================================================================
// Events
// ============================================================================

#[derive(Parser, Debug, Clone)]
pub struct EventCommand {
    #[command(subcommand)]
    pub command: EventSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum EventSubcommand {
    /// Place a new event into a slot
    Add(AddEventCommand),
    /// List events
    List(ListEventsCommand),
    /// Show a single event
    Show(ShowCommand),
    /// Edit or move an event
    Edit(EditEventCommand),
    /// Delete an event
    Delete(DeleteCommand),
    /// Mark an event as completed
    Do(DoCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddEventCommand {
    /// The name of the event
    pub name: String,
    /// Day of the event (e.g. "2025-06-02", "tomorrow")
    #[arg(long, default_value = "today")]
    pub date: String,
    /// Slot code: 21, 22 (morning), 51, 52 (afternoon) or 71 (evening)
    #[arg(short, long)]
    pub slot: i64,
    /// Stacking lane; by default the event stacks when the slot is taken
    #[arg(long)]
    pub lane: Option<i64>,
    #[arg(short, long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub status: Option<EventStatus>,
    #[arg(long)]
    pub domain: Option<String>,
    #[arg(long = "type")]
    pub activity_type: Option<String>,
    #[arg(long)]
    pub schedule: Option<String>,
    /// Legacy activity ID
    #[arg(long)]
    pub activity: Option<String>,
    /// Legacy goal text
    #[arg(long)]
    pub goal: Option<String>,
    /// Planned duration in minutes
    #[arg(long)]
    pub duration: Option<i64>,
    /// Start time (e.g. "09:30")
    #[arg(long)]
    pub at: Option<String>,
    /// The start time is exact rather than indicative
    #[arg(long)]
    pub precise: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ListEventsCommand {
    /// First day to include
    #[arg(long)]
    pub from: Option<String>,
    /// Last day to include
    #[arg(long)]
    pub to: Option<String>,
    #[arg(long)]
    pub domain: Option<String>,
    #[arg(long = "type")]
    pub activity_type: Option<String>,
    #[arg(long)]
    pub status: Option<EventStatus>,
    #[arg(long)]
    pub offset: Option<i64>,
    #[arg(long)]
    pub limit: Option<i64>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct EditEventCommand {
    /// The ID of the event to edit
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub date: Option<String>,
    #[arg(short, long)]
    pub slot: Option<i64>,
    #[arg(long)]
    pub lane: Option<i64>,

    #[arg(long)]
    pub status: Option<EventStatus>,

    #[arg(short, long)]
    pub notes: Option<String>,
    #[arg(long, conflicts_with = "notes")]
    pub notes_clear: bool,

    #[arg(long)]
    pub domain: Option<String>,
    #[arg(long, conflicts_with = "domain")]
    pub domain_clear: bool,

    #[arg(long = "type")]
    pub activity_type: Option<String>,
    #[arg(long = "type-clear", conflicts_with = "activity_type")]
    pub activity_type_clear: bool,

    #[arg(long)]
    pub schedule: Option<String>,
    #[arg(long, conflicts_with = "schedule")]
    pub schedule_clear: bool,

    #[arg(long)]
    pub activity: Option<String>,
    #[arg(long, conflicts_with = "activity")]
    pub activity_clear: bool,

    #[arg(long)]
    pub goal: Option<String>,
    #[arg(long, conflicts_with = "goal")]
    pub goal_clear: bool,

    #[arg(long)]
    pub duration: Option<i64>,
    #[arg(long, conflicts_with = "duration")]
    pub duration_clear: bool,

    #[arg(long)]
    pub at: Option<String>,
    #[arg(long, conflicts_with = "at")]
    pub at_clear: bool,

    #[arg(long)]
    pub precise: Option<bool>,
}

#[derive(Parser, Debug, Clone)]
pub struct DoCommand {
    /// The ID of the event to mark as completed
    pub id: String,
}

// ============================================================================
// Calendar and statistics
// ============================================================================

#[derive(Parser, Debug, Clone)]
pub struct CalendarCommand {
    #[command(subcommand)]
    pub command: CalendarSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CalendarSubcommand {
    /// The Monday-to-Sunday week containing a date
    Week(DateViewCommand),
    /// Every day of a month with its events and active schedules
    Month(MonthViewCommand),
    /// The five slots of a single day
    Day(DateViewCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct DateViewCommand {
    /// Any day in the range to show
    #[arg(default_value = "today")]
    pub date: String,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct MonthViewCommand {
    /// Defaults to the current year
    pub year: Option<i32>,
    /// 1-12, defaults to the current month
    pub month: Option<u32>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct StatsCommand {
    #[command(subcommand)]
    pub command: StatsSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum StatsSubcommand {
    /// Global totals and distributions
    Summary(OutputArgs),
    /// Totals for one node and everything below it
    Node(NodeStatsCommand),
    /// A whole taxonomy with per-subtree totals
    Tree(TreeStatsCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct NodeStatsCommand {
    #[arg(value_enum)]
    pub kind: KindArg,
    /// The ID of the node
    pub id: String,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct TreeStatsCommand {
    #[arg(value_enum)]
    pub kind: KindArg,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    Domain,
    Type,
    Activity,
}

impl From<KindArg> for TaxonomyKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Domain => TaxonomyKind::Domain,
            KindArg::Type => TaxonomyKind::ActivityType,
            KindArg::Activity => TaxonomyKind::Activity,
        }
    }
}
