// PlayLens - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary across all layers.

use chrono::{DateTime, Utc};
use serde::Serialize;

// =============================================================================
// Outcome status
// =============================================================================

/// Per-host result of a task, as printed at the start of an outcome line.
///
/// `Empty` is used for every node that is not an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Changed,
    Failed,
    Skipping,
    Fatal,
    #[default]
    Empty,
}

impl Status {
    /// Parse the status keyword of an outcome line. Case-sensitive, as the
    /// transcript always prints these in lowercase.
    pub fn from_keyword(keyword: &str) -> Option<Status> {
        match keyword {
            "ok" => Some(Status::Ok),
            "changed" => Some(Status::Changed),
            "failed" => Some(Status::Failed),
            "skipping" => Some(Status::Skipping),
            "fatal" => Some(Status::Fatal),
            _ => None,
        }
    }

    /// Keyword as it appears in the transcript.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::Changed => "changed",
            Status::Failed => "failed",
            Status::Skipping => "skipping",
            Status::Fatal => "fatal",
            Status::Empty => "",
        }
    }

    /// Glyph prefixed to outcome labels.
    pub fn glyph(&self) -> &'static str {
        match self {
            Status::Ok => "✅",
            Status::Changed => "🔄",
            Status::Failed => "❌",
            Status::Skipping => "⏭️",
            Status::Fatal => "❌",
            Status::Empty => "",
        }
    }

    /// `failed` and `fatal` both count as failures.
    pub fn is_failure(&self) -> bool {
        matches!(self, Status::Failed | Status::Fatal)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Task kind
// =============================================================================

/// Role of a node in the tree. The metrics walk keys off this tag, so
/// handlers stay distinct from tasks even though both sit at depth 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    #[default]
    Root,
    Play,
    Task,
    Handler,
    Include,
    Outcome,
    Recap,
    RecapHost,
}

// =============================================================================
// Execution node
// =============================================================================

/// One element of a playbook run: the synthetic root, a play, a task, a
/// handler, an include reference, a per-host outcome, or a recap entry.
///
/// Depth tiers: 0 root, 1 play / recap block, 2 task / handler / recap host,
/// 3 include, 4 outcome.
#[derive(Debug, Clone, Serialize, Default)]
pub struct ExecutionNode {
    /// Depth tier (see type docs).
    pub depth: u8,

    /// Bare captured name: play or task name, include short name, or host.
    pub name: String,

    /// Rendered name shown in reports.
    pub label: String,

    pub status: Status,

    /// Target host(s); empty when the node is not host-scoped.
    pub host: String,

    pub changed: bool,
    pub failed: bool,
    pub skipped: bool,

    /// Text after the `=>` separator of an outcome line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,

    /// Seconds between `start_time` and `end_time`. Only ever set by
    /// [`ExecutionNode::close_timing`].
    pub duration: Option<f64>,

    pub task_kind: TaskKind,

    /// Children in line-arrival order.
    pub children: Vec<ExecutionNode>,
}

impl ExecutionNode {
    fn new(depth: u8, task_kind: TaskKind, name: &str, label: String) -> Self {
        Self {
            depth,
            name: name.to_string(),
            label,
            task_kind,
            children: Vec::new(),
            ..Default::default()
        }
    }

    pub fn root(started: DateTime<Utc>) -> Self {
        let mut node = Self::new(
            0,
            TaskKind::Root,
            crate::util::constants::ROOT_LABEL,
            crate::util::constants::ROOT_LABEL.to_string(),
        );
        node.start_time = Some(started);
        node
    }

    pub fn play(name: &str, started: DateTime<Utc>) -> Self {
        let mut node = Self::new(1, TaskKind::Play, name, format!("PLAY: {name}"));
        node.start_time = Some(started);
        node
    }

    pub fn task(name: &str, started: DateTime<Utc>) -> Self {
        let mut node = Self::new(2, TaskKind::Task, name, format!("TASK: {name}"));
        node.start_time = Some(started);
        node
    }

    /// Handlers are never timed: they carry no start time, so closing them
    /// is a no-op.
    pub fn handler(name: &str) -> Self {
        Self::new(2, TaskKind::Handler, name, format!("HANDLER: {name}"))
    }

    pub fn include(short_name: &str, hosts: &str) -> Self {
        let mut node = Self::new(
            3,
            TaskKind::Include,
            short_name,
            format!("📁 INCLUDE: {short_name} ({hosts})"),
        );
        node.host = hosts.to_string();
        node
    }

    pub fn outcome(status: Status, host: &str, details: Option<String>) -> Self {
        let mut node = Self::new(
            4,
            TaskKind::Outcome,
            host,
            format!("{} {host}: {}", status.glyph(), status.label()),
        );
        node.status = status;
        node.host = host.to_string();
        node.changed = status == Status::Changed;
        node.failed = status.is_failure();
        node.skipped = status == Status::Skipping;
        node.details = details;
        node
    }

    pub fn recap() -> Self {
        let label = crate::util::constants::RECAP_LABEL;
        Self::new(1, TaskKind::Recap, label, format!("📊 {label}"))
    }

    pub fn recap_host(host: &str, failed_count: &str, failed: bool) -> Self {
        let glyph = if failed { "❌" } else { "✅" };
        let mut node = Self::new(
            2,
            TaskKind::RecapHost,
            host,
            format!("{glyph} {host}: failed={failed_count}"),
        );
        node.host = host.to_string();
        node.failed = failed;
        node
    }

    /// Close an open timing window at `now`.
    ///
    /// Does nothing unless the node has a start and no end yet. Returns true
    /// when the window was closed.
    pub fn close_timing(&mut self, now: DateTime<Utc>) -> bool {
        match (self.start_time, self.end_time) {
            (Some(start), None) => {
                self.end_time = Some(now);
                self.duration = Some(seconds_between(start, now));
                true
            }
            _ => false,
        }
    }

    /// True when any outcome below this node failed.
    pub fn has_failed_outcome(&self) -> bool {
        self.children
            .iter()
            .any(|c| (c.task_kind == TaskKind::Outcome && c.failed) || c.has_failed_outcome())
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }
}

/// Seconds from `start` to `end` with microsecond precision.
pub fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let elapsed = end - start;
    match elapsed.num_microseconds() {
        Some(micros) => micros as f64 / 1_000_000.0,
        // Spans too long for i64 microseconds.
        None => elapsed.num_milliseconds() as f64 / 1000.0,
    }
}

// =============================================================================
// Metrics
// =============================================================================

/// Verdict attached to a timing sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingStatus {
    Success,
    /// At least one outcome under the task failed.
    Failed,
}

impl TimingStatus {
    pub fn of(task: &ExecutionNode) -> Self {
        if task.has_failed_outcome() {
            TimingStatus::Failed
        } else {
            TimingStatus::Success
        }
    }
}

/// One `{name, duration, status}` timing sample for a task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskTiming {
    pub name: String,
    pub duration: f64,
    pub status: TimingStatus,
}

/// Read-only metrics snapshot produced by finalize.
#[derive(Debug, Clone, Serialize)]
pub struct Metrics {
    pub total_plays: usize,
    pub total_tasks: usize,
    pub total_handlers: usize,
    pub failed_tasks: usize,
    pub changed_tasks: usize,
    pub skipped_tasks: usize,

    /// Hosts in order of first appearance.
    pub hosts: Vec<String>,

    /// Hosts with at least one failed or fatal outcome, in order of first failure.
    pub failed_hosts: Vec<String>,

    /// Wall-clock seconds from parse start to finalize.
    pub total_duration: f64,

    /// Percentage of non-failed operations, see `core::metrics`.
    pub success_rate: f64,

    /// Every timed task, in tree order.
    pub task_durations: Vec<TaskTiming>,

    /// Longest-running tasks, longest first.
    pub slowest_tasks: Vec<TaskTiming>,

    pub lines_processed: u64,
    pub lines_unrecognised: u64,
}

impl Metrics {
    /// True when the run had at least one failed or fatal outcome.
    pub fn has_failures(&self) -> bool {
        self.failed_tasks > 0
    }
}

// =============================================================================
// Report formats
// =============================================================================

/// Output formats a run can be rendered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportFormat {
    /// Tree and summary printed to stdout.
    Text,
    Json,
    Markdown,
    Html,
}

impl ReportFormat {
    /// Parse a format name as used on the CLI and in config.toml.
    pub fn from_name(name: &str) -> Option<ReportFormat> {
        match name.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            "html" => Some(ReportFormat::Html),
            _ => None,
        }
    }

    /// File extension for written reports; `None` for stdout-only formats.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            ReportFormat::Text => None,
            ReportFormat::Json => Some("json"),
            ReportFormat::Markdown => Some("md"),
            ReportFormat::Html => Some("html"),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ReportFormat::Text => "text",
            ReportFormat::Json => "json",
            ReportFormat::Markdown => "markdown",
            ReportFormat::Html => "html",
        })
    }
}
