// PlayLens - core/context.rs
//
// Execution context: the state machine that turns classified transcript
// lines into an execution tree.
//
// The transcript has no closing markers. A task's timing window is closed
// when the next TASK line arrives, and "current" play/task/include decide
// where every new node is attached. Handlers share the current-task slot
// but are never timed, so a task interrupted by a handler stays open.

use crate::core::classifier::{self, Classification, LineEvent};
use crate::core::clock::{Clock, SystemClock};
use crate::core::metrics::{self, MetricsAccumulator};
use crate::core::model::{ExecutionNode, Metrics};
use crate::core::tree::{ExecutionTree, NodeId};
use crate::util::constants::DEBUG_MAX_LINE_PREVIEW;

/// One parse session over one transcript.
pub struct ExecutionContext {
    clock: Box<dyn Clock>,
    tree: ExecutionTree,
    current_play: Option<NodeId>,
    current_task: Option<NodeId>,
    current_include: Option<NodeId>,
    metrics: MetricsAccumulator,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionContext {
    /// Start a session timed by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    /// Start a session timed by `clock`. The root's start time is read now.
    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        let started = clock.now();
        Self {
            clock,
            tree: ExecutionTree::new(ExecutionNode::root(started)),
            current_play: None,
            current_task: None,
            current_include: None,
            metrics: MetricsAccumulator::default(),
        }
    }

    /// Apply one raw transcript line. Never fails; unrecognised lines and
    /// lines with nowhere to attach are dropped.
    pub fn feed(&mut self, line: &str) {
        self.metrics.lines_processed += 1;
        let line = line.trim();
        match classifier::classify(line) {
            Classification::Event(event) => self.apply(event),
            Classification::Ignored => {}
            Classification::Unrecognised => {
                self.metrics.lines_unrecognised += 1;
                tracing::trace!(
                    line = %preview(line),
                    "Unrecognised transcript line dropped"
                );
            }
        }
    }

    /// Apply one classified event.
    pub fn apply(&mut self, event: LineEvent) {
        let now = self.clock.now();
        let root = self.tree.root();

        match event {
            LineEvent::PlayStart { name } => {
                let id = self.tree.append(root, ExecutionNode::play(&name, now));
                self.current_play = Some(id);
                self.metrics.total_plays += 1;
                tracing::debug!(play = %name, "Play started");
            }

            LineEvent::TaskStart { name } => {
                // Closes whatever sits in the task slot, handlers included.
                if let Some(previous) = self.current_task {
                    self.tree.get_mut(previous).close_timing(now);
                }
                let Some(play) = self.current_play else {
                    tracing::trace!(task = %name, "Task outside any play dropped");
                    return;
                };
                let id = self.tree.append(play, ExecutionNode::task(&name, now));
                self.current_task = Some(id);
                self.metrics.total_tasks += 1;
            }

            LineEvent::Include { name, hosts } => {
                let Some(task) = self.current_task else {
                    tracing::trace!(include = %name, "Include outside any task dropped");
                    return;
                };
                let id = self.tree.append(task, ExecutionNode::include(&name, &hosts));
                self.current_include = Some(id);
            }

            LineEvent::Outcome {
                status,
                host,
                details,
            } => {
                self.metrics.record_outcome(status, &host);
                if status.is_failure() {
                    tracing::debug!(host = %host, status = %status, "Failure outcome");
                }
                let Some(parent) = self.current_include.or(self.current_task) else {
                    tracing::trace!(host = %host, "Outcome outside any task dropped");
                    return;
                };
                self.tree
                    .append(parent, ExecutionNode::outcome(status, &host, details));
            }

            LineEvent::HandlerStart { name } => {
                let Some(play) = self.current_play else {
                    tracing::trace!(handler = %name, "Handler outside any play dropped");
                    return;
                };
                let id = self.tree.append(play, ExecutionNode::handler(&name));
                self.current_task = Some(id);
                self.metrics.total_handlers += 1;
            }

            LineEvent::RecapStart => {
                let id = self.tree.append(root, ExecutionNode::recap());
                self.current_play = Some(id);
            }

            LineEvent::RecapHost {
                host,
                failed_count,
                failed,
            } => {
                let Some(recap) = self.current_play else {
                    return;
                };
                self.tree.append(
                    recap,
                    ExecutionNode::recap_host(&host, &failed_count, failed),
                );
            }
        }
    }

    pub fn tree(&self) -> &ExecutionTree {
        &self.tree
    }

    pub fn current_play(&self) -> Option<NodeId> {
        self.current_play
    }

    pub fn current_task(&self) -> Option<NodeId> {
        self.current_task
    }

    pub fn current_include(&self) -> Option<NodeId> {
        self.current_include
    }

    pub fn metrics(&self) -> &MetricsAccumulator {
        &self.metrics
    }

    /// End the session: close the root's timing, assemble the owned tree
    /// and compute the metrics snapshot.
    pub fn finalize(self) -> (ExecutionNode, Metrics) {
        let Self {
            clock,
            mut tree,
            metrics: acc,
            ..
        } = self;

        let root_id = tree.root();
        tree.get_mut(root_id).close_timing(clock.now());

        let nodes = tree.len();
        let root = tree.into_root();
        let metrics = metrics::aggregate(&root, acc);

        tracing::info!(
            nodes,
            plays = metrics.total_plays,
            tasks = metrics.total_tasks,
            failed = metrics.failed_tasks,
            duration_secs = metrics.total_duration,
            "Transcript parsed"
        );

        (root, metrics)
    }
}

/// Truncate a line for log output.
fn preview(line: &str) -> &str {
    match line.char_indices().nth(DEBUG_MAX_LINE_PREVIEW) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}
