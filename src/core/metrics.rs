// PlayLens - core/metrics.rs
//
// Metrics accumulation during parsing and the one-shot aggregation that
// runs after the transcript ends.

use crate::core::model::{ExecutionNode, Metrics, Status, TaskKind, TaskTiming, TimingStatus};
use crate::util::constants::SLOWEST_TASKS_LIMIT;
use std::collections::HashSet;

/// Insertion-ordered set of strings.
#[derive(Debug, Default, Clone)]
struct OrderedSet {
    seen: HashSet<String>,
    order: Vec<String>,
}

impl OrderedSet {
    fn insert(&mut self, value: &str) {
        if self.seen.insert(value.to_string()) {
            self.order.push(value.to_string());
        }
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn into_vec(self) -> Vec<String> {
        self.order
    }
}

/// Mutable counters owned by the execution context while parsing.
#[derive(Debug, Default, Clone)]
pub struct MetricsAccumulator {
    pub total_plays: usize,
    pub total_tasks: usize,
    pub total_handlers: usize,
    pub failed_tasks: usize,
    pub changed_tasks: usize,
    pub skipped_tasks: usize,
    pub lines_processed: u64,
    pub lines_unrecognised: u64,
    hosts: OrderedSet,
    failed_hosts: OrderedSet,
}

impl MetricsAccumulator {
    /// Record one outcome line. Counted even when the outcome has no parent
    /// node to attach to.
    pub fn record_outcome(&mut self, status: Status, host: &str) {
        self.hosts.insert(host);
        match status {
            Status::Changed => self.changed_tasks += 1,
            Status::Skipping => self.skipped_tasks += 1,
            Status::Failed | Status::Fatal => {
                self.failed_tasks += 1;
                self.failed_hosts.insert(host);
            }
            Status::Ok | Status::Empty => {}
        }
    }

    /// Distinct hosts seen so far.
    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    pub fn failed_host_count(&self) -> usize {
        self.failed_hosts.len()
    }
}

/// Success rate over the approximated operation count
/// `total_tasks x distinct hosts`.
///
/// The denominator assumes every task ran on every host, so late-joining
/// hosts or per-host skips skew it. 100 when nothing ran.
pub fn success_rate(total_tasks: usize, host_count: usize, failed_tasks: usize) -> f64 {
    let total_operations = total_tasks * host_count;
    if total_operations > 0 {
        let total = total_operations as f64;
        (total - failed_tasks as f64) / total * 100.0
    } else {
        100.0
    }
}

/// Depth-first collection of `{name, duration, status}` samples for every
/// task node (handlers excluded) with a positive duration.
pub fn collect_task_timings(root: &ExecutionNode) -> Vec<TaskTiming> {
    let mut samples = Vec::new();
    walk(root, &mut samples);
    samples
}

fn walk(node: &ExecutionNode, samples: &mut Vec<TaskTiming>) {
    if node.task_kind == TaskKind::Task {
        if let Some(duration) = node.duration.filter(|d| *d > 0.0) {
            samples.push(TaskTiming {
                name: node.name.clone(),
                duration,
                status: TimingStatus::of(node),
            });
        }
    }
    for child in &node.children {
        walk(child, samples);
    }
}

/// Longest `limit` samples, longest first. Ties keep encounter order.
pub fn slowest(samples: &[TaskTiming], limit: usize) -> Vec<TaskTiming> {
    let mut ranked = samples.to_vec();
    // `sort_by` is stable; only duration is compared.
    ranked.sort_by(|a, b| b.duration.total_cmp(&a.duration));
    ranked.truncate(limit);
    ranked
}

/// Freeze the accumulator into a metrics snapshot for the assembled tree.
///
/// `root` must already have its timing closed.
pub fn aggregate(root: &ExecutionNode, acc: MetricsAccumulator) -> Metrics {
    let rate = success_rate(acc.total_tasks, acc.host_count(), acc.failed_tasks);
    let task_durations = collect_task_timings(root);
    let slowest_tasks = slowest(&task_durations, SLOWEST_TASKS_LIMIT);

    tracing::debug!(
        plays = acc.total_plays,
        tasks = acc.total_tasks,
        failed = acc.failed_tasks,
        hosts = acc.host_count(),
        timed_tasks = task_durations.len(),
        success_rate = rate,
        "Metrics aggregated"
    );

    Metrics {
        total_plays: acc.total_plays,
        total_tasks: acc.total_tasks,
        total_handlers: acc.total_handlers,
        failed_tasks: acc.failed_tasks,
        changed_tasks: acc.changed_tasks,
        skipped_tasks: acc.skipped_tasks,
        hosts: acc.hosts.into_vec(),
        failed_hosts: acc.failed_hosts.into_vec(),
        total_duration: root.duration.unwrap_or(0.0),
        success_rate: rate,
        task_durations,
        slowest_tasks,
        lines_processed: acc.lines_processed,
        lines_unrecognised: acc.lines_unrecognised,
    }
}
