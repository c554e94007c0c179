// PlayLens - core/export.rs
//
// Machine-readable outputs: the JSON report and the chat-webhook payload.
// Core layer: writes to any Write trait object.

use crate::core::model::{ExecutionNode, Metrics};
use crate::util::error::OutputError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Run-level timing block of the JSON report.
#[derive(Debug, Serialize)]
pub struct ExecutionSummary {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_duration: f64,
    pub success_rate: f64,
}

/// Complete JSON report.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub execution_summary: ExecutionSummary,
    pub metrics: &'a Metrics,
    pub execution_tree: &'a ExecutionNode,
}

/// Build the JSON report structure for a finished run.
pub fn json_report<'a>(root: &'a ExecutionNode, metrics: &'a Metrics) -> JsonReport<'a> {
    JsonReport {
        execution_summary: ExecutionSummary {
            start_time: root.start_time,
            end_time: root.end_time,
            total_duration: metrics.total_duration,
            success_rate: metrics.success_rate,
        },
        metrics,
        execution_tree: root,
    }
}

/// Write the pretty-printed JSON report to `writer`.
///
/// `report_path` is only used for error context.
pub fn write_json_report<W: Write>(
    root: &ExecutionNode,
    metrics: &Metrics,
    writer: W,
    report_path: &Path,
) -> Result<(), OutputError> {
    serde_json::to_writer_pretty(writer, &json_report(root, metrics)).map_err(|e| {
        OutputError::Json {
            path: report_path.to_path_buf(),
            source: e,
        }
    })
}

/// Summary-only notification sent once per run.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationPayload {
    /// One-line message for chat webhooks that only read `text`.
    pub text: String,
    pub success_rate: f64,
    pub duration: f64,
    pub total_tasks: usize,
    pub failed_tasks: usize,
    pub hosts: Vec<String>,
    /// Chat channel override, for webhooks that accept one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

/// Build the webhook payload from the metrics snapshot.
pub fn notification_payload(metrics: &Metrics, channel: Option<&str>) -> NotificationPayload {
    let verdict = if metrics.has_failures() {
        "❌ Playbook run finished with failures"
    } else {
        "✅ Playbook run succeeded"
    };
    let text = format!(
        "{verdict}: success rate {:.1}%, {} tasks, {} failed, {:.1}s on {} host(s)",
        metrics.success_rate,
        metrics.total_tasks,
        metrics.failed_tasks,
        metrics.total_duration,
        metrics.hosts.len()
    );
    NotificationPayload {
        text,
        success_rate: metrics.success_rate,
        duration: metrics.total_duration,
        total_tasks: metrics.total_tasks,
        failed_tasks: metrics.failed_tasks,
        hosts: metrics.hosts.clone(),
        channel: channel.map(str::to_string),
    }
}
