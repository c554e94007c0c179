// PlayLens - app/run.rs
//
// Run lifecycle: stream the transcript through an execution context, then
// emit every requested output.
//
// Output channels fail independently: a report that cannot be written or a
// webhook that cannot be reached produces a warning and the remaining
// channels still run.

use crate::core::clock::{Clock, SystemClock};
use crate::core::context::ExecutionContext;
use crate::core::model::{ExecutionNode, Metrics, ReportFormat};
use crate::core::{export, render};
use crate::platform::fs::{self, InputSource};
use crate::platform::notify::WebhookNotifier;
use crate::util::constants::{self, REPORT_FILE_STEM};
use crate::util::error::{InputError, OutputError};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Finished tree and metrics of one transcript.
#[derive(Debug)]
pub struct ParsedRun {
    pub root: ExecutionNode,
    pub metrics: Metrics,
}

impl ParsedRun {
    /// Process exit status the CLI reports for this run.
    pub fn exit_code(&self) -> i32 {
        if self.metrics.has_failures() {
            constants::EXIT_TASKS_FAILED
        } else {
            constants::EXIT_OK
        }
    }
}

/// Stream `reader` through a fresh execution context timed by `clock`.
pub fn parse_reader<R: BufRead>(
    reader: R,
    path: Option<&Path>,
    clock: Box<dyn Clock>,
) -> Result<ParsedRun, InputError> {
    let mut ctx = ExecutionContext::with_clock(clock);
    let lines = fs::for_each_line(reader, path, |line| ctx.feed(line))?;
    tracing::debug!(lines, "Transcript stream exhausted");
    let (root, metrics) = ctx.finalize();
    Ok(ParsedRun { root, metrics })
}

/// Open `source` and parse it against the system clock.
pub fn parse_source(source: &InputSource) -> Result<ParsedRun, InputError> {
    let reader = fs::open_input(source)?;
    tracing::info!(input = %source.display_name(), "Parsing transcript");
    parse_reader(reader, source.path(), Box::new(SystemClock))
}

/// What to produce once parsing is done.
#[derive(Debug, Clone)]
pub struct OutputPlan {
    pub formats: Vec<ReportFormat>,
    pub output_dir: PathBuf,
    /// Print the tree above the summary in the text report.
    pub show_tree: bool,
    pub webhook_url: Option<String>,
    pub webhook_timeout_secs: u64,
    pub webhook_channel: Option<String>,
}

/// Outcome of emitting all outputs.
#[derive(Debug, Default)]
pub struct EmitSummary {
    /// Report files successfully written.
    pub written: Vec<PathBuf>,
    /// One message per failed output channel.
    pub warnings: Vec<String>,
    pub notified: bool,
}

/// Path a file-backed report of `format` is written to.
pub fn report_path(output_dir: &Path, format: ReportFormat) -> Option<PathBuf> {
    format
        .extension()
        .map(|ext| output_dir.join(format!("{REPORT_FILE_STEM}.{ext}")))
}

/// Render a file-backed format to bytes.
fn render_bytes(
    run: &ParsedRun,
    format: ReportFormat,
    path: &Path,
    show_tree: bool,
) -> Result<Vec<u8>, OutputError> {
    match format {
        ReportFormat::Json => {
            let mut buf = Vec::new();
            export::write_json_report(&run.root, &run.metrics, &mut buf, path)?;
            buf.push(b'\n');
            Ok(buf)
        }
        ReportFormat::Markdown => Ok(render::markdown_report(&run.root, &run.metrics).into_bytes()),
        ReportFormat::Html => Ok(render::html_report(&run.root, &run.metrics).into_bytes()),
        ReportFormat::Text => {
            let mut text = String::new();
            if show_tree {
                text.push_str(&render::tree_text(&run.root));
                text.push('\n');
            }
            text.push_str(&render::summary_text(&run.metrics));
            Ok(text.into_bytes())
        }
    }
}

/// Emit every output in `plan`. `stdout` receives the text format.
pub fn emit<W: Write>(run: &ParsedRun, plan: &OutputPlan, mut stdout: W) -> EmitSummary {
    let mut summary = EmitSummary::default();

    for &format in &plan.formats {
        let Some(path) = report_path(&plan.output_dir, format) else {
            // Text goes to stdout.
            let bytes = render_bytes(run, format, Path::new("<stdout>"), plan.show_tree);
            let written = bytes.and_then(|b| {
                stdout.write_all(&b).and_then(|_| stdout.flush()).map_err(|e| OutputError::Io {
                    path: PathBuf::from("<stdout>"),
                    source: e,
                })
            });
            if let Err(e) = written {
                tracing::warn!(error = %e, "Text report failed");
                summary.warnings.push(e.to_string());
            }
            continue;
        };

        match render_bytes(run, format, &path, plan.show_tree).and_then(|b| fs::write_atomic(&path, &b)) {
            Ok(()) => {
                tracing::info!(format = %format, path = %path.display(), "Report written");
                summary.written.push(path);
            }
            Err(e) => {
                tracing::warn!(format = %format, error = %e, "Report failed");
                summary.warnings.push(e.to_string());
            }
        }
    }

    if let Some(url) = &plan.webhook_url {
        let payload = export::notification_payload(&run.metrics, plan.webhook_channel.as_deref());
        let sent = WebhookNotifier::new(url.clone(), plan.webhook_timeout_secs)
            .and_then(|n| n.send(&payload));
        match sent {
            Ok(()) => summary.notified = true,
            Err(e) => {
                tracing::warn!(error = %e, "Webhook notification failed");
                summary.warnings.push(e.to_string());
            }
        }
    }

    summary
}
