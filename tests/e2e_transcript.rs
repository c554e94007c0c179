// PlayLens - tests/e2e_transcript.rs
//
// End-to-end tests for the transcript pipeline.
//
// These tests read a real transcript fixture from disk and drive it through
// the public API: line streaming, the execution context, metrics
// aggregation, report rendering and the atomic report writer. The CLI
// binary is exercised once for its exit status contract.

use chrono::{TimeZone, Utc};
use playlens::app::run::{self, OutputPlan, ParsedRun};
use playlens::core::clock::ManualClock;
use playlens::core::context::ExecutionContext;
use playlens::core::model::{ExecutionNode, ReportFormat, Status, TaskKind, TimingStatus};
use playlens::core::render;
use playlens::platform::fs::InputSource;
use std::fs;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::Command;

// =============================================================================
// Helpers
// =============================================================================

/// Absolute path to the on-disk fixture files.
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn sample_clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
}

/// Parse the sample transcript with a frozen clock.
fn parse_sample() -> ParsedRun {
    let file = fs::File::open(fixture("sample_playbook.log")).unwrap();
    let path = fixture("sample_playbook.log");
    run::parse_reader(
        BufReader::new(file),
        Some(path.as_path()),
        Box::new(sample_clock()),
    )
    .unwrap()
}

/// Parse the sample transcript, advancing the clock one second before
/// every line so timing windows have predictable widths.
fn parse_sample_timed() -> (ExecutionNode, playlens::core::model::Metrics) {
    let clock = sample_clock();
    let mut ctx = ExecutionContext::with_clock(Box::new(clock.clone()));
    let text = fs::read_to_string(fixture("sample_playbook.log")).unwrap();
    for line in text.lines() {
        clock.advance_secs(1);
        ctx.feed(line);
    }
    ctx.finalize()
}

fn child<'a>(node: &'a ExecutionNode, name: &str) -> &'a ExecutionNode {
    node.children
        .iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("no child named {name:?} under {:?}", node.label))
}

// =============================================================================
// Tree shape
// =============================================================================

/// Plays and the recap hang off the root in transcript order.
#[test]
fn e2e_root_holds_plays_and_recap() {
    let parsed = parse_sample();
    let labels: Vec<_> = parsed.root.children.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "PLAY: Configure web tier",
            "PLAY: Configure database",
            "📊 PLAY RECAP",
        ]
    );
    assert_eq!(parsed.root.task_kind, TaskKind::Root);
}

/// Tasks, the handler and the include land where the context puts them.
#[test]
fn e2e_tasks_handler_and_include_are_attached() {
    let parsed = parse_sample();
    let web = child(&parsed.root, "Configure web tier");

    let kinds: Vec<_> = web.children.iter().map(|c| c.task_kind).collect();
    assert_eq!(
        kinds,
        vec![
            TaskKind::Task,
            TaskKind::Task,
            TaskKind::Task,
            TaskKind::Task,
            TaskKind::Task,
            TaskKind::Handler,
        ]
    );

    let facts = child(web, "Gathering Facts");
    assert_eq!(facts.children.len(), 2);
    assert!(facts.children.iter().all(|o| o.status == Status::Ok));

    let include_task = child(web, "app : Include deployment steps");
    assert_eq!(include_task.children.len(), 1);
    let include = &include_task.children[0];
    assert_eq!(include.task_kind, TaskKind::Include);
    assert_eq!(include.label, "📁 INCLUDE: deploy.yml (web01, web02)");
}

/// Once an include is seen, every later outcome attaches to it, across
/// later tasks, the handler and even the next play.
#[test]
fn e2e_include_captures_all_later_outcomes() {
    let parsed = parse_sample();
    let web = child(&parsed.root, "Configure web tier");
    let include = &child(web, "app : Include deployment steps").children[0];

    let hosts: Vec<_> = include
        .children
        .iter()
        .map(|o| (o.host.as_str(), o.status))
        .collect();
    assert_eq!(
        hosts,
        vec![
            ("web01", Status::Changed),
            ("web02", Status::Changed),
            ("web02", Status::Skipping),
            ("web01", Status::Fatal),
            ("web02", Status::Changed),
            ("db01", Status::Ok),
            ("db01", Status::Failed),
        ]
    );

    assert!(child(web, "app : Copy release bundle").children.is_empty());
    let db = child(&parsed.root, "Configure database");
    assert!(db.children.iter().all(|t| t.children.is_empty()));
}

/// Failure details after "=>" survive into the node.
#[test]
fn e2e_outcome_details_are_kept() {
    let parsed = parse_sample();
    let web = child(&parsed.root, "Configure web tier");
    let include = &child(web, "app : Include deployment steps").children[0];
    let fatal = include
        .children
        .iter()
        .find(|o| o.status == Status::Fatal)
        .unwrap();
    assert_eq!(
        fatal.details.as_deref(),
        Some(r#"{"changed": false, "msg": "migration 0042 failed"}"#)
    );
    assert!(fatal.failed);
}

/// Recap host lines are flagged from their failed= counter.
#[test]
fn e2e_recap_hosts() {
    let parsed = parse_sample();
    let recap = parsed.root.children.last().unwrap();
    let rows: Vec<_> = recap
        .children
        .iter()
        .map(|h| (h.label.as_str(), h.failed))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("❌ db01: failed=1", true),
            ("❌ web01: failed=1", true),
            ("✅ web02: failed=0", false),
        ]
    );
}

// =============================================================================
// Metrics
// =============================================================================

#[test]
fn e2e_metrics_counters() {
    let m = parse_sample().metrics;
    assert_eq!(m.total_plays, 2);
    assert_eq!(m.total_tasks, 7);
    assert_eq!(m.total_handlers, 1);
    assert_eq!(m.changed_tasks, 4);
    assert_eq!(m.skipped_tasks, 1);
    assert_eq!(m.failed_tasks, 2);
    assert_eq!(m.hosts, vec!["web01", "web02", "db01"]);
    assert_eq!(m.failed_hosts, vec!["web01", "db01"]);
    assert_eq!(m.lines_processed, 39);
    assert_eq!(m.lines_unrecognised, 1);

    let expected = (7.0 * 3.0 - 2.0) / (7.0 * 3.0) * 100.0;
    assert!((m.success_rate - expected).abs() < 1e-9, "{}", m.success_rate);
}

/// A frozen clock yields zero-width windows, so nothing ranks as slow.
#[test]
fn e2e_frozen_clock_has_no_timed_tasks() {
    let m = parse_sample().metrics;
    assert!(m.task_durations.is_empty());
    assert!(m.slowest_tasks.is_empty());
    assert_eq!(m.total_duration, 0.0);
}

/// Timing windows close on the next TASK line. The task interrupted by a
/// handler and the last task stay open, and the handler is not ranked.
#[test]
fn e2e_slowest_tasks_with_advancing_clock() {
    let (_, m) = parse_sample_timed();

    let slowest: Vec<_> = m
        .slowest_tasks
        .iter()
        .map(|t| (t.name.as_str(), t.duration))
        .collect();
    assert_eq!(
        slowest,
        vec![
            ("Gathering Facts", 4.0),
            ("common : Install base packages", 4.0),
            ("app : Copy release bundle", 4.0),
            ("app : Include deployment steps", 3.0),
            ("Gathering Facts", 3.0),
        ]
    );
    assert_eq!(m.total_duration, 39.0);

    // The include task owns every failure that followed it.
    let failed: Vec<_> = m
        .task_durations
        .iter()
        .filter(|t| t.status == TimingStatus::Failed)
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(failed, vec!["app : Include deployment steps"]);
}

#[test]
fn e2e_open_windows_after_finalize() {
    let (root, _) = parse_sample_timed();
    let web = child(&root, "Configure web tier");
    assert_eq!(child(web, "app : Run migrations").duration, None);
    let handler = child(web, "app : restart app");
    assert_eq!(handler.start_time, None);
    assert_eq!(handler.duration, None);
    assert_eq!(web.end_time, None);
    assert!(root.end_time.is_some());
}

// =============================================================================
// Rendering and output
// =============================================================================

#[test]
fn e2e_tree_text_lines() {
    let parsed = parse_sample();
    let text = render::tree_text(&parsed.root);
    let lines: Vec<_> = text.lines().collect();

    assert_eq!(lines[0], "🎯 Playbook Execution");
    assert_eq!(lines[1], "├── PLAY: Configure web tier");
    assert_eq!(lines[2], "│   ├── TASK: Gathering Facts");
    assert_eq!(lines[3], "│   │   ├── ✅ web01: ok");
    assert!(text.contains("\n│   │   └── 📁 INCLUDE: deploy.yml (web01, web02)\n"));
    assert!(text.contains("\n│   │       ├── 🔄 web01: changed\n"));
    assert!(text.contains(concat!(
        "\n│   │       ├── ❌ web01: fatal\n",
        "│   │       │   💬 {\"changed\": false, \"msg\": \"migration 0042 failed\"}\n",
    )));
    assert!(text.contains(concat!(
        "\n│   │       └── ❌ db01: failed\n",
        "│   │           💬 {\"msg\": \"disk full\"}\n",
    )));
    assert!(text.contains("\n│   └── HANDLER: app : restart app\n"));
    assert_eq!(lines.last().copied(), Some("    └── ✅ web02: failed=0"));
}

#[test]
fn e2e_emit_writes_reports_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let parsed = parse_sample();
    let plan = OutputPlan {
        formats: vec![ReportFormat::Json, ReportFormat::Markdown, ReportFormat::Html],
        output_dir: dir.path().to_path_buf(),
        show_tree: true,
        webhook_url: None,
        webhook_timeout_secs: 1,
        webhook_channel: None,
    };
    let mut stdout = Vec::new();
    let summary = run::emit(&parsed, &plan, &mut stdout);

    assert!(summary.warnings.is_empty(), "{:?}", summary.warnings);
    assert!(stdout.is_empty());
    assert_eq!(summary.written.len(), 3);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("playbook_report.json")).unwrap())
            .unwrap();
    assert_eq!(json["metrics"]["total_tasks"], 7);
    assert_eq!(json["metrics"]["failed_hosts"][1], "db01");
    assert_eq!(json["execution_tree"]["children"][0]["task_kind"], "play");
    assert_eq!(json["execution_tree"]["children"][0]["name"], "Configure web tier");

    let md = fs::read_to_string(dir.path().join("playbook_report.md")).unwrap();
    assert!(md.contains("## Execution Tree"));
    assert!(md.contains("migration 0042 failed"));

    let html = fs::read_to_string(dir.path().join("playbook_report.html")).unwrap();
    assert!(html.contains("&quot;disk full&quot;"));
    assert!(!html.contains(r#""disk full""#));
}

#[test]
fn e2e_missing_input_is_not_found() {
    let source = InputSource::from_arg(Some(fixture("no_such_transcript.log").as_path()));
    let err = run::parse_source(&source).unwrap_err();
    assert!(matches!(
        err,
        playlens::util::error::InputError::NotFound { .. }
    ));
}

// =============================================================================
// CLI
// =============================================================================

#[test]
fn e2e_cli_exit_status_reflects_failures() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_playlens"))
        .arg(fixture("sample_playbook.log"))
        .args(["--format", "json", "--quiet", "--output-dir"])
        .arg(dir.path())
        .env("RUST_LOG", "off")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(dir.path().join("playbook_report.json").exists());
}

#[test]
fn e2e_cli_missing_input_exits_2() {
    let output = Command::new(env!("CARGO_BIN_EXE_playlens"))
        .arg(fixture("no_such_transcript.log"))
        .env("RUST_LOG", "off")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}
