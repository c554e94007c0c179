// PlayLens - core/render.rs
//
// Human-readable renderers over a finished execution tree: tree text for the
// terminal, Markdown, and a standalone HTML page.
// Core layer: builds strings only, never writes files.

use crate::core::model::{ExecutionNode, Metrics};
use crate::util::constants::{
    HTML_MAX_DETAILS_LEN, MARKDOWN_MAX_DETAILS_LEN, MAX_RENDER_DEPTH, ROOT_MARKER,
    TREE_MAX_DETAILS_LEN,
};
use std::fmt::Write;

// =============================================================================
// Tree text
// =============================================================================

/// Render the tree with box-drawing connectors. Short outcome details are
/// shown on a `💬` line under their node.
///
/// ```text
/// 🎯 Playbook Execution
/// ├── PLAY: Deploy
/// │   └── TASK: Install
/// │       └── ❌ web01: failed
/// │           💬 disk full
/// └── 📊 PLAY RECAP
/// ```
pub fn tree_text(root: &ExecutionNode) -> String {
    let mut out = format!("{ROOT_MARKER} {}\n", root.label);
    tree_text_children(root, "", 1, &mut out);
    out
}

fn tree_text_children(node: &ExecutionNode, prefix: &str, depth: usize, out: &mut String) {
    if depth > MAX_RENDER_DEPTH {
        tracing::warn!(depth, "Tree render depth ceiling reached; subtree omitted");
        return;
    }
    let last = node.children.len().saturating_sub(1);
    for (i, child) in node.children.iter().enumerate() {
        let (connector, guide) = if i == last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        let _ = writeln!(out, "{prefix}{connector}{}", child.label);

        let child_prefix = format!("{prefix}{guide}");
        if let Some(details) = child
            .details
            .as_deref()
            .filter(|d| d.chars().count() < TREE_MAX_DETAILS_LEN)
        {
            let _ = writeln!(out, "{child_prefix}💬 {details}");
        }
        tree_text_children(child, &child_prefix, depth + 1, out);
    }
}

/// Plain-text summary block printed under the tree.
pub fn summary_text(metrics: &Metrics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Duration:      {:.2}s", metrics.total_duration);
    let _ = writeln!(out, "Success rate:  {:.1}%", metrics.success_rate);
    let _ = writeln!(
        out,
        "Plays: {}  Tasks: {}  Handlers: {}",
        metrics.total_plays, metrics.total_tasks, metrics.total_handlers
    );
    let _ = writeln!(
        out,
        "Changed: {}  Failed: {}  Skipped: {}",
        metrics.changed_tasks, metrics.failed_tasks, metrics.skipped_tasks
    );
    let _ = writeln!(out, "Hosts:         {}", join_or_none(&metrics.hosts));
    if !metrics.failed_hosts.is_empty() {
        let _ = writeln!(out, "Failed hosts:  {}", metrics.failed_hosts.join(", "));
    }
    if !metrics.slowest_tasks.is_empty() {
        let _ = writeln!(out, "Slowest tasks:");
        for (i, t) in metrics.slowest_tasks.iter().enumerate() {
            let _ = writeln!(out, "  {:>2}. {:<50} {:>8.2}s", i + 1, t.name, t.duration);
        }
    }
    out
}

/// Finalize time of the run, formatted for report headers.
fn generated_at(root: &ExecutionNode) -> Option<String> {
    root.end_time
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

// =============================================================================
// Markdown
// =============================================================================

/// Markdown report: header, summary block, then one bullet per node.
pub fn markdown_report(root: &ExecutionNode, metrics: &Metrics) -> String {
    let mut out = String::from("# 🎯 Playbook Execution Report\n\n");
    if let Some(at) = generated_at(root) {
        let _ = writeln!(out, "Generated automatically from playbook execution at {at}\n");
    }

    out.push_str("## Summary\n\n");
    let _ = writeln!(out, "- **Duration:** {:.2}s", metrics.total_duration);
    let _ = writeln!(out, "- **Success Rate:** {:.1}%", metrics.success_rate);
    let _ = writeln!(out, "- **Total Tasks:** {}", metrics.total_tasks);
    let _ = writeln!(out, "- **Failed Tasks:** {}", metrics.failed_tasks);
    let _ = writeln!(out, "- **Changed Tasks:** {}", metrics.changed_tasks);
    let _ = writeln!(out, "- **Skipped Tasks:** {}", metrics.skipped_tasks);
    let _ = writeln!(out, "- **Hosts:** {}", join_or_none(&metrics.hosts));
    if !metrics.failed_hosts.is_empty() {
        let _ = writeln!(out, "- **Failed Hosts:** {}", metrics.failed_hosts.join(", "));
    }

    if !metrics.slowest_tasks.is_empty() {
        out.push_str("\n## Slowest Tasks\n\n");
        out.push_str("| # | Task | Duration |\n|---|------|----------|\n");
        for (i, t) in metrics.slowest_tasks.iter().enumerate() {
            let _ = writeln!(
                out,
                "| {} | {} | {:.2}s |",
                i + 1,
                t.name.replace('|', "\\|"),
                t.duration
            );
        }
    }

    out.push_str("\n## Execution Tree\n\n");
    for child in &root.children {
        markdown_node(child, &mut out);
    }
    out
}

fn markdown_node(node: &ExecutionNode, out: &mut String) {
    let depth = usize::from(node.depth);
    if depth > MAX_RENDER_DEPTH {
        return;
    }
    let indent = " ".repeat(depth * 2);
    let _ = writeln!(out, "{indent}- {}", node.label);
    if let Some(details) = node
        .details
        .as_deref()
        .filter(|d| d.len() < MARKDOWN_MAX_DETAILS_LEN)
    {
        let _ = writeln!(out, "{indent}  - Details: `{details}`");
    }
    for child in &node.children {
        markdown_node(child, out);
    }
}

// =============================================================================
// HTML
// =============================================================================

/// Standalone HTML page with summary, slowest tasks and the nested tree.
pub fn html_report(root: &ExecutionNode, metrics: &Metrics) -> String {
    let rate_class = if metrics.has_failures() { "bad" } else { "good" };
    let mut out = String::new();
    out.push_str(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Playbook Execution Report</title>\n<style>\n\
         body { font-family: sans-serif; margin: 2em; }\n\
         table { border-collapse: collapse; }\n\
         td, th { border: 1px solid #ccc; padding: 4px 8px; text-align: left; }\n\
         ul { list-style: none; }\n\
         .good { color: #1a7f37; } .bad { color: #cf222e; }\n\
         .failed > span { color: #cf222e; font-weight: bold; }\n\
         .details { color: #555; font-family: monospace; white-space: pre-wrap; }\n\
         </style>\n</head>\n<body>\n",
    );
    let _ = writeln!(out, "<h1>{ROOT_MARKER} {}</h1>", escape_html(&root.label));
    if let Some(at) = generated_at(root) {
        let _ = writeln!(out, "<p>Generated at {at}</p>");
    }

    out.push_str("<h2>Summary</h2>\n<table>\n");
    let rows = [
        ("Duration", format!("{:.2}s", metrics.total_duration)),
        ("Total Tasks", metrics.total_tasks.to_string()),
        ("Failed Tasks", metrics.failed_tasks.to_string()),
        ("Changed Tasks", metrics.changed_tasks.to_string()),
        ("Skipped Tasks", metrics.skipped_tasks.to_string()),
        ("Hosts", join_or_none(&metrics.hosts)),
    ];
    let _ = writeln!(
        out,
        "<tr><th>Success Rate</th><td class=\"{rate_class}\">{:.1}%</td></tr>",
        metrics.success_rate
    );
    for (key, value) in rows {
        let _ = writeln!(out, "<tr><th>{key}</th><td>{}</td></tr>", escape_html(&value));
    }
    out.push_str("</table>\n");

    if !metrics.slowest_tasks.is_empty() {
        out.push_str("<h2>Slowest Tasks</h2>\n<table>\n<tr><th>#</th><th>Task</th><th>Duration</th></tr>\n");
        for (i, t) in metrics.slowest_tasks.iter().enumerate() {
            let _ = writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{:.2}s</td></tr>",
                i + 1,
                escape_html(&t.name),
                t.duration
            );
        }
        out.push_str("</table>\n");
    }

    out.push_str("<h2>Execution Tree</h2>\n<ul>\n");
    for child in &root.children {
        html_node(child, 1, &mut out);
    }
    out.push_str("</ul>\n</body>\n</html>\n");
    out
}

fn html_node(node: &ExecutionNode, depth: usize, out: &mut String) {
    if depth > MAX_RENDER_DEPTH {
        return;
    }
    let class = if node.failed { " class=\"failed\"" } else { "" };
    let _ = write!(out, "<li{class}><span>{}</span>", escape_html(&node.label));
    if let Some(details) = &node.details {
        let shown: String = details.chars().take(HTML_MAX_DETAILS_LEN).collect();
        let _ = write!(out, "<div class=\"details\">{}</div>", escape_html(&shown));
    }
    if !node.children.is_empty() {
        out.push_str("\n<ul>\n");
        for child in &node.children {
            html_node(child, depth + 1, out);
        }
        out.push_str("</ul>\n");
    }
    out.push_str("</li>\n");
}

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::context::ExecutionContext;
    use chrono::{TimeZone, Utc};

    fn parse(lines: &[&str]) -> (ExecutionNode, Metrics) {
        let clock = ManualClock::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        let mut ctx = ExecutionContext::with_clock(Box::new(clock.clone()));
        for line in lines {
            ctx.feed(line);
            clock.advance_secs(1);
        }
        ctx.finalize()
    }

    #[test]
    fn test_tree_text_connectors_and_indent() {
        let (root, _) = parse(&[
            "PLAY [Deploy]",
            "TASK [a]",
            "ok: [web01]",
            "TASK [b]",
            "PLAY RECAP",
        ]);
        let text = tree_text(&root);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "🎯 Playbook Execution",
                "├── PLAY: Deploy",
                "│   ├── TASK: a",
                "│   │   └── ✅ web01: ok",
                "│   └── TASK: b",
                "└── 📊 PLAY RECAP",
            ]
        );
    }

    #[test]
    fn test_tree_text_shows_short_details_only() {
        let long = "y".repeat(120);
        let failed_long = format!("failed: [web02] => {long}");
        let (root, _) = parse(&[
            "PLAY [Deploy]",
            "TASK [a]",
            "failed: [web01] => disk full",
            &failed_long,
        ]);
        let text = tree_text(&root);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "🎯 Playbook Execution",
                "└── PLAY: Deploy",
                "    └── TASK: a",
                "        ├── ❌ web01: failed",
                "        │   💬 disk full",
                "        └── ❌ web02: failed",
            ]
        );
    }

    #[test]
    fn test_markdown_indent_and_details_limit() {
        let long = "x".repeat(300);
        let failed_long = format!("failed: [web02] => {long}");
        let (root, metrics) = parse(&[
            "PLAY [Deploy]",
            "TASK [a]",
            "failed: [web01] => short reason",
            &failed_long,
        ]);
        let md = markdown_report(&root, &metrics);
        assert!(md.starts_with("# "));
        // Four lines at one second each after 2023-11-14 22:13:20 UTC.
        assert!(md.contains(
            "Generated automatically from playbook execution at 2023-11-14 22:13:24 UTC\n"
        ));
        assert!(md.contains("- **Failed Tasks:** 2"));
        assert!(md.contains("\n  - PLAY: Deploy\n"));
        assert!(md.contains("\n    - TASK: a\n"));
        assert!(md.contains("\n        - ❌ web01: failed\n"));
        assert!(md.contains("          - Details: `short reason`"));
        assert!(!md.contains(&long), "long details must be omitted");
    }

    #[test]
    fn test_html_escapes_labels_and_details() {
        let (root, metrics) = parse(&[
            "PLAY [<script>alert(1)</script>]",
            "TASK [a & b]",
            "fatal: [web01] => \"quoted\" <tag>",
        ]);
        let html = html_report(&root, &metrics);
        assert!(!html.contains("<script>"));
        assert!(html.contains("PLAY: &lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("TASK: a &amp; b"));
        assert!(html.contains("&quot;quoted&quot; &lt;tag&gt;"));
        assert!(html.contains("class=\"failed\""));
        assert!(html.contains("class=\"bad\""));
        assert!(html.contains("<p>Generated at 2023-11-14 22:13:23 UTC</p>"));
    }

    #[test]
    fn test_summary_text_lists_slowest() {
        let (_, metrics) = parse(&["PLAY [p]", "TASK [one]", "ok: [h1]", "TASK [two]"]);
        let summary = summary_text(&metrics);
        assert!(summary.contains("Success rate:  100.0%"));
        assert!(summary.contains("Hosts:         h1"));
        assert!(summary.contains(" 1. one"));
    }
}
