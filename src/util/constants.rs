// PlayLens - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "PlayLens";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "PlayLens";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Execution tree
// =============================================================================

/// Label given to the synthetic root node.
pub const ROOT_LABEL: &str = "Playbook Execution";

/// Marker printed in front of the root label in the tree-text render.
pub const ROOT_MARKER: &str = "🎯";

/// Label given to the recap block node.
pub const RECAP_LABEL: &str = "PLAY RECAP";

/// Number of entries kept in the slowest-task ranking.
pub const SLOWEST_TASKS_LIMIT: usize = 10;

// =============================================================================
// Rendering limits
// =============================================================================

/// Deepest tree level any renderer descends into. Real transcripts never
/// exceed depth 4; anything deeper is a malformed tree.
pub const MAX_RENDER_DEPTH: usize = 16;

/// Details strings at or above this length are left out of the Markdown report.
pub const MARKDOWN_MAX_DETAILS_LEN: usize = 200;

/// Outcome details shorter than this are echoed in the tree-text render.
pub const TREE_MAX_DETAILS_LEN: usize = 100;

/// Details strings longer than this are cut in the HTML report.
pub const HTML_MAX_DETAILS_LEN: usize = 2_000;

// =============================================================================
// Reports
// =============================================================================

/// Base file name (without extension) for written reports.
pub const REPORT_FILE_STEM: &str = "playbook_report";

/// Default directory reports are written to.
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// Format used when neither the CLI nor config names one.
pub const DEFAULT_FORMAT: &str = "text";

/// Every format name accepted in `[report] formats`.
pub const KNOWN_FORMATS: &[&str] = &["text", "json", "markdown", "html"];

// =============================================================================
// Notification
// =============================================================================

/// Default webhook request timeout in seconds.
pub const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 10;

/// Minimum user-configurable webhook timeout.
pub const MIN_WEBHOOK_TIMEOUT_SECS: u64 = 1;

/// Maximum user-configurable webhook timeout.
pub const MAX_WEBHOOK_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// Exit codes
// =============================================================================

/// Run parsed and no task failed.
pub const EXIT_OK: i32 = 0;

/// Run parsed and at least one task failed.
pub const EXIT_TASKS_FAILED: i32 = 1;

/// Input could not be opened or read.
pub const EXIT_INPUT_ERROR: i32 = 2;

/// An explicitly requested config file was unusable.
pub const EXIT_CONFIG_ERROR: i32 = 3;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a transcript line included in debug output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
