// PlayLens - util/logging.rs
//
// Structured logging with runtime-selectable debug mode.
//
// Activation:
//   - Environment variable: RUST_LOG=debug (or trace)
//   - CLI flag: --debug (sets the filter to debug)
//   - Config file: [logging] level = "debug"
//
// Output: stderr (stdout is reserved for reports). Optionally also to a file.

use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Initialise the logging subsystem.
///
/// `debug_flag` is true when the user passed --debug on the CLI.
/// `config_level` is the level from config.toml (if present).
/// `log_file` is the optional log file path from config.toml.
///
/// Priority: RUST_LOG env var > CLI --debug flag > config level > default "info".
///
/// Returns a warning message when the log file could not be opened; logging
/// then continues on stderr only.
pub fn init(debug_flag: bool, config_level: Option<&str>, log_file: Option<&str>) -> Option<String> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug_flag {
        EnvFilter::new("debug")
    } else if let Some(level) = config_level {
        EnvFilter::new(level)
    } else {
        EnvFilter::new(super::constants::DEFAULT_LOG_LEVEL)
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .compact();

    let mut warning = None;
    let file = match log_file {
        Some(path) => match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => Some(f),
            Err(e) => {
                warning = Some(format!(
                    "Could not open log file '{path}': {e}. Logging to stderr only."
                ));
                None
            }
        },
        None => None,
    };

    match file {
        Some(f) => {
            // ANSI colour codes would end up in the file, so both sinks go plain.
            builder
                .with_ansi(false)
                .with_writer(std::io::stderr.and(Mutex::new(f)))
                .init();
        }
        None => {
            builder.with_writer(std::io::stderr).init();
        }
    }

    tracing::debug!(
        app = super::constants::APP_NAME,
        version = super::constants::APP_VERSION,
        "Logging initialised"
    );

    warning
}
