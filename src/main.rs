// PlayLens - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading
// 3. Logging initialisation (debug mode support)
// 4. Parsing the transcript and emitting reports
// 5. Mapping the run result to a process exit status

use clap::Parser;
use playlens::app::run::{self, OutputPlan};
use playlens::core::model::ReportFormat;
use playlens::platform::config::{self, AppConfig};
use playlens::platform::fs::InputSource;
use playlens::util::error::{InputError, PlayLensError};
use playlens::util::{constants, logging};
use std::path::PathBuf;

/// PlayLens - turn a playbook run transcript into a tree, metrics and reports.
///
/// Reads the transcript from INPUT, or from standard input when INPUT is
/// omitted or "-". Exits 1 when any task failed, 2 when the input cannot be
/// read.
#[derive(Parser, Debug)]
#[command(name = "playlens", version, about)]
struct Cli {
    /// Transcript file ("-" or omitted reads stdin).
    input: Option<PathBuf>,

    /// Output format; may be repeated (text, json, markdown, html).
    #[arg(short = 'f', long = "format", value_parser = parse_format)]
    formats: Vec<ReportFormat>,

    /// Directory for json/markdown/html reports.
    #[arg(short = 'o', long = "output-dir")]
    output_dir: Option<PathBuf>,

    /// Chat webhook URL receiving the run summary.
    #[arg(short = 'w', long = "webhook-url")]
    webhook_url: Option<String>,

    /// Channel sent with the webhook payload.
    #[arg(long = "channel", alias = "slack-channel")]
    channel: Option<String>,

    /// Config file (defaults to the platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Suppress the text report on stdout.
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    /// Print only the summary in the text report, without the tree.
    #[arg(long = "no-tree")]
    no_tree: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn parse_format(name: &str) -> Result<ReportFormat, String> {
    ReportFormat::from_name(name).ok_or_else(|| {
        format!(
            "unknown format '{name}' (expected one of: {})",
            constants::KNOWN_FORMATS.join(", ")
        )
    })
}

/// Load config from `--config` (errors are fatal) or the platform default
/// location (errors are warnings).
fn load_app_config(
    explicit: Option<&PathBuf>,
) -> Result<(AppConfig, Vec<String>), PlayLensError> {
    if let Some(path) = explicit {
        return Ok(config::load_config(path)?);
    }
    match config::default_config_path() {
        Some(path) if path.exists() => match config::load_config(&path) {
            Ok(loaded) => Ok(loaded),
            Err(e) => Ok((AppConfig::default(), vec![format!("{e}. Using defaults.")])),
        },
        _ => Ok((AppConfig::default(), Vec::new())),
    }
}

/// Report a fatal error on stderr and exit with its status.
fn fail(err: PlayLensError) -> ! {
    eprintln!("Error: {err}");
    if matches!(err, PlayLensError::Input(InputError::NotFound { .. })) {
        eprintln!("Check the transcript path and try again.");
    }
    std::process::exit(err.exit_code());
}

fn main() {
    let cli = Cli::parse();

    let (app_config, config_warnings) = match load_app_config(cli.config.as_ref()) {
        Ok(loaded) => loaded,
        Err(e) => fail(e),
    };

    let log_warning = logging::init(
        cli.debug,
        app_config.log_level.as_deref(),
        app_config.log_file.as_deref(),
    );
    for warning in config_warnings.iter().chain(log_warning.iter()) {
        tracing::warn!("{}", warning);
    }

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "PlayLens starting"
    );

    let source = InputSource::from_arg(cli.input.as_deref());
    let parsed = match run::parse_source(&source) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::error!(error = %e, "Cannot read transcript");
            fail(e.into())
        }
    };

    let mut formats = if cli.formats.is_empty() {
        app_config.formats.clone()
    } else {
        cli.formats.clone()
    };
    if cli.quiet {
        formats.retain(|f| *f != ReportFormat::Text);
    }

    let plan = OutputPlan {
        formats,
        output_dir: cli.output_dir.unwrap_or(app_config.output_dir),
        show_tree: !cli.no_tree,
        webhook_url: cli.webhook_url.or(app_config.webhook_url),
        webhook_timeout_secs: app_config.webhook_timeout_secs,
        webhook_channel: cli.channel.or(app_config.webhook_channel),
    };

    let summary = run::emit(&parsed, &plan, std::io::stdout().lock());
    for path in &summary.written {
        eprintln!("Report written: {}", path.display());
    }
    for warning in &summary.warnings {
        eprintln!("Warning: {warning}");
    }

    std::process::exit(parsed.exit_code());
}
