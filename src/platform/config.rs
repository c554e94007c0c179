// PlayLens - platform/config.rs
//
// Config directory resolution and config.toml loading with validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::model::ReportFormat;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Default location of config.toml for this platform, if one can be resolved.
pub fn default_config_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", constants::APP_ID)?;
    let path = dirs.config_dir().join(constants::CONFIG_FILE_NAME);
    tracing::debug!(path = %path.display(), "Default config path resolved");
    Some(path)
}

// =============================================================================
// config.toml shape
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[report]` section.
    pub report: ReportSection,
    /// `[notify]` section.
    pub notify: NotifySection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[report]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ReportSection {
    /// Formats produced when the CLI names none.
    pub formats: Option<Vec<String>>,
    /// Directory written reports go to.
    pub output_dir: Option<String>,
}

/// `[notify]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct NotifySection {
    /// Chat webhook receiving the run summary.
    pub webhook_url: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Channel override sent with the payload.
    pub channel: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated configuration.
///
/// Invalid values produce warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Report --
    pub formats: Vec<ReportFormat>,
    pub output_dir: PathBuf,

    // -- Notify --
    pub webhook_url: Option<String>,
    pub webhook_timeout_secs: u64,
    pub webhook_channel: Option<String>,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            formats: vec![ReportFormat::Text],
            output_dir: PathBuf::from(constants::DEFAULT_OUTPUT_DIR),
            webhook_url: None,
            webhook_timeout_secs: constants::DEFAULT_WEBHOOK_TIMEOUT_SECS,
            webhook_channel: None,
            log_level: None,
            log_file: None,
        }
    }
}

/// Read and validate the config file at `path`.
///
/// Read and TOML errors are returned; out-of-range values become warnings.
/// Runs before logging is initialised, so nothing here logs.
pub fn load_config(path: &Path) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let raw: RawConfig = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(validate(raw))
}

/// Validate each field against named constants, accumulating all warnings.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings: Vec<String> = Vec::new();

    // -- Report: formats --
    if let Some(names) = raw.report.formats {
        let mut formats = Vec::new();
        for name in &names {
            match ReportFormat::from_name(name) {
                Some(f) if !formats.contains(&f) => formats.push(f),
                Some(_) => {}
                None => warnings.push(
                    ConfigError::ValueOutOfRange {
                        field: "[report] formats".to_string(),
                        value: name.clone(),
                        expected: constants::KNOWN_FORMATS.join(", "),
                    }
                    .to_string(),
                ),
            }
        }
        if formats.is_empty() {
            warnings.push(format!(
                "[report] formats names no usable format. Using default ({}).",
                constants::DEFAULT_FORMAT
            ));
        } else {
            config.formats = formats;
        }
    }

    // -- Report: output_dir --
    if let Some(dir) = raw.report.output_dir.filter(|d| !d.trim().is_empty()) {
        config.output_dir = PathBuf::from(dir);
    }

    // -- Notify: webhook_url --
    if let Some(url) = raw.notify.webhook_url.filter(|u| !u.trim().is_empty()) {
        if url.starts_with("http://") || url.starts_with("https://") {
            config.webhook_url = Some(url);
        } else {
            warnings.push(format!(
                "[notify] webhook_url = \"{url}\" is not an http(s) URL. Notifications disabled.",
            ));
        }
    }

    // -- Notify: timeout_secs --
    if let Some(secs) = raw.notify.timeout_secs {
        if (constants::MIN_WEBHOOK_TIMEOUT_SECS..=constants::MAX_WEBHOOK_TIMEOUT_SECS)
            .contains(&secs)
        {
            config.webhook_timeout_secs = secs;
        } else {
            warnings.push(format!(
                "[notify] timeout_secs = {secs} is out of range ({}-{}). Using default ({}).",
                constants::MIN_WEBHOOK_TIMEOUT_SECS,
                constants::MAX_WEBHOOK_TIMEOUT_SECS,
                constants::DEFAULT_WEBHOOK_TIMEOUT_SECS,
            ));
        }
    }

    // -- Notify: channel --
    if let Some(channel) = raw.notify.channel.filter(|c| !c.trim().is_empty()) {
        config.webhook_channel = Some(channel.trim().to_string());
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    // -- Logging: file --
    if let Some(file) = raw.logging.file.filter(|f| !f.is_empty()) {
        config.log_file = Some(file);
    }

    (config, warnings)
}
