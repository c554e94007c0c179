// PlayLens - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Parsing itself never fails; these cover the input, output, notification
// and configuration edges around it.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all PlayLens operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum PlayLensError {
    /// Transcript input could not be opened or read.
    Input(InputError),

    /// A report could not be rendered or written.
    Output(OutputError),

    /// The webhook notification failed.
    Notify(NotifyError),

    /// Configuration loading or validation failed.
    Config(ConfigError),
}

impl fmt::Display for PlayLensError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(e) => write!(f, "Input error: {e}"),
            Self::Output(e) => write!(f, "Output error: {e}"),
            Self::Notify(e) => write!(f, "Notification error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl PlayLensError {
    /// Process exit status for a run aborted by this error.
    pub fn exit_code(&self) -> i32 {
        use super::constants::{EXIT_CONFIG_ERROR, EXIT_INPUT_ERROR, EXIT_TASKS_FAILED};
        match self {
            Self::Input(_) => EXIT_INPUT_ERROR,
            Self::Config(_) => EXIT_CONFIG_ERROR,
            // Output channels only ever warn; reaching here is still a failed run.
            Self::Output(_) | Self::Notify(_) => EXIT_TASKS_FAILED,
        }
    }
}

impl std::error::Error for PlayLensError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Input(e) => Some(e),
            Self::Output(e) => Some(e),
            Self::Notify(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Input errors
// ---------------------------------------------------------------------------

/// Errors opening or reading the transcript.
#[derive(Debug)]
pub enum InputError {
    /// The transcript file does not exist.
    NotFound { path: PathBuf },

    /// The transcript file exists but could not be opened.
    Open { path: PathBuf, source: io::Error },

    /// Reading failed part-way through the stream.
    Read {
        /// `None` when reading standard input.
        path: Option<PathBuf>,
        line_number: u64,
        source: io::Error,
    },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path } => {
                write!(f, "Transcript '{}' does not exist", path.display())
            }
            Self::Open { path, source } => {
                write!(f, "Cannot open transcript '{}': {source}", path.display())
            }
            Self::Read {
                path,
                line_number,
                source,
            } => {
                let name = path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<stdin>".to_string());
                write!(f, "'{name}' line {line_number}: read failed: {source}")
            }
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Read { source, .. } => Some(source),
            Self::NotFound { .. } => None,
        }
    }
}

impl From<InputError> for PlayLensError {
    fn from(e: InputError) -> Self {
        Self::Input(e)
    }
}

// ---------------------------------------------------------------------------
// Output errors
// ---------------------------------------------------------------------------

/// Errors writing a report.
#[derive(Debug)]
pub enum OutputError {
    /// I/O error writing the report file.
    Io { path: PathBuf, source: io::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Report I/O error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON report error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<OutputError> for PlayLensError {
    fn from(e: OutputError) -> Self {
        Self::Output(e)
    }
}

// ---------------------------------------------------------------------------
// Notification errors
// ---------------------------------------------------------------------------

/// Errors delivering the webhook notification.
#[derive(Debug)]
pub enum NotifyError {
    /// The HTTP client could not be built or the request failed in transit.
    Transport { url: String, source: reqwest::Error },

    /// The endpoint answered with a non-success status.
    Rejected { url: String, status: u16 },
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { url, source } => {
                write!(f, "Webhook request to '{url}' failed: {source}")
            }
            Self::Rejected { url, status } => {
                write!(f, "Webhook '{url}' answered HTTP {status}")
            }
        }
    }
}

impl std::error::Error for NotifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport { source, .. } => Some(source),
            Self::Rejected { .. } => None,
        }
    }
}

impl From<NotifyError> for PlayLensError {
    fn from(e: NotifyError) -> Self {
        Self::Notify(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for PlayLensError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for PlayLens results.
pub type Result<T> = std::result::Result<T, PlayLensError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_input_not_found_display_names_path() {
        let err = PlayLensError::from(InputError::NotFound {
            path: PathBuf::from("missing.log"),
        });
        let text = err.to_string();
        assert!(text.starts_with("Input error:"), "got: {text}");
        assert!(text.contains("missing.log"));
        assert_eq!(err.exit_code(), crate::util::constants::EXIT_INPUT_ERROR);
    }

    #[test]
    fn test_stdin_read_error_display() {
        let err = InputError::Read {
            path: None,
            line_number: 7,
            source: io::Error::new(io::ErrorKind::Other, "boom"),
        };
        assert_eq!(err.to_string(), "'<stdin>' line 7: read failed: boom");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_output_error_keeps_source_chain() {
        let err = PlayLensError::from(OutputError::Io {
            path: PathBuf::from("out/report.md"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        });
        let inner = err.source().expect("top-level error should expose its cause");
        assert!(inner.source().is_some(), "io::Error should be chained");
    }
}
