// PlayLens - platform/fs.rs
//
// Filesystem helpers: opening the transcript (file or stdin), streaming it
// line by line, and writing reports atomically.

use crate::util::error::{InputError, OutputError};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Where the transcript comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// `None` or `-` means standard input.
    pub fn from_arg(arg: Option<&Path>) -> Self {
        match arg {
            Some(p) if p != Path::new("-") => Self::File(p.to_path_buf()),
            _ => Self::Stdin,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Stdin => None,
            Self::File(p) => Some(p),
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Self::Stdin => "<stdin>".to_string(),
            Self::File(p) => p.display().to_string(),
        }
    }
}

/// Open the transcript for buffered reading.
///
/// A missing file is reported as `InputError::NotFound` so the caller can
/// exit before any parsing starts.
pub fn open_input(source: &InputSource) -> Result<Box<dyn BufRead>, InputError> {
    match source {
        InputSource::Stdin => Ok(Box::new(BufReader::new(io::stdin()))),
        InputSource::File(path) => match std::fs::File::open(path) {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(InputError::NotFound { path: path.clone() })
            }
            Err(e) => Err(InputError::Open {
                path: path.clone(),
                source: e,
            }),
        },
    }
}

/// Stream `reader` one line at a time into `on_line`.
///
/// Invalid UTF-8 is replaced rather than aborting the run. Returns the number
/// of lines read.
pub fn for_each_line<R: BufRead>(
    mut reader: R,
    path: Option<&Path>,
    mut on_line: impl FnMut(&str),
) -> Result<u64, InputError> {
    let mut buf = Vec::new();
    let mut line_number: u64 = 0;
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| InputError::Read {
                path: path.map(Path::to_path_buf),
                line_number: line_number + 1,
                source: e,
            })?;
        if read == 0 {
            break;
        }
        line_number += 1;
        let text = String::from_utf8_lossy(&buf);
        on_line(text.trim_end_matches(|c: char| c == '\n' || c == '\r'));
    }
    Ok(line_number)
}

/// Write `bytes` to `path` atomically (write temp, then rename).
///
/// Creates parent directories as needed. A failure never leaves a partial
/// report behind under the final name.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), OutputError> {
    let io_err = |source: io::Error| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    std::fs::write(&tmp, bytes).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        io_err(e)
    })?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_input_source_from_arg() {
        assert_eq!(InputSource::from_arg(None), InputSource::Stdin);
        assert_eq!(InputSource::from_arg(Some(Path::new("-"))), InputSource::Stdin);
        assert_eq!(
            InputSource::from_arg(Some(Path::new("run.log"))),
            InputSource::File(PathBuf::from("run.log"))
        );
    }

    #[test]
    fn test_open_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = InputSource::File(dir.path().join("nope.log"));
        assert!(matches!(
            open_input(&missing),
            Err(InputError::NotFound { .. })
        ));
    }

    #[test]
    fn test_for_each_line_strips_endings_and_replaces_bad_utf8() {
        let data: &[u8] = b"PLAY [a]\r\nTASK [\xffb]\nlast line without newline";
        let mut lines = Vec::new();
        let count = for_each_line(Cursor::new(data), None, |l| lines.push(l.to_string())).unwrap();
        assert_eq!(count, 3);
        assert_eq!(lines[0], "PLAY [a]");
        assert_eq!(lines[1], "TASK [\u{FFFD}b]");
        assert_eq!(lines[2], "last line without newline");
    }

    #[test]
    fn test_write_atomic_creates_parents_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("reports").join("playbook_report.md");
        write_atomic(&target, b"# report").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "# report");
        assert!(!dir.path().join("reports").join("playbook_report.md.tmp").exists());

        write_atomic(&target, b"# second").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "# second");
    }
}
