// crates/tabflow-core/src/progress.rs

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::{EtlError, Result};

/// Timestamp layout for log entries, truncated to milliseconds so
/// entries look the same on every platform.
const TIMESTAMP_FORMAT: &str = "%A, %d %B %Y %I:%M:%S%.3f %p";

/// Append-only text log of phase-boundary events. One `<timestamp> -
/// <message>` line per call; entries accumulate across runs and are
/// never read back by the pipeline.
#[derive(Debug, Clone)]
pub struct ProgressLog {
    path: PathBuf,
}

impl ProgressLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry. The handle is opened per call and released on
    /// every path; a write failure is fatal to the run.
    pub fn record(&self, message: &str) -> Result<()> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| EtlError::Storage {
                detail: format!("cannot open log file {}: {err}", self.path.display()),
            })?;
        writeln!(file, "{timestamp} - {message}").map_err(|err| EtlError::Storage {
            detail: format!("cannot append to log file {}: {err}", self.path.display()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_appends_timestamped_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.txt");
        let log = ProgressLog::new(&path);

        log.record("Extract phase started").unwrap();
        log.record("Extract phase ended").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" - Extract phase started"));
        assert!(lines[1].ends_with(" - Extract phase ended"));
        // Weekday, day-of-month, then a 12-hour clock with millisecond precision.
        assert!(lines[0].contains(" AM") || lines[0].contains(" PM"));
    }

    #[test]
    fn record_fails_when_directory_is_missing() {
        let log = ProgressLog::new("/nonexistent-tabflow-dir/progress.txt");
        assert!(matches!(
            log.record("boom"),
            Err(EtlError::Storage { .. })
        ));
    }
}
