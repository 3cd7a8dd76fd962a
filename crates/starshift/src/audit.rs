//! Durable audit record of migration events and failed items.
//!
//! The pipeline writes every notable event and every failed repository
//! through [`AuditSink`] before proceeding, so a crashed or partial run
//! still leaves a usable record for manual retry. Sinks are write-only
//! and must never fail the pipeline: IO errors are logged and dropped.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};

use crate::directory::StarredRepo;

/// Severity of an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl AuditLevel {
    /// Level name as written to the log.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Success => "SUCCESS",
        }
    }
}

/// Write-only sink for migration events and failed-item records.
pub trait AuditSink: Send + Sync {
    /// Append one timestamped event line.
    fn append_event(&self, level: AuditLevel, message: &str);

    /// Append the identity of a repository that failed to migrate.
    fn append_failed_item(&self, repo: &StarredRepo);
}

/// File-backed audit sink.
///
/// Events land in an append-only log as `[timestamp] [LEVEL] message`
/// lines; failed repositories land in a separate CSV of
/// `full_name,id` rows suitable for a later manual pass.
pub struct FileAuditSink {
    log: Mutex<File>,
    failed: Mutex<File>,
}

impl FileAuditSink {
    /// Open (creating if needed) the event log and failed-items files.
    pub fn open(log_path: &Path, failed_path: &Path) -> std::io::Result<Self> {
        let log = OpenOptions::new().create(true).append(true).open(log_path)?;
        let failed = OpenOptions::new()
            .create(true)
            .append(true)
            .open(failed_path)?;

        Ok(Self {
            log: Mutex::new(log),
            failed: Mutex::new(failed),
        })
    }

    fn append_line(file: &Mutex<File>, line: &str) {
        let mut file = match file.lock() {
            Ok(file) => file,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(file, "{line}") {
            tracing::warn!("failed to append audit record: {e}");
        }
    }
}

impl AuditSink for FileAuditSink {
    fn append_event(&self, level: AuditLevel, message: &str) {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        Self::append_line(
            &self.log,
            &format!("[{timestamp}] [{}] {message}", level.as_str()),
        );
    }

    fn append_failed_item(&self, repo: &StarredRepo) {
        Self::append_line(&self.failed, &format!("{},{}", repo.full_name(), repo.id));
    }
}

/// Audit sink that discards everything. Useful for dry inspection
/// commands and tests that don't assert on the audit trail.
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn append_event(&self, _level: AuditLevel, _message: &str) {}

    fn append_failed_item(&self, _repo: &StarredRepo) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(owner: &str, name: &str, id: i64) -> StarredRepo {
        StarredRepo {
            id,
            owner: owner.to_string(),
            name: name.to_string(),
            is_private: false,
        }
    }

    #[test]
    fn test_audit_level_names() {
        assert_eq!(AuditLevel::Info.as_str(), "INFO");
        assert_eq!(AuditLevel::Warning.as_str(), "WARNING");
        assert_eq!(AuditLevel::Error.as_str(), "ERROR");
        assert_eq!(AuditLevel::Success.as_str(), "SUCCESS");
    }

    #[test]
    fn test_file_sink_appends_events_and_failures() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("migration.log");
        let failed_path = dir.path().join("failed.csv");

        let sink = FileAuditSink::open(&log_path, &failed_path).unwrap();
        sink.append_event(AuditLevel::Info, "starting migration");
        sink.append_event(AuditLevel::Error, "star failed");
        sink.append_failed_item(&repo("rust-lang", "rust", 7));

        let log = std::fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("[INFO] starting migration"));
        assert!(lines[1].contains("[ERROR] star failed"));

        let failed = std::fs::read_to_string(&failed_path).unwrap();
        assert_eq!(failed.trim(), "rust-lang/rust,7");
    }

    #[test]
    fn test_file_sink_appends_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("migration.log");
        let failed_path = dir.path().join("failed.csv");

        {
            let sink = FileAuditSink::open(&log_path, &failed_path).unwrap();
            sink.append_event(AuditLevel::Info, "first run");
        }
        {
            let sink = FileAuditSink::open(&log_path, &failed_path).unwrap();
            sink.append_event(AuditLevel::Info, "second run");
        }

        let log = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(log.lines().count(), 2);
    }

    #[test]
    fn test_null_sink_is_silent() {
        let sink = NullAuditSink;
        sink.append_event(AuditLevel::Info, "ignored");
        sink.append_failed_item(&repo("o", "n", 1));
    }
}
