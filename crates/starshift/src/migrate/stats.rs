//! Progress counters and the final migration report.
//!
//! [`ProgressTracker`] is the only piece of shared mutable state
//! touched directly by concurrent task bodies, so its counters are
//! atomic. One tracker is constructed per run and passed explicitly;
//! nothing here is process-global.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};

/// Immutable snapshot of migration counters.
#[derive(Debug, Clone)]
pub struct MigrationStats {
    /// Number of repositories in the batch.
    pub total: usize,
    /// Repositories recorded as migrated.
    pub succeeded: usize,
    /// Repositories recorded as failed.
    pub failed: usize,
}

impl MigrationStats {
    /// How many repositories have a recorded outcome.
    #[inline]
    #[must_use]
    pub fn completed(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Human-readable progress line, rendered on every update.
    #[must_use]
    pub fn progress_line(&self) -> String {
        format!(
            "Progress: {}/{} ({} successful, {} failed)",
            self.completed(),
            self.total,
            self.succeeded,
            self.failed
        )
    }
}

/// Concurrency-safe success/failure counters for one migration run.
pub struct ProgressTracker {
    total: usize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
    started_at: DateTime<Utc>,
}

impl ProgressTracker {
    /// Start tracking a batch of `total` repositories.
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            total,
            succeeded: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            started_at: Utc::now(),
        }
    }

    /// Record one outcome and return the resulting snapshot.
    ///
    /// Counters only ever increase; callers must record exactly one
    /// outcome per repository.
    pub fn record(&self, success: bool) -> MigrationStats {
        if success {
            self.succeeded.fetch_add(1, Ordering::AcqRel);
        } else {
            self.failed.fetch_add(1, Ordering::AcqRel);
        }
        self.snapshot()
    }

    /// Current counter values.
    #[must_use]
    pub fn snapshot(&self) -> MigrationStats {
        MigrationStats {
            total: self.total,
            succeeded: self.succeeded.load(Ordering::Acquire),
            failed: self.failed.load(Ordering::Acquire),
        }
    }

    /// When this run started.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Stamp the end time and produce the final report.
    #[must_use]
    pub fn finalize(&self) -> MigrationReport {
        let stats = self.snapshot();
        let finished_at = Utc::now();

        MigrationReport {
            total: stats.total,
            succeeded: stats.succeeded,
            failed: stats.failed,
            started_at: self.started_at,
            finished_at,
        }
    }
}

/// Final summary of one migration run.
#[derive(Debug, Clone)]
pub struct MigrationReport {
    /// Number of repositories in the batch.
    pub total: usize,
    /// Repositories migrated.
    pub succeeded: usize,
    /// Repositories that failed.
    pub failed: usize,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

impl MigrationReport {
    /// Success percentage; defined as 0 for an empty batch.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.total as f64 * 100.0
        }
    }

    /// Run duration in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Migration Report:")?;
        writeln!(f, "-----------------")?;
        writeln!(f, "Total repositories: {}", self.total)?;
        writeln!(f, "Successfully migrated: {}", self.succeeded)?;
        writeln!(f, "Failed migrations: {}", self.failed)?;
        writeln!(f, "Success rate: {:.2}%", self.success_rate())?;
        writeln!(f, "Duration: {:.2} seconds", self.duration_secs())?;
        writeln!(
            f,
            "Start time: {}",
            self.started_at.to_rfc3339_opts(SecondsFormat::Millis, true)
        )?;
        write!(
            f,
            "End time: {}",
            self.finished_at
                .to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_record_updates_counters() {
        let tracker = ProgressTracker::new(3);

        let stats = tracker.record(true);
        assert_eq!(stats.succeeded, 1);
        assert_eq!(stats.failed, 0);

        let stats = tracker.record(false);
        assert_eq!(stats.succeeded, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.completed(), 2);
        assert!(stats.completed() <= stats.total);
    }

    #[test]
    fn test_progress_line() {
        let tracker = ProgressTracker::new(10);
        tracker.record(true);
        tracker.record(true);
        tracker.record(false);

        assert_eq!(
            tracker.snapshot().progress_line(),
            "Progress: 3/10 (2 successful, 1 failed)"
        );
    }

    #[tokio::test]
    async fn test_concurrent_records_are_not_lost() {
        let tracker = Arc::new(ProgressTracker::new(100));

        let mut handles = Vec::new();
        for i in 0..100 {
            let tracker = Arc::clone(&tracker);
            handles.push(tokio::spawn(async move {
                tracker.record(i % 4 != 0);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let report = tracker.finalize();
        assert_eq!(report.succeeded, 75);
        assert_eq!(report.failed, 25);
        assert_eq!(report.succeeded + report.failed, report.total);
    }

    #[test]
    fn test_success_rate_for_empty_batch_is_zero() {
        let report = ProgressTracker::new(0).finalize();
        assert_eq!(report.success_rate(), 0.0);

        let rendered = report.to_string();
        assert!(rendered.contains("Success rate: 0.00%"));
    }

    #[test]
    fn test_report_rendering() {
        let tracker = ProgressTracker::new(4);
        tracker.record(true);
        tracker.record(true);
        tracker.record(true);
        tracker.record(false);

        let report = tracker.finalize();
        let rendered = report.to_string();

        assert!(rendered.contains("Total repositories: 4"));
        assert!(rendered.contains("Successfully migrated: 3"));
        assert!(rendered.contains("Failed migrations: 1"));
        assert!(rendered.contains("Success rate: 75.00%"));
        assert!(rendered.contains("Start time: "));
        assert!(rendered.contains("End time: "));
    }
}
