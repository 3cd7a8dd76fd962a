//! Progress reporting for migration runs.
//!
//! The pipeline emits [`MigrateProgress`] events through an optional
//! callback; rendering (spinners, bars, plain logs) is entirely the
//! caller's concern.

use super::stats::{MigrationReport, MigrationStats};

/// Progress events emitted during a migration run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum MigrateProgress {
    /// Querying the source directory for the starred total.
    CountingStars,

    /// The source reported its starred total.
    StarsCounted {
        /// Total starred repositories on the source account.
        total: usize,
        /// Number of pages that will be fetched.
        expected_pages: u32,
    },

    /// Fetched one page of starred repositories.
    FetchedPage {
        /// Page number (1-indexed).
        page: u32,
        /// Number of repos on this page.
        count: usize,
        /// Running total of repos fetched so far.
        total_so_far: usize,
        /// Total number of pages being fetched.
        expected_pages: u32,
    },

    /// Finished collecting; private repositories have been filtered out.
    FetchComplete {
        /// Repositories eligible for migration.
        eligible: usize,
        /// Repositories fetched before filtering.
        total: usize,
    },

    /// Starting to migrate stars.
    Migrating {
        /// Number of repositories in the batch.
        count: usize,
        /// Whether source stars will be removed after migration.
        remove_original_stars: bool,
    },

    /// One repository migrated.
    RepoMigrated {
        /// Repository owner.
        owner: String,
        /// Repository name.
        name: String,
        /// Counter snapshot after this outcome.
        stats: MigrationStats,
    },

    /// One repository failed to migrate.
    RepoFailed {
        /// Repository owner.
        owner: String,
        /// Repository name.
        name: String,
        /// Error message.
        error: String,
        /// Counter snapshot after this outcome.
        stats: MigrationStats,
    },

    /// The source-side unstar failed after a successful target star.
    /// The repository still counts as migrated.
    UnstarFailed {
        /// Repository owner.
        owner: String,
        /// Repository name.
        name: String,
        /// Error message.
        error: String,
    },

    /// The run finished; every repository has a recorded outcome.
    Complete {
        /// The final report.
        report: MigrationReport,
    },
}

/// Callback for progress updates during migration.
pub type ProgressCallback = Box<dyn Fn(MigrateProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: MigrateProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_emit_with_callback() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);

        let callback: ProgressCallback = Box::new(move |_event| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        emit(Some(&callback), MigrateProgress::CountingStars);
        emit(
            Some(&callback),
            MigrateProgress::StarsCounted {
                total: 250,
                expected_pages: 3,
            },
        );

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_emit_without_callback() {
        // Should not panic when callback is None
        emit(
            None,
            MigrateProgress::FetchComplete {
                eligible: 10,
                total: 12,
            },
        );
    }

    #[test]
    fn test_events_carry_stats_snapshot() {
        let event = MigrateProgress::RepoMigrated {
            owner: "rust-lang".to_string(),
            name: "rust".to_string(),
            stats: MigrationStats {
                total: 10,
                succeeded: 4,
                failed: 1,
            },
        };

        if let MigrateProgress::RepoMigrated { stats, .. } = event {
            assert_eq!(stats.progress_line(), "Progress: 5/10 (4 successful, 1 failed)");
        } else {
            panic!("wrong variant");
        }
    }
}
