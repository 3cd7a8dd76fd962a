//! Shared migration types and constants.

use std::time::Duration;

/// Default number of concurrent directory requests.
pub const DEFAULT_CONCURRENCY: usize = 20;

/// Default number of repositories requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Default delay applied after each per-item task body.
pub const DEFAULT_TASK_DELAY_MS: u64 = 1_000;

/// Initial backoff delay in milliseconds for transient errors.
pub const INITIAL_BACKOFF_MS: u64 = 1_000;

/// Maximum backoff delay in milliseconds when rate limited.
pub const MAX_BACKOFF_MS: u64 = 60_000;

/// Maximum retries for a transient directory failure.
pub const MAX_TRANSIENT_RETRIES: u32 = 10;

/// Options for one migration run.
#[derive(Debug, Clone)]
pub struct MigrateOptions {
    /// Repositories requested per page when collecting.
    pub page_size: usize,
    /// Remove the star from the source account after a successful
    /// star on the target. Best-effort: an unstar failure does not
    /// turn the item into a failure.
    pub remove_original_stars: bool,
    /// Courtesy delay after each task body (page fetches and per-item
    /// migrations alike), applied on top of the queue's own start
    /// spacing.
    pub task_delay: Duration,
}

impl Default for MigrateOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            remove_original_stars: true,
            task_delay: Duration::from_millis(DEFAULT_TASK_DELAY_MS),
        }
    }
}

/// Terminal classification recorded for one repository.
#[derive(Debug, Clone)]
pub enum MigrationOutcome {
    /// The star is present on the target account.
    Migrated,
    /// Starring on the target failed; the reason is kept for the audit
    /// trail.
    Failed(String),
}

impl MigrationOutcome {
    /// Whether this outcome counts as a success.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Migrated)
    }
}
