//! The star migration pipeline.
//!
//! Two stages run over one shared [`TaskQueue`](crate::queue::TaskQueue):
//!
//! 1. [`collect_starred`] pages through the source account's stars
//!    concurrently and filters out ineligible (private) repositories.
//!    A failed page aborts the stage.
//! 2. [`MigrationExecutor::run`] stars each collected repository on
//!    the target account (optionally unstarring on the source), with
//!    per-item failures isolated and recorded rather than propagated.
//!
//! Progress flows through [`MigrateProgress`] callbacks; counters live
//! in a per-run [`ProgressTracker`] that produces the final
//! [`MigrationReport`].

mod collector;
mod executor;
mod progress;
mod stats;
mod types;

pub use collector::collect_starred;
pub use executor::MigrationExecutor;
pub use progress::{MigrateProgress, ProgressCallback, emit};
pub use stats::{MigrationReport, MigrationStats, ProgressTracker};
pub use types::{MigrateOptions, MigrationOutcome};

pub use types::{
    DEFAULT_CONCURRENCY, DEFAULT_PAGE_SIZE, DEFAULT_TASK_DELAY_MS, INITIAL_BACKOFF_MS,
    MAX_BACKOFF_MS, MAX_TRANSIENT_RETRIES,
};
