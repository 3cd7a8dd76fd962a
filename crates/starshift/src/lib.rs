//! Starshift - migrate starred repositories between accounts.
//!
//! This library enumerates every repository starred by a source
//! account, re-applies the stars on a target account and optionally
//! removes them from the source, driving all remote calls through a
//! bounded, rate-aware task queue. One bad repository never aborts the
//! batch: per-item failures are isolated, recorded in an audit trail
//! and folded into the final report.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use starshift::audit::NullAuditSink;
//! use starshift::github::GitHubDirectory;
//! use starshift::migrate::{MigrateOptions, MigrationExecutor, collect_starred};
//! use starshift::queue::{QueueConfig, TaskQueue};
//! use starshift::retry::{RetryConfig, RetryingDirectory};
//!
//! let source = Arc::new(RetryingDirectory::new(
//!     GitHubDirectory::new(&source_token)?,
//!     RetryConfig::default(),
//! ));
//! let target = Arc::new(GitHubDirectory::new(&target_token)?);
//!
//! let queue = TaskQueue::new(QueueConfig::default());
//! let options = MigrateOptions::default();
//! let repos = collect_starred(&source, &queue, &options, &NullAuditSink, None).await?;
//!
//! let executor = MigrationExecutor::new(source, target, Arc::new(NullAuditSink), options);
//! let report = executor.run(repos, &queue, None).await?;
//! println!("{report}");
//! ```

pub mod audit;
pub mod directory;
pub mod migrate;
pub mod queue;
pub mod retry;

#[cfg(feature = "github")]
pub mod github;

pub use audit::{AuditLevel, AuditSink, FileAuditSink, NullAuditSink};
pub use directory::{DirectoryError, Identity, StarDirectory, StarredRepo, short_error_message};
pub use migrate::{
    MigrateOptions, MigrateProgress, MigrationExecutor, MigrationReport, MigrationStats,
    ProgressCallback, ProgressTracker, collect_starred,
};
pub use queue::{QueueConfig, TaskQueue};
pub use retry::{RetryConfig, RetryingDirectory};
