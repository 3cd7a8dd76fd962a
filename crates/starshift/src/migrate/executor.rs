//! Per-item star migration with isolated failures.

use std::sync::Arc;

use crate::audit::{AuditLevel, AuditSink};
use crate::directory::{DirectoryError, StarDirectory, StarredRepo, short_error_message};
use crate::queue::TaskQueue;

use super::progress::{MigrateProgress, ProgressCallback, emit};
use super::stats::{MigrationReport, MigrationStats, ProgressTracker};
use super::types::{MigrateOptions, MigrationOutcome};

/// Result of one per-item migration task.
struct ItemResult {
    repo: StarredRepo,
    outcome: MigrationOutcome,
    unstar_error: Option<String>,
    stats: MigrationStats,
}

/// Drives the star → optional unstar sequence for every collected
/// repository through the task queue.
///
/// Item failures never abort the batch: each repository gets exactly
/// one recorded outcome, failed identities go to the audit sink for a
/// later manual pass, and `run` returns once every outcome is in.
pub struct MigrationExecutor<S: ?Sized, T: ?Sized> {
    source: Arc<S>,
    target: Arc<T>,
    audit: Arc<dyn AuditSink>,
    options: MigrateOptions,
}

impl<S, T> MigrationExecutor<S, T>
where
    S: StarDirectory + ?Sized + 'static,
    T: StarDirectory + ?Sized + 'static,
{
    /// Create an executor over the source and target directories.
    pub fn new(
        source: Arc<S>,
        target: Arc<T>,
        audit: Arc<dyn AuditSink>,
        options: MigrateOptions,
    ) -> Self {
        Self {
            source,
            target,
            audit,
            options,
        }
    }

    /// Migrate a batch of repositories.
    ///
    /// The target credential is verified up front; an auth failure
    /// aborts before any star is attempted. After that, the only
    /// error path out of this function is queue teardown — per-item
    /// failures are folded into the returned report instead.
    pub async fn run(
        &self,
        repos: Vec<StarredRepo>,
        queue: &TaskQueue,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<MigrationReport, DirectoryError> {
        let identity = self.target.who_am_i().await?;
        tracing::info!(username = %identity.username, "authenticated against target directory");
        self.audit.append_event(
            AuditLevel::Info,
            &format!(
                "Logged in as: {} ({} public repositories)",
                identity.username, identity.public_repos
            ),
        );

        let tracker = Arc::new(ProgressTracker::new(repos.len()));
        emit(
            on_progress,
            MigrateProgress::Migrating {
                count: repos.len(),
                remove_original_stars: self.options.remove_original_stars,
            },
        );
        self.audit.append_event(
            AuditLevel::Info,
            &format!("Processing {} repositories", repos.len()),
        );

        let mut handles = Vec::with_capacity(repos.len());
        for repo in repos {
            let source = Arc::clone(&self.source);
            let target = Arc::clone(&self.target);
            let audit = Arc::clone(&self.audit);
            let tracker = Arc::clone(&tracker);
            let remove_original = self.options.remove_original_stars;
            let task_delay = self.options.task_delay;

            handles.push(queue.submit(async move {
                let result =
                    migrate_one(&*source, &*target, &*audit, &tracker, repo, remove_original)
                        .await;
                tokio::time::sleep(task_delay).await;
                result
            }));
        }

        // Handles resolve as items complete; relay outcomes to the
        // progress callback in submission order.
        for handle in handles {
            let Some(item) = handle.join().await else {
                continue;
            };
            if let Some(error) = item.unstar_error {
                emit(
                    on_progress,
                    MigrateProgress::UnstarFailed {
                        owner: item.repo.owner.clone(),
                        name: item.repo.name.clone(),
                        error,
                    },
                );
            }
            match item.outcome {
                MigrationOutcome::Migrated => emit(
                    on_progress,
                    MigrateProgress::RepoMigrated {
                        owner: item.repo.owner,
                        name: item.repo.name,
                        stats: item.stats,
                    },
                ),
                MigrationOutcome::Failed(error) => emit(
                    on_progress,
                    MigrateProgress::RepoFailed {
                        owner: item.repo.owner,
                        name: item.repo.name,
                        error,
                        stats: item.stats,
                    },
                ),
            }
        }

        queue.await_idle().await;

        let report = tracker.finalize();
        self.audit.append_event(
            AuditLevel::Success,
            &format!(
                "Finished processing repositories. {}/{} successful.",
                report.succeeded, report.total
            ),
        );
        emit(
            on_progress,
            MigrateProgress::Complete {
                report: report.clone(),
            },
        );

        Ok(report)
    }
}

/// Star one repository on the target, then best-effort unstar on the
/// source. Records exactly one outcome with the tracker and writes the
/// audit trail before returning.
async fn migrate_one<S, T>(
    source: &S,
    target: &T,
    audit: &dyn AuditSink,
    tracker: &ProgressTracker,
    repo: StarredRepo,
    remove_original: bool,
) -> ItemResult
where
    S: StarDirectory + ?Sized,
    T: StarDirectory + ?Sized,
{
    match target.star(&repo).await {
        Ok(()) => {
            audit.append_event(
                AuditLevel::Success,
                &format!("Successfully starred repository: {}", repo.full_name()),
            );

            let mut unstar_error = None;
            if remove_original {
                match source.unstar(&repo).await {
                    Ok(()) => audit.append_event(
                        AuditLevel::Success,
                        &format!(
                            "Successfully removed star from repository: {}",
                            repo.full_name()
                        ),
                    ),
                    Err(e) => {
                        // The star is on the target, which is the goal;
                        // source-side cleanup is best-effort only.
                        let message = short_error_message(&e);
                        tracing::warn!(
                            repo = %repo.full_name(),
                            error = %message,
                            "could not remove source star"
                        );
                        audit.append_event(
                            AuditLevel::Warning,
                            &format!(
                                "Could not remove star from {}: {}",
                                repo.full_name(),
                                message
                            ),
                        );
                        unstar_error = Some(message);
                    }
                }
            }

            let stats = tracker.record(true);
            ItemResult {
                repo,
                outcome: MigrationOutcome::Migrated,
                unstar_error,
                stats,
            }
        }
        Err(e) => {
            let message = short_error_message(&e);
            tracing::warn!(repo = %repo.full_name(), error = %message, "failed to star repository");
            audit.append_event(
                AuditLevel::Error,
                &format!("Failed to star {}: {}", repo.full_name(), message),
            );
            audit.append_failed_item(&repo);

            let stats = tracker.record(false);
            ItemResult {
                repo,
                outcome: MigrationOutcome::Failed(message),
                unstar_error: None,
                stats,
            }
        }
    }
}
