//! Concurrent, paginated collection of the source account's stars.

use std::sync::{Arc, Mutex};

use crate::audit::{AuditLevel, AuditSink};
use crate::directory::{DirectoryError, Result, StarDirectory, StarredRepo, short_error_message};
use crate::queue::TaskQueue;

use super::progress::{MigrateProgress, ProgressCallback, emit};
use super::types::MigrateOptions;

/// Collect every starred repository from the source directory and
/// filter it down to the migratable set.
///
/// The starred total is counted once; a count of zero short-circuits
/// without requesting any page. Otherwise one queue task is submitted
/// per page, each appending into a shared accumulator and then pausing
/// for `options.task_delay`, so the merged output does not preserve the
/// remote ordering across page boundaries. Private repositories are
/// dropped after the merge: the starred-listing endpoint offers no
/// server-side visibility filter.
///
/// Unlike per-item migration, a failed page aborts the whole
/// collection — a silently missing page would under-report the total,
/// which is worse than failing loudly. The abort is recorded in the
/// audit sink before the error propagates. Transient fetch errors are
/// expected to have been retried already, at the directory boundary.
pub async fn collect_starred<D>(
    directory: &Arc<D>,
    queue: &TaskQueue,
    options: &MigrateOptions,
    audit: &dyn AuditSink,
    on_progress: Option<&ProgressCallback>,
) -> Result<Vec<StarredRepo>>
where
    D: StarDirectory + ?Sized + 'static,
{
    emit(on_progress, MigrateProgress::CountingStars);
    let total = match directory.count_starred().await {
        Ok(total) => total,
        Err(e) => {
            audit.append_event(
                AuditLevel::Error,
                &format!(
                    "Failed to count starred repositories: {}",
                    short_error_message(&e)
                ),
            );
            return Err(e);
        }
    };

    if total == 0 {
        emit(
            on_progress,
            MigrateProgress::FetchComplete {
                eligible: 0,
                total: 0,
            },
        );
        return Ok(Vec::new());
    }

    let page_size = options.page_size.max(1);
    let expected_pages = total.div_ceil(page_size) as u32;
    emit(
        on_progress,
        MigrateProgress::StarsCounted {
            total,
            expected_pages,
        },
    );
    tracing::debug!(total, expected_pages, "collecting starred repositories");

    let fetched: Arc<Mutex<Vec<StarredRepo>>> = Arc::new(Mutex::new(Vec::with_capacity(total)));
    let mut handles = Vec::with_capacity(expected_pages as usize);

    for page in 1..=expected_pages {
        let directory = Arc::clone(directory);
        let fetched = Arc::clone(&fetched);
        let task_delay = options.task_delay;

        handles.push(queue.submit(async move {
            let result = async {
                let repos = directory.list_starred_page(page).await?;
                let count = repos.len();

                let total_so_far = {
                    let mut fetched = fetched.lock().unwrap_or_else(|e| e.into_inner());
                    fetched.extend(repos);
                    fetched.len()
                };

                Ok::<_, DirectoryError>((page, count, total_so_far))
            }
            .await;
            tokio::time::sleep(task_delay).await;
            result
        }));
    }

    // Join in page order for progress reporting; each handle resolves
    // as its page completes. Keep going past a failure so every page
    // task still runs, then surface the first error.
    let mut first_error: Option<DirectoryError> = None;
    for handle in handles {
        match handle.join().await {
            Some(Ok((page, count, total_so_far))) => {
                emit(
                    on_progress,
                    MigrateProgress::FetchedPage {
                        page,
                        count,
                        total_so_far,
                        expected_pages,
                    },
                );
            }
            Some(Err(e)) => {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
            None => {
                if first_error.is_none() {
                    first_error = Some(DirectoryError::internal(
                        "task queue torn down during collection",
                    ));
                }
            }
        }
    }

    queue.await_idle().await;

    if let Some(e) = first_error {
        audit.append_event(
            AuditLevel::Error,
            &format!(
                "Failed to fetch starred repositories: {}",
                short_error_message(&e)
            ),
        );
        return Err(e);
    }

    let all = {
        let mut fetched = fetched.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *fetched)
    };

    let fetched_total = all.len();
    let eligible: Vec<StarredRepo> = all.into_iter().filter(|repo| !repo.is_private).collect();

    emit(
        on_progress,
        MigrateProgress::FetchComplete {
            eligible: eligible.len(),
            total: fetched_total,
        },
    );
    tracing::debug!(
        eligible = eligible.len(),
        fetched = fetched_total,
        "collection complete"
    );

    Ok(eligible)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::audit::NullAuditSink;
    use crate::directory::Identity;
    use crate::queue::QueueConfig;

    use super::*;

    /// In-memory directory serving a fixed set of starred repos.
    struct FixedDirectory {
        repos: Vec<StarredRepo>,
        page_size: usize,
        pages_requested: AtomicUsize,
        failing_page: Option<u32>,
    }

    impl FixedDirectory {
        fn new(repos: Vec<StarredRepo>, page_size: usize) -> Self {
            Self {
                repos,
                page_size,
                pages_requested: AtomicUsize::new(0),
                failing_page: None,
            }
        }
    }

    #[async_trait]
    impl StarDirectory for FixedDirectory {
        async fn who_am_i(&self) -> Result<Identity> {
            Ok(Identity {
                username: "source-user".to_string(),
                public_repos: 0,
            })
        }

        async fn count_starred(&self) -> Result<usize> {
            Ok(self.repos.len())
        }

        async fn list_starred_page(&self, page: u32) -> Result<Vec<StarredRepo>> {
            self.pages_requested.fetch_add(1, Ordering::SeqCst);
            if self.failing_page == Some(page) {
                return Err(DirectoryError::api("page exploded"));
            }
            let start = (page as usize - 1) * self.page_size;
            let end = (start + self.page_size).min(self.repos.len());
            Ok(self.repos.get(start..end).unwrap_or_default().to_vec())
        }

        async fn star(&self, _repo: &StarredRepo) -> Result<()> {
            Ok(())
        }

        async fn unstar(&self, _repo: &StarredRepo) -> Result<()> {
            Ok(())
        }
    }

    /// Audit sink recording events in memory.
    #[derive(Default)]
    struct RecordingSink {
        events: StdMutex<Vec<(AuditLevel, String)>>,
    }

    impl AuditSink for RecordingSink {
        fn append_event(&self, level: AuditLevel, message: &str) {
            self.events
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push((level, message.to_string()));
        }

        fn append_failed_item(&self, _repo: &StarredRepo) {}
    }

    fn repos(count: usize, private_every: Option<usize>) -> Vec<StarredRepo> {
        (0..count)
            .map(|i| StarredRepo {
                id: i as i64,
                owner: format!("owner{i}"),
                name: format!("repo{i}"),
                is_private: private_every.is_some_and(|n| i % n == 0),
            })
            .collect()
    }

    fn fast_options() -> MigrateOptions {
        MigrateOptions {
            task_delay: Duration::ZERO,
            ..MigrateOptions::default()
        }
    }

    #[tokio::test]
    async fn zero_starred_short_circuits_without_page_requests() {
        let directory = Arc::new(FixedDirectory::new(Vec::new(), 100));
        let queue = TaskQueue::new(QueueConfig::default());

        let collected = collect_starred(&directory, &queue, &fast_options(), &NullAuditSink, None)
            .await
            .unwrap();

        assert!(collected.is_empty());
        assert_eq!(directory.pages_requested.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn collects_all_pages_and_filters_private() {
        let directory = Arc::new(FixedDirectory::new(repos(250, Some(10)), 100));
        let queue = TaskQueue::new(QueueConfig::default());

        let collected = collect_starred(&directory, &queue, &fast_options(), &NullAuditSink, None)
            .await
            .unwrap();

        // 250 repos at page size 100 → exactly 3 page requests.
        assert_eq!(directory.pages_requested.load(Ordering::SeqCst), 3);
        // ids 0, 10, 20, ... are private: 25 of 250.
        assert_eq!(collected.len(), 225);
        assert!(collected.iter().all(|repo| !repo.is_private));
    }

    #[tokio::test]
    async fn failed_page_aborts_collection() {
        let mut directory = FixedDirectory::new(repos(250, None), 100);
        directory.failing_page = Some(2);
        let directory = Arc::new(directory);
        let queue = TaskQueue::new(QueueConfig::default());

        let err = collect_starred(&directory, &queue, &fast_options(), &NullAuditSink, None)
            .await
            .expect_err("expected collection failure");

        assert!(matches!(err, DirectoryError::Api { .. }));
    }

    #[tokio::test]
    async fn aborted_collection_is_recorded_in_the_audit_log() {
        let mut directory = FixedDirectory::new(repos(250, None), 100);
        directory.failing_page = Some(2);
        let directory = Arc::new(directory);
        let queue = TaskQueue::new(QueueConfig::default());
        let audit = RecordingSink::default();

        collect_starred(&directory, &queue, &fast_options(), &audit, None)
            .await
            .expect_err("expected collection failure");

        let events = audit.events.lock().unwrap();
        assert!(
            events.iter().any(|(level, message)| {
                *level == AuditLevel::Error
                    && message.contains("Failed to fetch starred repositories")
                    && message.contains("page exploded")
            }),
            "abort must leave an error event in the audit trail"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn page_tasks_honor_the_configured_delay() {
        let directory = Arc::new(FixedDirectory::new(repos(200, None), 100));
        let queue = TaskQueue::new(QueueConfig {
            concurrency: 1,
            start_interval: Duration::ZERO,
        });
        let options = MigrateOptions {
            task_delay: Duration::from_millis(500),
            ..MigrateOptions::default()
        };

        let started = tokio::time::Instant::now();
        let collected = collect_starred(&directory, &queue, &options, &NullAuditSink, None)
            .await
            .unwrap();

        assert_eq!(collected.len(), 200);
        // Two sequential page tasks, each trailed by the delay.
        assert!(started.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn emits_page_and_completion_events() {
        let directory = Arc::new(FixedDirectory::new(repos(150, None), 100));
        let queue = TaskQueue::new(QueueConfig::default());

        let events: Arc<StdMutex<Vec<MigrateProgress>>> = Arc::new(StdMutex::new(Vec::new()));
        let events_capture = Arc::clone(&events);
        let callback: ProgressCallback = Box::new(move |event| {
            events_capture
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(event);
        });

        let collected = collect_starred(
            &directory,
            &queue,
            &fast_options(),
            &NullAuditSink,
            Some(&callback),
        )
        .await
        .unwrap();
        assert_eq!(collected.len(), 150);

        let events = events.lock().unwrap_or_else(|e| e.into_inner());
        assert!(matches!(events[0], MigrateProgress::CountingStars));
        assert!(matches!(
            events[1],
            MigrateProgress::StarsCounted {
                total: 150,
                expected_pages: 2
            }
        ));
        let pages = events
            .iter()
            .filter(|e| matches!(e, MigrateProgress::FetchedPage { .. }))
            .count();
        assert_eq!(pages, 2);
        assert!(matches!(
            events.last(),
            Some(MigrateProgress::FetchComplete {
                eligible: 150,
                total: 150
            })
        ));
    }
}
