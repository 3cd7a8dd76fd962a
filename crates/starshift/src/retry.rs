//! Retry policy for directory operations.
//!
//! Transient directory failures (rate limits, network hiccups) are
//! absorbed here, at the capability boundary, so the pipeline above
//! only ever sees errors that exhausted their retry budget. The policy
//! is an explicit decorator ([`RetryingDirectory`]) rather than hidden
//! client middleware, which keeps it independently testable.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};

use crate::directory::{
    DirectoryError, Identity, Result, StarDirectory, StarredRepo, short_error_message,
};
use crate::migrate::{INITIAL_BACKOFF_MS, MAX_BACKOFF_MS, MAX_TRANSIENT_RETRIES};

/// Configuration for retry operations.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Minimum delay between retries.
    pub min_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Maximum number of retry attempts.
    pub max_retries: usize,
    /// Whether to add jitter to delays.
    pub with_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_delay: Duration::from_millis(MAX_BACKOFF_MS),
            max_retries: MAX_TRANSIENT_RETRIES as usize,
            with_jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with custom values.
    #[must_use]
    pub fn new(min_delay: Duration, max_delay: Duration, max_retries: usize) -> Self {
        Self {
            min_delay,
            max_delay,
            max_retries,
            with_jitter: true,
        }
    }

    /// Set whether to use jitter.
    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.with_jitter = jitter;
        self
    }

    /// Build an exponential backoff strategy from this configuration.
    #[must_use]
    pub fn into_backoff(self) -> ExponentialBuilder {
        let mut builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries);

        if self.with_jitter {
            builder = builder.with_jitter();
        }

        builder
    }
}

/// Build the default exponential backoff strategy for directory operations.
///
/// - Initial delay: 1 second
/// - Maximum delay: 60 seconds
/// - Maximum retries: 10
/// - Jitter: enabled
#[must_use]
pub fn default_backoff() -> ExponentialBuilder {
    RetryConfig::default().into_backoff()
}

/// A retrying wrapper around any [`StarDirectory`].
///
/// Every trait method is retried on transient errors (as classified by
/// [`DirectoryError::is_transient`]) with exponential backoff and
/// jitter; non-transient errors surface immediately. Retry attempts
/// are logged at debug level.
///
/// # Example
///
/// ```ignore
/// use starshift::retry::{RetryConfig, RetryingDirectory};
///
/// let directory = RetryingDirectory::new(github, RetryConfig::default());
/// let total = directory.count_starred().await?;
/// ```
pub struct RetryingDirectory<D> {
    inner: D,
    config: RetryConfig,
}

impl<D> RetryingDirectory<D> {
    /// Wrap a directory with the given retry policy.
    pub fn new(inner: D, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// Get a reference to the inner directory.
    pub fn inner(&self) -> &D {
        &self.inner
    }

    /// Run an operation, retrying transient failures per the configured policy.
    async fn retried<T, F, Fut>(&self, what: &str, op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        op.retry(self.config.clone().into_backoff())
            .when(|e: &DirectoryError| e.is_transient())
            .notify(|err, dur| {
                tracing::debug!(
                    "{} hit a transient error, retrying in {:?}: {}",
                    what,
                    dur,
                    short_error_message(err)
                );
            })
            .await
    }
}

#[async_trait]
impl<D: StarDirectory> StarDirectory for RetryingDirectory<D> {
    async fn who_am_i(&self) -> Result<Identity> {
        self.retried("who_am_i", || self.inner.who_am_i()).await
    }

    async fn count_starred(&self) -> Result<usize> {
        self.retried("count_starred", || self.inner.count_starred())
            .await
    }

    async fn list_starred_page(&self, page: u32) -> Result<Vec<StarredRepo>> {
        self.retried("list_starred_page", || self.inner.list_starred_page(page))
            .await
    }

    async fn star(&self, repo: &StarredRepo) -> Result<()> {
        self.retried("star", || self.inner.star(repo)).await
    }

    async fn unstar(&self, repo: &StarredRepo) -> Result<()> {
        self.retried("unstar", || self.inner.unstar(repo)).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();

        assert_eq!(config.min_delay, Duration::from_millis(INITIAL_BACKOFF_MS));
        assert_eq!(config.max_delay, Duration::from_millis(MAX_BACKOFF_MS));
        assert_eq!(config.max_retries, MAX_TRANSIENT_RETRIES as usize);
        assert!(config.with_jitter);
    }

    #[test]
    fn test_retry_config_custom() {
        let config = RetryConfig::new(Duration::from_secs(2), Duration::from_secs(30), 3);

        assert_eq!(config.min_delay, Duration::from_secs(2));
        assert_eq!(config.max_delay, Duration::from_secs(30));
        assert_eq!(config.max_retries, 3);
        assert!(config.with_jitter);
    }

    #[test]
    fn test_retry_config_without_jitter() {
        let config = RetryConfig::default().with_jitter(false);
        assert!(!config.with_jitter);
    }

    /// Directory that fails `count_starred` a fixed number of times
    /// before succeeding, with a configurable error kind.
    struct FlakyDirectory {
        calls: AtomicU32,
        failures: u32,
        transient: bool,
    }

    impl FlakyDirectory {
        fn new(failures: u32, transient: bool) -> Self {
            Self {
                calls: AtomicU32::new(0),
                failures,
                transient,
            }
        }

        fn error(&self) -> DirectoryError {
            if self.transient {
                DirectoryError::transient("connection reset")
            } else {
                DirectoryError::api("bad request")
            }
        }
    }

    #[async_trait]
    impl StarDirectory for FlakyDirectory {
        async fn who_am_i(&self) -> Result<Identity> {
            Ok(Identity {
                username: "tester".to_string(),
                public_repos: 0,
            })
        }

        async fn count_starred(&self) -> Result<usize> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(self.error())
            } else {
                Ok(7)
            }
        }

        async fn list_starred_page(&self, _page: u32) -> Result<Vec<StarredRepo>> {
            Ok(Vec::new())
        }

        async fn star(&self, _repo: &StarredRepo) -> Result<()> {
            Ok(())
        }

        async fn unstar(&self, _repo: &StarredRepo) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_errors_until_success() {
        let inner = Arc::new(FlakyDirectory::new(2, true));
        let directory = RetryingDirectory::new(Arc::clone(&inner), RetryConfig::default());

        let advancer = tokio::spawn(async {
            // Advance time repeatedly so any backoff sleeps complete.
            for _ in 0..30 {
                tokio::time::advance(Duration::from_secs(60)).await;
                tokio::task::yield_now().await;
            }
        });

        let total = directory.count_starred().await.unwrap();
        advancer.await.expect("advancer task");

        assert_eq!(total, 7);
        assert!(inner.calls.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn does_not_retry_fatal_errors() {
        let inner = Arc::new(FlakyDirectory::new(5, false));
        let directory = RetryingDirectory::new(Arc::clone(&inner), RetryConfig::default());

        let err = directory.count_starred().await.expect_err("expected error");

        assert!(matches!(err, DirectoryError::Api { .. }));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn surfaces_error_after_exhausting_retries() {
        let inner = Arc::new(FlakyDirectory::new(u32::MAX, true));
        let config = RetryConfig::new(Duration::from_millis(10), Duration::from_millis(100), 2)
            .with_jitter(false);
        let directory = RetryingDirectory::new(Arc::clone(&inner), config);

        let advancer = tokio::spawn(async {
            for _ in 0..30 {
                tokio::time::advance(Duration::from_secs(1)).await;
                tokio::task::yield_now().await;
            }
        });

        let err = directory.count_starred().await.expect_err("expected error");
        advancer.await.expect("advancer task");

        assert!(matches!(err, DirectoryError::Transient { .. }));
        // Initial attempt plus two retries.
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }
}
