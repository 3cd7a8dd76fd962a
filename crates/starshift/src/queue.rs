//! Bounded-concurrency task queue with paced starts.
//!
//! [`TaskQueue`] runs submitted futures on a fixed pool of worker
//! tasks: at most `concurrency` bodies execute at once, task starts
//! follow submission order, and an optional minimum interval between
//! successive starts caps the request rate against remote services
//! regardless of the concurrency level.
//!
//! The queue itself never fails and surfaces no errors; each
//! [`submit`](TaskQueue::submit) returns a [`TaskHandle`] resolving to
//! the task's own output, so failure handling stays an explicit
//! contract between the submitter and its task body.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use tokio::sync::{Mutex, Notify, mpsc, oneshot};

/// Default number of concurrently executing tasks.
pub const DEFAULT_QUEUE_CONCURRENCY: usize = 20;

type BoxedTask = Pin<Box<dyn Future<Output = ()> + Send>>;
type StartPacer = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Configuration for a [`TaskQueue`].
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Maximum number of tasks executing at once.
    pub concurrency: usize,
    /// Minimum interval between successive task starts.
    /// `Duration::ZERO` disables start pacing.
    pub start_interval: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_QUEUE_CONCURRENCY,
            start_interval: Duration::ZERO,
        }
    }
}

/// Handle to a submitted task's result.
///
/// Resolves once the task body has run to completion. Yields `None`
/// only if the queue was torn down before the task ran.
pub struct TaskHandle<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> TaskHandle<T> {
    /// Wait for the task to complete and take its output.
    pub async fn join(self) -> Option<T> {
        self.rx.await.ok()
    }
}

struct QueueInner {
    tx: mpsc::UnboundedSender<BoxedTask>,
    pending: AtomicUsize,
    idle: Notify,
}

/// A bounded worker pool over an unbounded submission channel.
///
/// Cloning is cheap and all clones share the same workers, so task
/// bodies may hold a clone and submit further work; `await_idle`
/// resolves only once those nested submissions have completed too.
#[derive(Clone)]
pub struct TaskQueue {
    inner: Arc<QueueInner>,
}

impl TaskQueue {
    /// Create a queue and spawn its workers on the current runtime.
    pub fn new(config: QueueConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<BoxedTask>();
        let rx = Arc::new(Mutex::new(rx));

        // Zero-period quotas are rejected by governor, which doubles as
        // the "pacing disabled" case.
        let pacer: Option<Arc<StartPacer>> = Quota::with_period(config.start_interval)
            .map(|quota| Arc::new(RateLimiter::direct(quota)));

        let inner = Arc::new(QueueInner {
            tx,
            pending: AtomicUsize::new(0),
            idle: Notify::new(),
        });

        for _ in 0..config.concurrency.max(1) {
            let rx = Arc::clone(&rx);
            let pacer = pacer.clone();
            let inner = Arc::clone(&inner);

            tokio::spawn(async move {
                loop {
                    // Hold the receiver lock only while dequeueing, so
                    // pickups happen in channel order and other workers
                    // stay free to run their current task.
                    let task = { rx.lock().await.recv().await };
                    let Some(task) = task else { break };

                    if let Some(ref pacer) = pacer {
                        pacer.until_ready().await;
                    }

                    task.await;

                    if inner.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
                        inner.idle.notify_waiters();
                    }
                }
            });
        }

        Self { inner }
    }

    /// Submit a unit of work.
    ///
    /// The task is guaranteed to run exactly once (in submission order
    /// relative to other tasks) unless the queue is torn down first.
    /// The returned handle carries the task's output; dropping the
    /// handle does not cancel the task.
    pub fn submit<F, T>(&self, task: F) -> TaskHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel();

        self.inner.pending.fetch_add(1, Ordering::AcqRel);

        let boxed: BoxedTask = Box::pin(async move {
            let output = task.await;
            // The submitter may have dropped the handle; the task still counts.
            let _ = result_tx.send(output);
        });

        if self.inner.tx.send(boxed).is_err()
            && self.inner.pending.fetch_sub(1, Ordering::AcqRel) == 1
        {
            self.inner.idle.notify_waiters();
        }

        TaskHandle { rx: result_rx }
    }

    /// Number of tasks submitted but not yet completed.
    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::Acquire)
    }

    /// Wait until every submitted task has completed.
    ///
    /// Tasks submitted while waiting (including from within running
    /// task bodies) are honored before this resolves.
    pub async fn await_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            // Register before the pending check so a completion between
            // the check and the await is not lost.
            notified.as_mut().enable();

            if self.inner.pending.load(Ordering::Acquire) == 0 {
                return;
            }

            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn queue(concurrency: usize) -> TaskQueue {
        TaskQueue::new(QueueConfig {
            concurrency,
            start_interval: Duration::ZERO,
        })
    }

    #[tokio::test]
    async fn handles_deliver_task_output() {
        let queue = queue(4);

        let a = queue.submit(async { 1u32 });
        let b = queue.submit(async { 2u32 });

        assert_eq!(a.join().await, Some(1));
        assert_eq!(b.join().await, Some(2));
    }

    #[tokio::test]
    async fn await_idle_with_no_tasks_returns_immediately() {
        let queue = queue(2);
        queue.await_idle().await;
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test]
    async fn await_idle_waits_for_all_tasks() {
        let queue = queue(4);
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..16 {
            let done = Arc::clone(&done);
            queue.submit(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                done.fetch_add(1, Ordering::SeqCst);
            });
        }

        queue.await_idle().await;
        assert_eq!(done.load(Ordering::SeqCst), 16);
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test]
    async fn concurrency_cap_is_respected() {
        let queue = queue(3);
        let running = Arc::new(AtomicUsize::new(0));
        let high_water = Arc::new(AtomicUsize::new(0));

        for _ in 0..20 {
            let running = Arc::clone(&running);
            let high_water = Arc::clone(&high_water);
            queue.submit(async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                high_water.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            });
        }

        queue.await_idle().await;
        assert!(high_water.load(Ordering::SeqCst) <= 3);
        assert!(high_water.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn tasks_submitted_during_execution_complete_before_idle() {
        let queue = queue(2);
        let done = Arc::new(AtomicUsize::new(0));

        let nested_queue = queue.clone();
        let nested_done = Arc::clone(&done);
        queue.submit(async move {
            let done = Arc::clone(&nested_done);
            nested_queue.submit(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                done.fetch_add(1, Ordering::SeqCst);
            });
            nested_done.fetch_add(1, Ordering::SeqCst);
        });

        queue.await_idle().await;
        assert_eq!(done.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn start_interval_spaces_task_starts() {
        let queue = TaskQueue::new(QueueConfig {
            concurrency: 4,
            start_interval: Duration::from_millis(40),
        });

        let started = std::time::Instant::now();
        let mut handles = Vec::new();
        for _ in 0..3 {
            handles.push(queue.submit(async {}));
        }
        for handle in handles {
            handle.join().await;
        }

        // First start is immediate; the remaining two are spaced.
        assert!(started.elapsed() >= Duration::from_millis(70));
    }
}
