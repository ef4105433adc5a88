//! Fixed-interval rate limiter with a FIFO work queue
//!
//! A [`RateLimiter`] guarantees that tasks scheduled through it are dispatched
//! no closer together than `ceil(60000 / requests_per_minute)` milliseconds,
//! one at a time, in submission order.
//!
//! Scheduling pushes a boxed job onto the queue. If the limiter is
//! [`DrainState::Idle`] the scheduling call flips it to
//! [`DrainState::Draining`] and spawns the single drain task; the drain task
//! flips it back to `Idle` under the same lock once the queue is empty. That
//! lock is what guarantees at most one drain task per limiter.

use crate::domain::{DesignExportError, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;

type Job = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Drain loop state of a limiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainState {
    /// No drain task is running; the next `schedule` starts one
    Idle,
    /// A drain task owns the queue
    Draining,
}

struct Queue {
    jobs: VecDeque<Job>,
    state: DrainState,
}

struct Shared {
    tier: String,
    min_interval: Duration,
    task_timeout: Option<Duration>,
    queue: Mutex<Queue>,
    last_dispatch: Mutex<Option<Instant>>,
}

impl Shared {
    fn queue(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn last_dispatch(&self) -> MutexGuard<'_, Option<Instant>> {
        self.last_dispatch.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Rate limiter for one API tier
///
/// # Example
///
/// ```no_run
/// use design_export::core::ratelimit::RateLimiter;
///
/// # async fn example() -> design_export::domain::Result<()> {
/// let limiter = RateLimiter::new("tier1", 10);
///
/// let value = limiter.schedule(|| async { Ok(42) }).await?;
/// assert_eq!(value, 42);
/// # Ok(())
/// # }
/// ```
pub struct RateLimiter {
    shared: Arc<Shared>,
}

impl RateLimiter {
    /// Create a limiter allowing `requests_per_minute` dispatches per minute
    ///
    /// A value of zero is treated as one request per minute.
    pub fn new(tier: impl Into<String>, requests_per_minute: u32) -> Self {
        Self::build(tier.into(), min_interval_for(requests_per_minute), None)
    }

    /// Fail any task that runs longer than `timeout` and move on to the next
    ///
    /// Without a timeout a task that never completes stalls the tier forever.
    pub fn with_task_timeout(self, timeout: Duration) -> Self {
        Self::build(
            self.shared.tier.clone(),
            self.shared.min_interval,
            Some(timeout),
        )
    }

    fn build(tier: String, min_interval: Duration, task_timeout: Option<Duration>) -> Self {
        Self {
            shared: Arc::new(Shared {
                tier,
                min_interval,
                task_timeout,
                queue: Mutex::new(Queue {
                    jobs: VecDeque::new(),
                    state: DrainState::Idle,
                }),
                last_dispatch: Mutex::new(None),
            }),
        }
    }

    /// Tier name used in log fields
    pub fn tier(&self) -> &str {
        &self.shared.tier
    }

    /// Minimum gap between two dispatches
    pub fn min_interval(&self) -> Duration {
        self.shared.min_interval
    }

    /// Current drain state
    pub fn state(&self) -> DrainState {
        self.shared.queue().state
    }

    /// Number of tasks waiting to be dispatched
    pub fn pending(&self) -> usize {
        self.shared.queue().jobs.len()
    }

    /// Schedule `task` for execution and wait for its outcome
    ///
    /// The task is enqueued immediately, before the returned future is first
    /// polled, so the call order of `schedule` is the dispatch order. The
    /// task itself never runs inside this call; the drain task runs it.
    ///
    /// The returned future resolves with exactly the task's own result. A
    /// failing task only affects its own caller.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F, Fut, T>(&self, task: F) -> impl Future<Output = Result<T>> + Send
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let timeout = self.shared.task_timeout;
        let tier = self.shared.tier.clone();

        let job: Job = Box::new(move || {
            async move {
                let outcome = match timeout {
                    Some(limit) => match tokio::time::timeout(limit, task()).await {
                        Ok(outcome) => outcome,
                        Err(_) => Err(DesignExportError::Timeout(format!(
                            "task on {tier} did not complete within {}ms",
                            limit.as_millis()
                        ))),
                    },
                    None => task().await,
                };
                // Receiver gone means the caller stopped waiting
                let _ = tx.send(outcome);
            }
            .boxed()
        });

        self.enqueue(job);
        let tier = self.shared.tier.clone();

        async move {
            rx.await.map_err(|_| {
                DesignExportError::RateLimiter(format!(
                    "task on {tier} was dropped before completing"
                ))
            })?
        }
    }

    fn enqueue(&self, job: Job) {
        let start_drain = {
            let mut queue = self.shared.queue();
            queue.jobs.push_back(job);
            if queue.state == DrainState::Idle {
                queue.state = DrainState::Draining;
                true
            } else {
                false
            }
        };

        if start_drain {
            tracing::trace!(tier = %self.shared.tier, "Starting drain task");
            tokio::spawn(drain(Arc::clone(&self.shared)));
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("tier", &self.shared.tier)
            .field("min_interval", &self.shared.min_interval)
            .field("task_timeout", &self.shared.task_timeout)
            .field("state", &self.state())
            .finish()
    }
}

async fn drain(shared: Arc<Shared>) {
    loop {
        let job = {
            let mut queue = shared.queue();
            match queue.jobs.pop_front() {
                Some(job) => job,
                None => {
                    queue.state = DrainState::Idle;
                    tracing::trace!(tier = %shared.tier, "Queue empty, drain task exiting");
                    return;
                }
            }
        };

        let previous = *shared.last_dispatch();
        if let Some(previous) = previous {
            let next_allowed = previous + shared.min_interval;
            let now = Instant::now();
            if next_allowed > now {
                let wait = next_allowed - now;
                tracing::debug!(
                    tier = %shared.tier,
                    wait_ms = wait.as_millis() as u64,
                    "Delaying dispatch to respect rate limit"
                );
                tokio::time::sleep_until(next_allowed).await;
            }
        }

        // Actual dispatch time, so a slow task doesn't push later ones back further
        *shared.last_dispatch() = Some(Instant::now());

        if AssertUnwindSafe(job()).catch_unwind().await.is_err() {
            tracing::error!(tier = %shared.tier, "Scheduled task panicked");
        }
    }
}

fn min_interval_for(requests_per_minute: u32) -> Duration {
    let rpm = u64::from(requests_per_minute.max(1));
    Duration::from_millis(60_000u64.div_ceil(rpm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(60, 1000 ; "even division")]
    #[test_case(7, 8572 ; "rounds up")]
    #[test_case(0, 60000 ; "zero treated as one")]
    #[test_case(600, 100 ; "fast tier")]
    fn test_min_interval(rpm: u32, expected_ms: u64) {
        assert_eq!(min_interval_for(rpm), Duration::from_millis(expected_ms));
    }

    #[tokio::test]
    async fn test_schedule_returns_task_result() {
        let limiter = RateLimiter::new("tier1", 6000);
        let value = limiter.schedule(|| async { Ok("done") }).await.unwrap();
        assert_eq!(value, "done");
    }

    #[tokio::test]
    async fn test_schedule_returns_task_error() {
        let limiter = RateLimiter::new("tier1", 6000);
        let result: Result<()> = limiter
            .schedule(|| async { Err(DesignExportError::Other("boom".to_string())) })
            .await;
        assert!(matches!(result, Err(DesignExportError::Other(msg)) if msg == "boom"));
    }

    #[tokio::test]
    async fn test_task_not_run_inside_schedule() {
        let limiter = RateLimiter::new("tier1", 6000);
        let ran = Arc::new(std::sync::atomic::AtomicBool::new(false));

        let flag = Arc::clone(&ran);
        let pending = limiter.schedule(move || async move {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        });

        assert!(!ran.load(std::sync::atomic::Ordering::SeqCst));
        assert_eq!(limiter.state(), DrainState::Draining);

        pending.await.unwrap();
        assert!(ran.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_to_idle_after_queue_empties() {
        let limiter = RateLimiter::new("tier2", 600);
        assert_eq!(limiter.state(), DrainState::Idle);

        limiter.schedule(|| async { Ok(()) }).await.unwrap();

        for _ in 0..10 {
            if limiter.state() == DrainState::Idle {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(limiter.state(), DrainState::Idle);
        assert_eq!(limiter.pending(), 0);
    }
}
