// src/services/tasks.rs

//! Shared coordination state for concurrently running crawl tasks.

use std::pin::pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use governor::Quota;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use tokio::sync::Notify;

/// Join barrier over a dynamically growing set of tasks.
///
/// [`WaitGroup::add`] registers a task and hands back a [`TaskGuard`]. The
/// guard must be created before the task is spawned and moved into it; the
/// count drops when the guard does, so every registered task is released
/// exactly once whatever way it ends.
#[derive(Clone, Default)]
pub struct WaitGroup {
    inner: Arc<WaitGroupInner>,
}

#[derive(Default)]
struct WaitGroupInner {
    count: AtomicUsize,
    notify: Notify,
}

/// Registration of one task in a [`WaitGroup`].
#[must_use = "dropping the guard releases the task immediately"]
pub struct TaskGuard {
    inner: Arc<WaitGroupInner>,
}

impl WaitGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one more task.
    pub fn add(&self) -> TaskGuard {
        self.inner.count.fetch_add(1, Ordering::SeqCst);
        TaskGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of registered tasks that have not finished.
    pub fn pending(&self) -> usize {
        self.inner.count.load(Ordering::SeqCst)
    }

    /// Wait until every registered task, including ones registered while
    /// waiting, has finished.
    pub async fn wait(&self) {
        loop {
            let mut notified = pin!(self.inner.notify.notified());
            // Register interest before reading the count so a release in
            // between is not missed.
            notified.as_mut().enable();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        if self.inner.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.notify.notify_waiters();
        }
    }
}

type DirectLimiter = governor::RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Fixed-interval limiter: hands out at most one request per interval,
/// shared by every task of a crawler.
pub struct RateLimiter {
    limiter: Option<DirectLimiter>,
}

impl RateLimiter {
    /// A zero interval disables limiting.
    pub fn new(interval: Duration) -> Self {
        let limiter = Quota::with_period(interval).map(DirectLimiter::direct);
        Self { limiter }
    }

    /// Wait until the next request may go out.
    pub async fn acquire(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("enabled", &self.limiter.is_some())
            .finish()
    }
}
