//! Timer abstraction for debounced flushing
//!
//! [`AutoFlushHandler`](crate::AutoFlushHandler) needs exactly one
//! capability from its environment: run a closure once, `delay` after the
//! most recent reschedule, with cancellation. Putting that behind a trait
//! lets tests drive flushes deterministically instead of sleeping.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// One-shot deferred task
pub type FlushTask = Box<dyn FnOnce() + Send + 'static>;

/// Capability to run a task once after a delay
pub trait Scheduler: Send + Sync {
    /// Schedule `task` to run once after `delay`
    ///
    /// Returns `None` when no timer substrate is available (e.g. outside a
    /// tokio runtime); callers must keep working without the timer.
    fn schedule(&self, delay: Duration, task: FlushTask) -> Option<TimerHandle>;
}

/// Cancellation handle for a scheduled task
///
/// A task that observes cancellation before running is skipped. A task
/// already past the check may still run once; callers that need exactly-once
/// processing must make the task itself idempotent.
#[derive(Clone)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle {
    fn new() -> Self {
        Self { cancelled: Arc::new(AtomicBool::new(false)) }
    }

    /// Prevent the task from firing
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// True once `cancel` has been called
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Scheduler backed by the ambient tokio runtime
///
/// Degrades gracefully outside a runtime: `schedule` logs a warning and
/// returns `None`, leaving manual flushing as the only delivery path.
#[derive(Debug, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: FlushTask) -> Option<TimerHandle> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no tokio runtime available; flush timer deferred, events stay buffered");
            return None;
        };

        let timer = TimerHandle::new();
        let cancelled = Arc::clone(&timer.cancelled);
        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if !cancelled.load(Ordering::SeqCst) {
                task();
            }
        });
        Some(timer)
    }
}

/// Deterministic scheduler for tests: collects tasks, fires on demand
#[derive(Default)]
pub struct ManualScheduler {
    queue: Mutex<Vec<(TimerHandle, FlushTask)>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to fire (cancelled ones excluded)
    pub fn pending(&self) -> usize {
        self.queue.lock().iter().filter(|(handle, _)| !handle.is_cancelled()).count()
    }

    /// Fire every non-cancelled task in schedule order
    ///
    /// The queue is drained before any task runs, so tasks may reschedule
    /// freely. Returns the number of tasks that actually fired.
    pub fn fire_all(&self) -> usize {
        let drained: Vec<(TimerHandle, FlushTask)> = std::mem::take(&mut *self.queue.lock());
        let mut fired = 0;
        for (handle, task) in drained {
            if !handle.is_cancelled() {
                task();
                fired += 1;
            }
        }
        fired
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, _delay: Duration, task: FlushTask) -> Option<TimerHandle> {
        let handle = TimerHandle::new();
        self.queue.lock().push((handle.clone(), task));
        Some(handle)
    }
}
