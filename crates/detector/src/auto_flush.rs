//! Debounced operation delivery for long-lived watch sessions
//!
//! Buffers events as they arrive and reschedules a single flush timer so
//! detection runs only after a quiet period. Pure temp churn is dropped
//! silently; real changes that matched no richer pattern still surface as
//! minimal single-event operations instead of getting lost.

use crate::orchestrator::OperationDetector;
use crate::scheduler::{Scheduler, TimerHandle, TokioScheduler};
use anyhow::Result;
use opsift_core::{is_temp_file, ConfigError, DetectorConfig, EventType, FileEvent, FileOperation};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Callback invoked once per resolved operation
///
/// Returning an error queues the operation for retry instead of losing it;
/// see [`AutoFlushHandler::retry_failed_operations`].
pub type OperationCallback = Arc<dyn Fn(FileOperation) -> Result<()> + Send + Sync>;

/// Debounced wrapper around the detection engine
///
/// Every instance is fully independent: the mutable state is one pending
/// buffer and one timer handle behind one mutex, plus the failed-operation
/// queue behind another. Cheap to clone; clones share the same buffer.
#[derive(Clone)]
pub struct AutoFlushHandler {
    inner: Arc<HandlerInner>,
}

struct HandlerInner {
    detector: OperationDetector,
    time_window: Duration,
    callback: Option<OperationCallback>,
    scheduler: Arc<dyn Scheduler>,
    state: Mutex<FlushState>,
    failed: Mutex<Vec<FileOperation>>,
}

#[derive(Default)]
struct FlushState {
    events: Vec<FileEvent>,
    timer: Option<TimerHandle>,
}

impl AutoFlushHandler {
    /// Handler without a callback (events still buffer and flush)
    pub fn new(time_window: Duration) -> Result<Self, ConfigError> {
        let config = DetectorConfig { time_window, ..DetectorConfig::default() };
        Self::with_config(config, None, Arc::new(TokioScheduler))
    }

    /// Handler delivering operations through `callback`
    pub fn with_callback(
        time_window: Duration,
        callback: OperationCallback,
    ) -> Result<Self, ConfigError> {
        let config = DetectorConfig { time_window, ..DetectorConfig::default() };
        Self::with_config(config, Some(callback), Arc::new(TokioScheduler))
    }

    /// Fully parameterized constructor (custom config and scheduler)
    pub fn with_config(
        config: DetectorConfig,
        callback: Option<OperationCallback>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Result<Self, ConfigError> {
        let time_window = config.time_window;
        let detector = OperationDetector::new(config)?;
        Ok(Self {
            inner: Arc::new(HandlerInner {
                detector,
                time_window,
                callback,
                scheduler,
                state: Mutex::new(FlushState::default()),
                failed: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Buffer an event and push the flush deadline forward
    ///
    /// Each call cancels the previous timer and arms a fresh one, so the
    /// flush only fires `time_window` after the *last* event (debounce).
    /// Without a timer substrate the event still buffers; only the
    /// timer-driven flush is deferred.
    pub fn add_event(&self, event: FileEvent) {
        let mut state = self.inner.state.lock();
        state.events.push(event);
        trace!(pending = state.events.len(), "event buffered");
        HandlerInner::reschedule_locked(&self.inner, &mut state);
    }

    /// Re-arm the flush timer without adding an event
    pub fn schedule_flush(&self) {
        let mut state = self.inner.state.lock();
        HandlerInner::reschedule_locked(&self.inner, &mut state);
    }

    /// Force detection over everything buffered right now
    ///
    /// Returns the number of operations delivered.
    pub fn flush(&self) -> usize {
        HandlerInner::flush_now(&self.inner)
    }

    /// Cancel the pending timer and drop buffered events
    ///
    /// Queued failed operations are left untouched.
    pub fn clear(&self) {
        let mut state = self.inner.state.lock();
        if let Some(timer) = state.timer.take() {
            timer.cancel();
        }
        state.events.clear();
    }

    /// Consistent snapshot of the pending buffer
    pub fn pending_events(&self) -> Vec<FileEvent> {
        self.inner.state.lock().events.clone()
    }

    pub fn time_window(&self) -> Duration {
        self.inner.time_window
    }

    /// Operations whose callback failed, oldest first (cloned)
    pub fn failed_operations(&self) -> Vec<FileOperation> {
        self.inner.failed.lock().clone()
    }

    pub fn failed_operations_count(&self) -> usize {
        self.inner.failed.lock().len()
    }

    /// Re-deliver queued failures; returns how many succeeded
    ///
    /// Operations that fail again go back on the queue. Safe to call from
    /// several threads: the queue is drained atomically, so each operation
    /// is retried by exactly one caller at a time.
    pub fn retry_failed_operations(&self) -> usize {
        let queued = std::mem::take(&mut *self.inner.failed.lock());
        if queued.is_empty() {
            return 0;
        }

        let mut delivered = 0;
        for operation in queued {
            if HandlerInner::emit(&self.inner, operation) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Drop queued failures; returns how many were discarded
    pub fn clear_failed_operations(&self) -> usize {
        let mut failed = self.inner.failed.lock();
        let count = failed.len();
        failed.clear();
        count
    }
}

impl HandlerInner {
    /// Cancel the running timer and arm a fresh one
    ///
    /// Called under the state lock; both schedulers only enqueue or spawn
    /// here, so nothing re-enters the lock.
    fn reschedule_locked(inner: &Arc<HandlerInner>, state: &mut FlushState) {
        if let Some(timer) = state.timer.take() {
            timer.cancel();
        }
        let handler = Arc::clone(inner);
        state.timer = inner
            .scheduler
            .schedule(inner.time_window, Box::new(move || {
                HandlerInner::flush_now(&handler);
            }));
    }

    /// Take the buffer, detect, emit
    ///
    /// The buffer is cleared before detection and the callback run, so
    /// re-entrant `add_event`/`clear` calls start from a clean slate
    /// instead of racing the flush in progress. A stale timer firing late
    /// sees an empty buffer and does nothing.
    fn flush_now(inner: &Arc<HandlerInner>) -> usize {
        let events = {
            let mut state = inner.state.lock();
            if let Some(timer) = state.timer.take() {
                timer.cancel();
            }
            std::mem::take(&mut state.events)
        };
        if events.is_empty() {
            return 0;
        }

        debug!(events = events.len(), "flushing buffered events");
        let operations = inner.detector.detect(&events);
        let leftovers = Self::unclaimed_events(&events, &operations);

        let mut emitted = 0;
        for operation in operations {
            if is_temp_file(&operation.primary_path) {
                continue;
            }
            if Self::emit(inner, operation) {
                emitted += 1;
            }
        }
        for event in leftovers {
            if Self::emit(inner, FileOperation::from_single_event(event)) {
                emitted += 1;
            }
        }
        emitted
    }

    /// Non-temp events no detected operation accounted for, one per path
    ///
    /// A path that was both created and deleted inside the window is
    /// ephemeral: it left nothing behind to report.
    fn unclaimed_events(events: &[FileEvent], operations: &[FileOperation]) -> Vec<FileEvent> {
        let claimed: HashSet<(u64, &Path)> = operations
            .iter()
            .flat_map(|operation| operation.events.iter())
            .map(|event| (event.sequence(), event.path.as_path()))
            .collect();

        let created: HashSet<&Path> = events
            .iter()
            .filter(|event| event.event_type == EventType::Created)
            .map(|event| event.path.as_path())
            .collect();
        let deleted: HashSet<&Path> = events
            .iter()
            .filter(|event| event.event_type == EventType::Deleted)
            .map(|event| event.path.as_path())
            .collect();

        let mut reported: HashSet<PathBuf> = HashSet::new();
        let mut leftovers = Vec::new();
        for event in events {
            if claimed.contains(&(event.sequence(), event.path.as_path())) {
                continue;
            }
            let primary = event.effective_path();
            if is_temp_file(primary) {
                continue;
            }
            if created.contains(event.path.as_path()) && deleted.contains(event.path.as_path()) {
                trace!(path = %event.path.display(), "dropping ephemeral create/delete pair");
                continue;
            }
            if !reported.insert(primary.to_path_buf()) {
                continue;
            }
            leftovers.push(event.clone());
        }
        leftovers
    }

    /// Deliver one operation, queueing it on callback failure
    ///
    /// Runs without any lock held, so a callback may re-enter the handler.
    fn emit(inner: &HandlerInner, operation: FileOperation) -> bool {
        let Some(callback) = &inner.callback else { return true };
        match callback(operation.clone()) {
            Ok(()) => {
                trace!(path = %operation.primary_path.display(), "operation delivered");
                true
            }
            Err(error) => {
                warn!(
                    path = %operation.primary_path.display(),
                    %error,
                    "operation callback failed; queued for retry"
                );
                inner.failed.lock().push(operation);
                false
            }
        }
    }
}
