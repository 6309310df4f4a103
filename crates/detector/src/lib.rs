//! Semantic file-operation detection
//!
//! Classifies raw filesystem change notifications into the higher-level
//! operations editors, build tools, and deployment agents actually perform:
//! - Atomic saves (write-to-temp-then-rename)
//! - Safe writes with a backup copy
//! - Rename chains
//! - Batch updates (builds, formatters)
//! - Backup creation
//!
//! Temp-file churn (`.tmp.12345`, `~`, `.swp`) is suppressed instead of
//! surfacing as phantom changes. Batch callers use
//! [`OperationDetector::detect`]; long-lived watch sessions use
//! [`AutoFlushHandler`] for debounced, callback-driven delivery.

pub mod auto_flush;
pub mod group;
pub mod matchers;
pub mod orchestrator;
pub mod scheduler;

// Re-exports
pub use auto_flush::{AutoFlushHandler, OperationCallback};
pub use group::group_events_by_time;
pub use matchers::{default_matchers, find_real_file_from_events, OperationMatcher};
pub use orchestrator::OperationDetector;
pub use scheduler::{ManualScheduler, Scheduler, TimerHandle, TokioScheduler};

use opsift_core::{FileEvent, FileOperation};
use std::time::Duration;

/// Detect operations in a batch of events using the default configuration
pub fn detect_operations(events: &[FileEvent]) -> Vec<FileOperation> {
    OperationDetector::default().detect(events)
}

/// Group events into time-window clusters without running detection
pub fn group_related_events(events: &[FileEvent], window: Duration) -> Vec<Vec<FileEvent>> {
    group_events_by_time(events, window)
}
