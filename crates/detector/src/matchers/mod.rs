//! Pattern matchers that turn event clusters into operations
//!
//! Matchers run in a fixed priority order; the first match that clears the
//! confidence floor wins. Specific patterns run before generic ones so a
//! cluster is never double-classified. The chain is an explicit, immutable
//! list: extend by constructing a detector with your own ordering, not by
//! registering into shared state.

mod atomic;
mod backup;
mod batch;
mod rename;
mod safe_write;

pub use atomic::AtomicSaveMatcher;
pub use backup::BackupCreateMatcher;
pub use batch::BatchUpdateMatcher;
pub use rename::RenameSequenceMatcher;
pub use safe_write::SafeWriteMatcher;

use opsift_core::{extract_base_name, is_temp_file, DetectorConfig, FileEvent, FileOperation};
use std::path::PathBuf;
use std::time::SystemTime;

/// A single detection strategy over one time-window cluster
///
/// Clusters arrive time-ordered. Implementations must not mutate the input
/// and must never produce an operation whose `primary_path` is a temp file;
/// the orchestrator re-checks that invariant before emission.
pub trait OperationMatcher: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Inspect a cluster and optionally claim it
    fn matches(&self, group: &[FileEvent]) -> Option<FileOperation>;
}

/// Built-in matcher chain in priority order
pub fn default_matchers(config: &DetectorConfig) -> Vec<Box<dyn OperationMatcher>> {
    vec![
        Box::new(AtomicSaveMatcher),
        Box::new(SafeWriteMatcher),
        Box::new(RenameSequenceMatcher),
        Box::new(BackupCreateMatcher),
        Box::new(BatchUpdateMatcher::new(config.min_events_for_complex)),
    ]
}

/// True when every event in the cluster touches only temp paths
///
/// Such clusters are editor churn start to finish and must not produce any
/// operation, not even a low-confidence one.
pub fn is_pure_temp_churn(group: &[FileEvent]) -> bool {
    !group.is_empty()
        && group.iter().all(|event| {
            is_temp_file(&event.path)
                && event.dest_path.as_deref().map_or(true, is_temp_file)
        })
}

/// Find the real file a cluster is about
///
/// Newest-first scan for a non-temp move destination, then a non-temp
/// source path; as a last resort, the base name extracted from a temp name
/// (oldest first, so the earliest artifact names the target). `None` when
/// nothing is recoverable.
pub fn find_real_file_from_events(group: &[FileEvent]) -> Option<PathBuf> {
    for event in group.iter().rev() {
        if let Some(dest) = &event.dest_path {
            if !is_temp_file(dest) {
                return Some(dest.clone());
            }
        }
    }
    for event in group.iter().rev() {
        if !is_temp_file(&event.path) {
            return Some(event.path.clone());
        }
    }
    for event in group {
        if let Some(base) = extract_base_name(&event.path) {
            return Some(event.path.with_file_name(base));
        }
    }
    None
}

/// Distinct paths touched by a cluster, in first-seen order
pub(crate) fn affected_paths(group: &[FileEvent]) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for event in group {
        if !paths.contains(&event.path) {
            paths.push(event.path.clone());
        }
        if let Some(dest) = &event.dest_path {
            if !paths.contains(dest) {
                paths.push(dest.clone());
            }
        }
    }
    paths
}

/// Time span covered by a cluster
pub(crate) fn time_span(group: &[FileEvent]) -> (SystemTime, SystemTime) {
    let start = group.iter().map(|e| e.timestamp()).min().unwrap_or(SystemTime::UNIX_EPOCH);
    let end = group.iter().map(|e| e.timestamp()).max().unwrap_or(start);
    (start, end)
}
