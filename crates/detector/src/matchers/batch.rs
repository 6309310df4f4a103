//! Batch update detection (builds, formatters, deploy syncs)

use super::{time_span, OperationMatcher};
use opsift_core::{is_temp_file, FileEvent, FileOperation, OperationType};
use std::path::{Component, Path, PathBuf};

/// Fallback matcher: many distinct real files under one directory changing
/// in the same window, attributable to a single logical action. Runs last
/// so specific patterns always win.
pub struct BatchUpdateMatcher {
    min_distinct_files: usize,
}

impl BatchUpdateMatcher {
    pub fn new(min_distinct_files: usize) -> Self {
        Self { min_distinct_files }
    }
}

impl OperationMatcher for BatchUpdateMatcher {
    fn name(&self) -> &'static str {
        "batch_update"
    }

    fn matches(&self, group: &[FileEvent]) -> Option<FileOperation> {
        // Only real files count toward a batch; temp churn alongside them
        // is ignored rather than disqualifying.
        let real: Vec<&FileEvent> =
            group.iter().filter(|event| !is_temp_file(&event.path)).collect();

        let mut distinct: Vec<&Path> = Vec::new();
        for event in &real {
            if !distinct.contains(&event.path.as_path()) {
                distinct.push(event.path.as_path());
            }
        }
        if distinct.len() < self.min_distinct_files {
            return None;
        }

        let common = common_parent(&distinct);
        // Bigger bursts are more clearly one action
        let confidence = (0.6 + 0.05 * distinct.len() as f64).min(0.9);

        let events: Vec<FileEvent> = real.iter().map(|event| (*event).clone()).collect();
        let (start_time, end_time) = time_span(&events);
        Some(FileOperation {
            operation_type: OperationType::BatchUpdate,
            description: format!(
                "Batch update of {} files under {}",
                distinct.len(),
                common.display()
            ),
            primary_path: common,
            files_affected: distinct.iter().map(|path| path.to_path_buf()).collect(),
            events,
            confidence,
            start_time,
            end_time,
            is_atomic: false,
            is_safe: false,
            has_backup: false,
        })
    }
}

/// Deepest directory containing every path; `.` for bare top-level names
fn common_parent(paths: &[&Path]) -> PathBuf {
    let mut iter = paths.iter().map(|path| parent_components(path));
    let Some(mut common) = iter.next() else {
        return PathBuf::from(".");
    };
    for components in iter {
        let shared = common.iter().zip(&components).take_while(|(a, b)| a == b).count();
        common.truncate(shared);
    }
    if common.is_empty() {
        PathBuf::from(".")
    } else {
        common.iter().collect()
    }
}

fn parent_components(path: &Path) -> Vec<Component<'_>> {
    path.parent().map(|parent| parent.components().collect()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::super::testutil::event_at;
    use super::*;
    use opsift_core::EventType;

    #[test]
    fn test_batch_under_common_directory() {
        let group: Vec<FileEvent> = (0..5)
            .map(|i| {
                event_at(&format!("src/file{i}.py"), EventType::Modified, i * 10, i + 1)
            })
            .collect();

        let operation = BatchUpdateMatcher::new(3).matches(&group).unwrap();
        assert_eq!(operation.operation_type, OperationType::BatchUpdate);
        assert_eq!(operation.primary_path, PathBuf::from("src"));
        assert_eq!(operation.event_count(), 5);
        assert!(operation.confidence >= 0.7);
        assert_eq!(operation.files_affected.len(), 5);
    }

    #[test]
    fn test_too_few_distinct_files() {
        let group = vec![
            event_at("src/a.py", EventType::Modified, 0, 1),
            event_at("src/b.py", EventType::Modified, 10, 2),
        ];
        assert!(BatchUpdateMatcher::new(3).matches(&group).is_none());
    }

    #[test]
    fn test_repeated_events_on_one_file_do_not_count_twice() {
        let group: Vec<FileEvent> = (0..5)
            .map(|i| event_at("src/same.py", EventType::Modified, i * 10, i + 1))
            .collect();
        assert!(BatchUpdateMatcher::new(3).matches(&group).is_none());
    }

    #[test]
    fn test_temp_files_do_not_count() {
        let group = vec![
            event_at("src/.a.py.tmp.1", EventType::Created, 0, 1),
            event_at("src/.b.py.tmp.2", EventType::Created, 10, 2),
            event_at("src/.c.py.tmp.3", EventType::Created, 20, 3),
            event_at("src/real.py", EventType::Modified, 30, 4),
        ];
        assert!(BatchUpdateMatcher::new(3).matches(&group).is_none());
    }

    #[test]
    fn test_nested_paths_share_deepest_ancestor() {
        let group = vec![
            event_at("src/app/a.py", EventType::Modified, 0, 1),
            event_at("src/app/sub/b.py", EventType::Modified, 10, 2),
            event_at("src/lib/c.py", EventType::Modified, 20, 3),
        ];

        let operation = BatchUpdateMatcher::new(3).matches(&group).unwrap();
        assert_eq!(operation.primary_path, PathBuf::from("src"));
    }

    #[test]
    fn test_top_level_files_fall_back_to_dot() {
        let group = vec![
            event_at("a.txt", EventType::Modified, 0, 1),
            event_at("b.txt", EventType::Modified, 10, 2),
            event_at("c.txt", EventType::Modified, 20, 3),
        ];

        let operation = BatchUpdateMatcher::new(3).matches(&group).unwrap();
        assert_eq!(operation.primary_path, PathBuf::from("."));
    }
}
