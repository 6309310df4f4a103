//! Atomic save detection (write-to-temp-then-rename and friends)

use super::{affected_paths, time_span, OperationMatcher};
use opsift_core::{
    extract_base_name, is_temp_file, EventType, FileEvent, FileOperation, OperationType,
};
use std::path::PathBuf;

/// Detects the three shapes editors use to replace a file atomically:
/// temp-then-rename (VSCode), temp create/delete with a same-named real
/// create, and delete-then-recreate of the same path.
pub struct AtomicSaveMatcher;

impl OperationMatcher for AtomicSaveMatcher {
    fn name(&self) -> &'static str {
        "atomic_save"
    }

    fn matches(&self, group: &[FileEvent]) -> Option<FileOperation> {
        temp_rename(group)
            .or_else(|| temp_replaced_by_real(group))
            .or_else(|| delete_then_recreate(group))
    }
}

/// Temp file created (and maybe modified) then moved onto the real path
fn temp_rename(group: &[FileEvent]) -> Option<FileOperation> {
    let moved = group.iter().find(|event| {
        event.event_type == EventType::Moved
            && is_temp_file(&event.path)
            && event.dest_path.as_deref().is_some_and(|dest| !is_temp_file(dest))
    })?;
    let dest = moved.dest_path.clone()?;

    // The rename is the strongest signal; seeing the temp file born in the
    // same window raises confidence slightly.
    let saw_create = group
        .iter()
        .any(|event| event.event_type == EventType::Created && event.path == moved.path);
    let confidence = if saw_create { 0.95 } else { 0.9 };

    Some(build(group, dest, confidence, "temp rename"))
}

/// Temp file created and deleted, with a same-named real file created
fn temp_replaced_by_real(group: &[FileEvent]) -> Option<FileOperation> {
    let deleted_temp = group
        .iter()
        .find(|event| event.event_type == EventType::Deleted && is_temp_file(&event.path))?;
    let created_same_temp = group
        .iter()
        .any(|event| event.event_type == EventType::Created && event.path == deleted_temp.path);
    if !created_same_temp {
        return None;
    }

    let base = extract_base_name(&deleted_temp.path)?;
    let real_created = group.iter().find(|event| {
        event.event_type == EventType::Created
            && !is_temp_file(&event.path)
            && event.path.file_name().and_then(|name| name.to_str()) == Some(base.as_str())
    })?;

    Some(build(group, real_created.path.clone(), 0.93, "temp replaced"))
}

/// Same non-temp path deleted then created again (truncate-and-rewrite)
fn delete_then_recreate(group: &[FileEvent]) -> Option<FileOperation> {
    for (i, deleted) in group.iter().enumerate() {
        if deleted.event_type != EventType::Deleted || is_temp_file(&deleted.path) {
            continue;
        }
        let recreated = group[i + 1..]
            .iter()
            .any(|event| event.event_type == EventType::Created && event.path == deleted.path);
        if recreated {
            return Some(build(group, deleted.path.clone(), 0.9, "delete and recreate"));
        }
    }
    None
}

fn build(group: &[FileEvent], primary: PathBuf, confidence: f64, shape: &str) -> FileOperation {
    let (start_time, end_time) = time_span(group);
    FileOperation {
        operation_type: OperationType::AtomicSave,
        description: format!("Atomic save ({shape}): {}", primary.display()),
        primary_path: primary,
        events: group.to_vec(),
        confidence,
        start_time,
        end_time,
        is_atomic: true,
        is_safe: true,
        has_backup: false,
        files_affected: affected_paths(group),
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::{event_at, move_at};
    use super::*;

    #[test]
    fn test_vscode_temp_rename() {
        let group = vec![
            event_at("document.txt.tmp.12345", EventType::Created, 0, 1),
            move_at("document.txt.tmp.12345", "document.txt", 50, 2),
        ];

        let operation = AtomicSaveMatcher.matches(&group).unwrap();
        assert_eq!(operation.operation_type, OperationType::AtomicSave);
        assert_eq!(operation.primary_path, PathBuf::from("document.txt"));
        assert!(operation.confidence >= 0.9);
        assert!(operation.is_atomic);
        assert!(operation.is_safe);
        assert!(operation.description.contains("Atomic save"));
    }

    #[test]
    fn test_temp_rename_counts_whole_group() {
        let group = vec![
            event_at(".test.py.tmp.123", EventType::Created, 0, 1),
            event_at(".test.py.tmp.123", EventType::Modified, 5, 2),
            move_at(".test.py.tmp.123", "test.py", 10, 3),
        ];

        let operation = AtomicSaveMatcher.matches(&group).unwrap();
        assert_eq!(operation.primary_path, PathBuf::from("test.py"));
        assert_eq!(operation.event_count(), 3);
        assert_eq!(operation.confidence, 0.95);
    }

    #[test]
    fn test_bare_rename_without_create_still_matches() {
        let group = vec![move_at(".doc.txt.tmp.9", "doc.txt", 0, 1)];

        let operation = AtomicSaveMatcher.matches(&group).unwrap();
        assert_eq!(operation.primary_path, PathBuf::from("doc.txt"));
        assert_eq!(operation.confidence, 0.9);
    }

    #[test]
    fn test_temp_replaced_by_real() {
        let group = vec![
            event_at("test_config_commands.py.tmp.84", EventType::Created, 0, 1),
            event_at("test_config_commands.py.tmp.84", EventType::Deleted, 50, 2),
            event_at("test_config_commands.py", EventType::Created, 100, 3),
        ];

        let operation = AtomicSaveMatcher.matches(&group).unwrap();
        assert_eq!(operation.primary_path, PathBuf::from("test_config_commands.py"));
        assert!(operation.confidence >= 0.9);
        assert!(operation.is_atomic);
    }

    #[test]
    fn test_temp_replaced_requires_matching_base_name() {
        let group = vec![
            event_at(".other.txt.tmp.1", EventType::Created, 0, 1),
            event_at(".other.txt.tmp.1", EventType::Deleted, 50, 2),
            event_at("unrelated.txt", EventType::Created, 100, 3),
        ];
        assert!(AtomicSaveMatcher.matches(&group).is_none());
    }

    #[test]
    fn test_delete_then_recreate() {
        let group = vec![
            event_at("document.txt", EventType::Deleted, 0, 1),
            event_at("document.txt", EventType::Created, 50, 2),
        ];

        let operation = AtomicSaveMatcher.matches(&group).unwrap();
        assert_eq!(operation.primary_path, PathBuf::from("document.txt"));
        assert!(operation.confidence >= 0.9);
        assert!(operation.is_atomic);
    }

    #[test]
    fn test_create_then_delete_is_not_a_save() {
        // Opposite order: the file ended up gone
        let group = vec![
            event_at("document.txt", EventType::Created, 0, 1),
            event_at("document.txt", EventType::Deleted, 50, 2),
        ];
        assert!(AtomicSaveMatcher.matches(&group).is_none());
    }

    #[test]
    fn test_temp_to_temp_move_rejected() {
        let group = vec![move_at(".a.tmp.1", ".a.tmp.2", 0, 1)];
        assert!(AtomicSaveMatcher.matches(&group).is_none());
    }

    #[test]
    fn test_plain_modify_rejected() {
        let group = vec![event_at("document.txt", EventType::Modified, 0, 1)];
        assert!(AtomicSaveMatcher.matches(&group).is_none());
    }
}
