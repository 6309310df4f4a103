//! Safe write detection (backup copy then modify)

use super::{affected_paths, time_span, OperationMatcher};
use opsift_core::{
    extract_original_path, is_backup_file, is_temp_file, EventType, FileEvent, FileOperation,
    OperationType,
};

/// Detects the vim-style safe write: a backup copy of the prior contents
/// appears (`config.py~`, `config.py.bak`), then the real file changes in
/// the same window.
pub struct SafeWriteMatcher;

impl OperationMatcher for SafeWriteMatcher {
    fn name(&self) -> &'static str {
        "safe_write"
    }

    fn matches(&self, group: &[FileEvent]) -> Option<FileOperation> {
        // The backup must be born here; a backup arriving via rename is
        // backup creation, handled further down the chain.
        let backup = group.iter().find(|event| {
            event.event_type == EventType::Created && is_backup_file(&event.path)
        })?;

        let original = extract_original_path(&backup.path);
        if is_temp_file(&original) {
            return None;
        }

        let modified = group
            .iter()
            .any(|event| event.path == original && event.event_type == EventType::Modified);
        let deleted = group
            .iter()
            .any(|event| event.path == original && event.event_type == EventType::Deleted);
        let created = group
            .iter()
            .any(|event| event.path == original && event.event_type == EventType::Created);
        if !(modified || (deleted && created)) {
            return None;
        }

        let (start_time, end_time) = time_span(group);
        Some(FileOperation {
            operation_type: OperationType::SafeWrite,
            description: format!("Safe write with backup: {}", original.display()),
            primary_path: original,
            events: group.to_vec(),
            confidence: 0.85,
            start_time,
            end_time,
            is_atomic: false,
            is_safe: true,
            has_backup: true,
            files_affected: affected_paths(group),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::{event_at, move_at};
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_backup_then_modify() {
        let group = vec![
            event_at("document.bak", EventType::Created, 0, 1),
            event_at("document", EventType::Modified, 100, 2),
        ];

        let operation = SafeWriteMatcher.matches(&group).unwrap();
        assert_eq!(operation.operation_type, OperationType::SafeWrite);
        assert_eq!(operation.primary_path, PathBuf::from("document"));
        assert!(operation.has_backup);
        assert!(operation.is_safe);
    }

    #[test]
    fn test_vim_tilde_backup_then_modify() {
        let group = vec![
            event_at("config.py~", EventType::Created, 0, 1),
            event_at("config.py", EventType::Modified, 5, 2),
        ];

        let operation = SafeWriteMatcher.matches(&group).unwrap();
        assert_eq!(operation.primary_path, PathBuf::from("config.py"));
        assert!(operation.has_backup);
    }

    #[test]
    fn test_backup_then_delete_and_recreate() {
        let group = vec![
            event_at("document.txt~", EventType::Created, 0, 1),
            event_at("document.txt", EventType::Deleted, 10, 2),
            event_at("document.txt", EventType::Created, 20, 3),
        ];

        let operation = SafeWriteMatcher.matches(&group).unwrap();
        assert_eq!(operation.primary_path, PathBuf::from("document.txt"));
    }

    #[test]
    fn test_backup_alone_is_not_a_safe_write() {
        let group = vec![event_at("important.txt.bak", EventType::Created, 0, 1)];
        assert!(SafeWriteMatcher.matches(&group).is_none());
    }

    #[test]
    fn test_backup_via_rename_is_not_claimed() {
        // moved-onto-backup belongs to backup creation, not safe write
        let group = vec![
            move_at("important.txt", "important.txt.bak", 0, 1),
            event_at("important.txt", EventType::Created, 50, 2),
        ];
        assert!(SafeWriteMatcher.matches(&group).is_none());
    }

    #[test]
    fn test_backup_of_temp_artifact_rejected() {
        let group = vec![
            event_at("file.txt.tmp.123.bak", EventType::Created, 0, 1),
            event_at("file.txt.tmp.123", EventType::Modified, 10, 2),
        ];
        assert!(SafeWriteMatcher.matches(&group).is_none());
    }
}
