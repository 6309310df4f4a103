//! Backup creation detection

use super::{affected_paths, time_span, OperationMatcher};
use opsift_core::{
    extract_original_path, is_backup_file, is_temp_file, EventType, FileEvent, FileOperation,
    OperationType,
};
use tracing::trace;

/// Detects a backup artifact coming into existence, either as a plain
/// create (`important.txt.bak` appears) or as a rename onto the backup name
/// (`important.txt -> important.txt.bak`).
///
/// Backups *of temp artifacts* are rejected: a tool renaming
/// `x.tf.tmp.12345` to `x.tf.tmp.12345.bak` is shuffling its own scratch
/// files, not protecting user data.
pub struct BackupCreateMatcher;

impl OperationMatcher for BackupCreateMatcher {
    fn name(&self) -> &'static str {
        "backup_create"
    }

    fn matches(&self, group: &[FileEvent]) -> Option<FileOperation> {
        let (backup_path, origin) = group.iter().find_map(|event| match event.event_type {
            EventType::Created if is_backup_file(&event.path) => {
                Some((event.path.clone(), extract_original_path(&event.path)))
            }
            EventType::Moved => {
                let dest = event.dest_path.as_deref()?;
                is_backup_file(dest).then(|| (dest.to_path_buf(), event.path.clone()))
            }
            _ => None,
        })?;

        if is_temp_file(&origin) {
            trace!(origin = %origin.display(), "rejecting backup of temp artifact");
            return None;
        }

        let (start_time, end_time) = time_span(group);
        Some(FileOperation {
            operation_type: OperationType::BackupCreate,
            description: format!("Backup created: {}", backup_path.display()),
            primary_path: origin,
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
    fn test_single_backup_create() {
        let group = vec![event_at("important.txt.bak", EventType::Created, 0, 1)];

        let operation = BackupCreateMatcher.matches(&group).unwrap();
        assert_eq!(operation.operation_type, OperationType::BackupCreate);
        assert_eq!(operation.primary_path, PathBuf::from("important.txt"));
        assert!(operation.has_backup);
        assert!(!is_temp_file(&operation.primary_path));
    }

    #[test]
    fn test_rename_onto_backup_name() {
        let group = vec![
            move_at("important.txt", "important.txt.bak", 0, 1),
            event_at("important.txt", EventType::Created, 50, 2),
        ];

        let operation = BackupCreateMatcher.matches(&group).unwrap();
        assert_eq!(operation.primary_path, PathBuf::from("important.txt"));
        assert!(operation.has_backup);
    }

    #[test]
    fn test_backup_of_temp_artifact_rejected() {
        let group = vec![
            move_at("file.txt.tmp.123", "file.txt.tmp.123.bak", 0, 1),
            event_at("file.txt.tmp.123", EventType::Created, 50, 2),
        ];
        assert!(BackupCreateMatcher.matches(&group).is_none());
    }

    #[test]
    fn test_terraform_temp_backup_rejected() {
        let group = vec![
            move_at(
                "http_api_minimal_test.tf.tmp.96627.1760139764744",
                "http_api_minimal_test.tf.tmp.96627.1760139764744.bak",
                0,
                1,
            ),
            event_at("http_api_minimal_test.tf.tmp.96627.1760139764744", EventType::Created, 50, 2),
        ];
        assert!(BackupCreateMatcher.matches(&group).is_none());
    }

    #[test]
    fn test_created_temp_backup_rejected() {
        let group = vec![event_at(".config.json.tmp.9.bak", EventType::Created, 0, 1)];
        assert!(BackupCreateMatcher.matches(&group).is_none());
    }

    #[test]
    fn test_plain_create_is_not_a_backup() {
        let group = vec![event_at("document.txt", EventType::Created, 0, 1)];
        assert!(BackupCreateMatcher.matches(&group).is_none());
    }
}
