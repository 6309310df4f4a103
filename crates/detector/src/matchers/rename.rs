//! Rename chain detection

use super::{affected_paths, time_span, OperationMatcher};
use opsift_core::{is_temp_file, EventType, FileEvent, FileOperation, OperationType};

/// Detects chains of moves where each destination becomes the next source,
/// e.g. `old.txt -> temp.txt -> final.txt`. A single move is not a chain;
/// lone moves are either an atomic-save finish or a backup rename, both
/// claimed elsewhere.
pub struct RenameSequenceMatcher;

impl OperationMatcher for RenameSequenceMatcher {
    fn name(&self) -> &'static str {
        "rename_sequence"
    }

    fn matches(&self, group: &[FileEvent]) -> Option<FileOperation> {
        let moves: Vec<&FileEvent> = group
            .iter()
            .filter(|event| event.event_type == EventType::Moved && event.dest_path.is_some())
            .collect();
        if moves.len() < 2 {
            return None;
        }

        // Walk the chain from the first move for as long as it stays linked
        let mut chained = 1;
        for pair in moves.windows(2) {
            if pair[0].dest_path.as_deref() == Some(pair[1].path.as_path()) {
                chained += 1;
            } else {
                break;
            }
        }
        if chained < 2 {
            return None;
        }

        let final_dest = moves[chained - 1].dest_path.clone()?;
        if is_temp_file(&final_dest) {
            // A chain parked on a temp name is an unfinished write
            return None;
        }

        let (start_time, end_time) = time_span(group);
        Some(FileOperation {
            operation_type: OperationType::RenameSequence,
            description: format!("Rename sequence ({chained} moves): {}", final_dest.display()),
            primary_path: final_dest,
            events: group.to_vec(),
            confidence: 0.8,
            start_time,
            end_time,
            is_atomic: true,
            is_safe: false,
            has_backup: false,
            files_affected: affected_paths(group),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::move_at;
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_two_move_chain() {
        let group = vec![
            move_at("old_name.txt", "temp_name.txt", 0, 1),
            move_at("temp_name.txt", "final_name.txt", 50, 2),
        ];

        let operation = RenameSequenceMatcher.matches(&group).unwrap();
        assert_eq!(operation.operation_type, OperationType::RenameSequence);
        assert_eq!(operation.primary_path, PathBuf::from("final_name.txt"));
        assert!(operation.is_atomic);
    }

    #[test]
    fn test_three_move_chain_tracks_final_destination() {
        let group = vec![
            move_at("a.txt", "b.txt", 0, 1),
            move_at("b.txt", "c.txt", 20, 2),
            move_at("c.txt", "d.txt", 40, 3),
        ];

        let operation = RenameSequenceMatcher.matches(&group).unwrap();
        assert_eq!(operation.primary_path, PathBuf::from("d.txt"));
        assert!(operation.description.contains("3 moves"));
    }

    #[test]
    fn test_single_move_is_not_a_chain() {
        let group = vec![move_at("old.txt", "new.txt", 0, 1)];
        assert!(RenameSequenceMatcher.matches(&group).is_none());
    }

    #[test]
    fn test_unlinked_moves_are_not_a_chain() {
        let group = vec![
            move_at("a.txt", "b.txt", 0, 1),
            move_at("x.txt", "y.txt", 20, 2),
        ];
        assert!(RenameSequenceMatcher.matches(&group).is_none());
    }

    #[test]
    fn test_chain_ending_on_temp_rejected() {
        let group = vec![
            move_at("a.txt", "b.txt", 0, 1),
            move_at("b.txt", ".b.txt.tmp.1", 20, 2),
        ];
        assert!(RenameSequenceMatcher.matches(&group).is_none());
    }
}
