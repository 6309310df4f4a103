//! Detected operation types

use crate::event::FileEvent;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

/// Semantic class of a detected operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    /// Write-to-temp-then-rename (or equivalent) save
    AtomicSave,
    /// Write preceded by a backup copy of the prior contents
    SafeWrite,
    /// Chain of moves ending at a final, non-temp path
    RenameSequence,
    /// Many files under one directory changed by a single logical action
    BatchUpdate,
    /// Standalone backup file creation
    #[serde(rename = "backup")]
    BackupCreate,
    /// Single event that matched no richer pattern
    Unknown,
}

impl OperationType {
    /// Wire string for this operation type
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::AtomicSave => "atomic_save",
            OperationType::SafeWrite => "safe_write",
            OperationType::RenameSequence => "rename_sequence",
            OperationType::BatchUpdate => "batch_update",
            OperationType::BackupCreate => "backup",
            OperationType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A semantic operation inferred from a cluster of raw events
///
/// Owned by the caller once returned; the detector keeps no reference.
/// `primary_path` is never a temp file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileOperation {
    /// Semantic class
    pub operation_type: OperationType,
    /// Canonical non-temp path the operation is about
    pub primary_path: PathBuf,
    /// Raw events that contributed to the classification
    pub events: Vec<FileEvent>,
    /// Classification certainty in [0, 1]
    pub confidence: f64,
    /// Human-readable summary
    pub description: String,
    /// Timestamp of the earliest contributing event
    pub start_time: SystemTime,
    /// Timestamp of the latest contributing event
    pub end_time: SystemTime,
    /// The real file was never observable in a partially-written state
    pub is_atomic: bool,
    /// Prior contents survived the write (backup or atomic replacement)
    pub is_safe: bool,
    /// A backup artifact was part of the operation
    pub has_backup: bool,
    /// Every path touched while the operation unfolded
    pub files_affected: Vec<PathBuf>,
}

impl FileOperation {
    /// Number of contributing events (always >= 1)
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Wall-clock span from first to last contributing event
    pub fn duration(&self) -> Duration {
        self.end_time.duration_since(self.start_time).unwrap_or(Duration::ZERO)
    }

    /// Minimal operation wrapping one event that matched no richer pattern
    pub fn from_single_event(event: FileEvent) -> Self {
        let primary = event.effective_path().to_path_buf();
        let timestamp = event.timestamp();
        Self {
            operation_type: OperationType::Unknown,
            primary_path: primary.clone(),
            description: format!("File {}: {}", event.event_type, primary.display()),
            confidence: 1.0,
            start_time: timestamp,
            end_time: timestamp,
            is_atomic: false,
            is_safe: false,
            has_backup: false,
            files_affected: vec![primary],
            events: vec![event],
        }
    }
}
