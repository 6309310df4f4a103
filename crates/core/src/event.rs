//! Raw filesystem event value types

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::SystemTime;
use thiserror::Error;

/// Error for event type strings the model does not know
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized event type: {0}")]
pub struct EventParseError(pub String);

/// Kind of raw filesystem change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// File created
    Created,
    /// File contents changed
    Modified,
    /// File renamed (dest_path carries the destination)
    Moved,
    /// File removed
    Deleted,
}

impl EventType {
    /// Wire string for this event type
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Created => "created",
            EventType::Modified => "modified",
            EventType::Moved => "moved",
            EventType::Deleted => "deleted",
        }
    }
}

impl FromStr for EventType {
    type Err = EventParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(EventType::Created),
            "modified" => Ok(EventType::Modified),
            "moved" => Ok(EventType::Moved),
            "deleted" => Ok(EventType::Deleted),
            other => Err(EventParseError(other.to_string())),
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory metadata captured alongside a raw event
///
/// Only `timestamp` and `sequence_number` are required; everything else
/// depends on what the platform watcher could observe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEventMetadata {
    /// When the change was observed
    pub timestamp: SystemTime,
    /// Monotonic tie-breaker for colliding timestamps
    pub sequence_number: u64,
    /// File size before the change, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_before: Option<u64>,
    /// File size after the change, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_after: Option<u64>,
    /// Unix permission bits, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<u32>,
    /// Process that produced the change, when the platform reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_name: Option<String>,
}

impl FileEventMetadata {
    /// Metadata with only the required fields set
    pub fn new(timestamp: SystemTime, sequence_number: u64) -> Self {
        Self {
            timestamp,
            sequence_number,
            size_before: None,
            size_after: None,
            permissions: None,
            process_name: None,
        }
    }
}

/// A single raw filesystem change notification
///
/// Produced by an external watch adapter and never mutated afterwards. For
/// `Moved` events `path` is the source and `dest_path` the destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEvent {
    /// Path the event is about
    pub path: PathBuf,
    /// Kind of change
    pub event_type: EventType,
    /// Move destination, present only for `Moved` events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_path: Option<PathBuf>,
    /// Observation metadata
    pub metadata: FileEventMetadata,
}

impl FileEvent {
    /// Create a non-move event
    pub fn new(path: impl Into<PathBuf>, event_type: EventType, metadata: FileEventMetadata) -> Self {
        Self { path: path.into(), event_type, dest_path: None, metadata }
    }

    /// Create a move event
    pub fn moved(
        path: impl Into<PathBuf>,
        dest_path: impl Into<PathBuf>,
        metadata: FileEventMetadata,
    ) -> Self {
        Self {
            path: path.into(),
            event_type: EventType::Moved,
            dest_path: Some(dest_path.into()),
            metadata,
        }
    }

    /// When the change was observed
    pub fn timestamp(&self) -> SystemTime {
        self.metadata.timestamp
    }

    /// Monotonic tie-breaker for colliding timestamps
    pub fn sequence(&self) -> u64 {
        self.metadata.sequence_number
    }

    /// Size change across the event; `None` unless both sizes are known
    pub fn size_delta(&self) -> Option<i64> {
        let before = self.metadata.size_before?;
        let after = self.metadata.size_after?;
        Some(after as i64 - before as i64)
    }

    /// The path the event leaves behind (move destination when present)
    pub fn effective_path(&self) -> &Path {
        self.dest_path.as_deref().unwrap_or(&self.path)
    }
}
