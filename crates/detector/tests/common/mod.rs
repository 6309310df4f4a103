//! Shared builders for detector integration tests
#![allow(dead_code)] // each test binary uses a different subset

use opsift_core::{EventType, FileEvent, FileEventMetadata};
use std::time::{Duration, SystemTime};

/// Fixed base instant so tests are reproducible
pub fn base_time() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_millis(1_700_000_000_000)
}

/// Non-move event `offset_ms` past the base instant
pub fn event_at(path: &str, event_type: EventType, offset_ms: u64, seq: u64) -> FileEvent {
    let metadata = FileEventMetadata::new(base_time() + Duration::from_millis(offset_ms), seq);
    FileEvent::new(path, event_type, metadata)
}

/// Move event `offset_ms` past the base instant
pub fn move_at(path: &str, dest: &str, offset_ms: u64, seq: u64) -> FileEvent {
    let metadata = FileEventMetadata::new(base_time() + Duration::from_millis(offset_ms), seq);
    FileEvent::moved(path, dest, metadata)
}

/// Install a test subscriber once so detector tracing shows up in test output
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
