//! Gap-based time clustering of event streams

use opsift_core::FileEvent;
use std::time::Duration;

/// Split events into clusters where consecutive members are at most
/// `window` apart
///
/// Events are sorted by `(timestamp, sequence)` first; the sequence number
/// is the authoritative tie-break when timestamps collide. Chaining is
/// transitive: a burst of closely spaced events forms one cluster even when
/// its total span exceeds `window`.
pub fn group_events_by_time(events: &[FileEvent], window: Duration) -> Vec<Vec<FileEvent>> {
    if events.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<FileEvent> = events.to_vec();
    sorted.sort_by(|a, b| {
        a.timestamp().cmp(&b.timestamp()).then_with(|| a.sequence().cmp(&b.sequence()))
    });

    let mut groups: Vec<Vec<FileEvent>> = Vec::new();
    let mut current: Vec<FileEvent> = Vec::new();

    for event in sorted {
        let gap = current.last().map(|prev| {
            // Clock regressions group as zero-gap rather than erroring
            event.timestamp().duration_since(prev.timestamp()).unwrap_or(Duration::ZERO)
        });
        match gap {
            Some(gap) if gap > window => {
                groups.push(std::mem::take(&mut current));
                current.push(event);
            }
            _ => current.push(event),
        }
    }
    groups.push(current);
    groups
}
