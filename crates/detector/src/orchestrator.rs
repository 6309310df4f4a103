//! Batch and streaming detection entry points

use crate::group::group_events_by_time;
use crate::matchers::{default_matchers, is_pure_temp_churn, OperationMatcher};
use opsift_core::{is_temp_file, ConfigError, DetectorConfig, FileEvent, FileOperation};
use parking_lot::Mutex;
use tracing::{debug, trace};

/// Classifies raw event batches into semantic operations
///
/// `detect` takes `&self` and shares nothing mutable, so any number of
/// threads may call it at once. The only interior state is the streaming
/// buffer used by `detect_streaming`/`flush`, behind its own mutex.
pub struct OperationDetector {
    config: DetectorConfig,
    matchers: Vec<Box<dyn OperationMatcher>>,
    pending: Mutex<Vec<FileEvent>>,
}

impl Default for OperationDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default()).expect("default config is valid")
    }
}

impl OperationDetector {
    /// Create a detector with the built-in matcher chain
    pub fn new(config: DetectorConfig) -> Result<Self, ConfigError> {
        let matchers = default_matchers(&config);
        Self::with_matchers(config, matchers)
    }

    /// Create a detector with a custom matcher chain (priority order)
    pub fn with_matchers(
        config: DetectorConfig,
        matchers: Vec<Box<dyn OperationMatcher>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, matchers, pending: Mutex::new(Vec::new()) })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Classify a batch of events
    ///
    /// Sorts, clusters by time window, runs the matcher chain per cluster,
    /// and drops results below the confidence floor. Empty input yields an
    /// empty result; event content never causes an error.
    pub fn detect(&self, events: &[FileEvent]) -> Vec<FileOperation> {
        if events.is_empty() {
            return Vec::new();
        }

        group_events_by_time(events, self.config.time_window)
            .iter()
            .filter_map(|group| self.detect_in_group(group))
            .collect()
    }

    /// Run the matcher chain over one time-ordered cluster
    fn detect_in_group(&self, group: &[FileEvent]) -> Option<FileOperation> {
        if is_pure_temp_churn(group) {
            trace!(events = group.len(), "suppressing pure temp churn");
            return None;
        }

        for matcher in &self.matchers {
            let Some(operation) = matcher.matches(group) else { continue };

            if operation.confidence < self.config.min_confidence {
                trace!(
                    matcher = matcher.name(),
                    confidence = operation.confidence,
                    "match below confidence floor"
                );
                continue;
            }
            // Hard gate: a temp primary path is never a valid result
            if is_temp_file(&operation.primary_path) {
                debug!(
                    matcher = matcher.name(),
                    path = %operation.primary_path.display(),
                    "discarding operation with temp primary path"
                );
                continue;
            }

            debug!(
                matcher = matcher.name(),
                path = %operation.primary_path.display(),
                confidence = operation.confidence,
                "operation detected"
            );
            return Some(operation);
        }
        None
    }

    /// Feed one event through the streaming buffer
    ///
    /// When the new event lands more than the time window after the
    /// buffered earliest event, the buffer is flushed through the matcher
    /// chain and reseeded with the new event. Returns the flushed
    /// operation, if any; `None` while still buffering.
    pub fn detect_streaming(&self, event: FileEvent) -> Option<FileOperation> {
        let drained = {
            let mut pending = self.pending.lock();
            let expired = pending.first().is_some_and(|first| {
                event
                    .timestamp()
                    .duration_since(first.timestamp())
                    .unwrap_or_default()
                    > self.config.time_window
            });
            if expired {
                let drained = std::mem::take(&mut *pending);
                pending.push(event);
                drained
            } else {
                pending.push(event);
                return None;
            }
        };

        self.detect(&drained).into_iter().next()
    }

    /// Force-process whatever the streaming buffer holds (e.g. on shutdown)
    pub fn flush(&self) -> Vec<FileOperation> {
        let drained = std::mem::take(&mut *self.pending.lock());
        if drained.is_empty() {
            return Vec::new();
        }
        self.detect(&drained)
    }

    /// Snapshot of the streaming buffer
    pub fn pending_events(&self) -> Vec<FileEvent> {
        self.pending.lock().clone()
    }
}
