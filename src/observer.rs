//! Extraction observability hook
//!
//! The pipeline reports milestones as [`ExtractionEvent`]s to any number of
//! [`ExtractionObserver`]s. [`TracingObserver`] forwards them to `tracing`;
//! [`crate::metrics::Metrics`] counts them.

use std::sync::Arc;
use tracing::{debug, info, trace, warn};

use crate::error::Degradation;
use crate::gps::{GeoCoordinate, GpsStrategy};

#[derive(Debug, Clone, Copy)]
pub enum ExtractionEvent<'a> {
    DecodeStarted { file_name: &'a str, bytes: usize },
    TagsDecoded { file_name: &'a str, top_level_keys: usize },
    Degraded { file_name: &'a str, kind: Degradation, detail: &'a str },
    GpsResolved { file_name: &'a str, strategy: GpsStrategy, coordinate: GeoCoordinate },
    ReadFailed { file_name: &'a str, error: &'a str },
    Completed { file_name: &'a str, fields_present: usize, elapsed_ms: u64 },
}

pub trait ExtractionObserver: Send + Sync {
    fn on_event(&self, event: &ExtractionEvent<'_>);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl ExtractionObserver for NullObserver {
    fn on_event(&self, _event: &ExtractionEvent<'_>) {}
}

/// Structured log records at each milestone.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ExtractionObserver for TracingObserver {
    fn on_event(&self, event: &ExtractionEvent<'_>) {
        match *event {
            ExtractionEvent::DecodeStarted { file_name, bytes } => {
                debug!(file = file_name, bytes, "decoding tags");
            }
            ExtractionEvent::TagsDecoded { file_name, top_level_keys } => {
                trace!(file = file_name, top_level_keys, "tag bag decoded");
            }
            ExtractionEvent::Degraded { file_name, kind, detail } => match kind {
                Degradation::DecodeTimeout | Degradation::DecodeFailure => {
                    warn!(file = file_name, kind = kind.as_str(), detail, "metadata degraded");
                }
                _ => debug!(file = file_name, kind = kind.as_str(), detail, "metadata degraded"),
            },
            ExtractionEvent::GpsResolved { file_name, strategy, coordinate } => {
                debug!(
                    file = file_name,
                    strategy = strategy.as_str(),
                    latitude = coordinate.latitude,
                    longitude = coordinate.longitude,
                    "gps resolved"
                );
            }
            ExtractionEvent::ReadFailed { file_name, error } => {
                warn!(file = file_name, error, "could not read file");
            }
            ExtractionEvent::Completed { file_name, fields_present, elapsed_ms } => {
                info!(file = file_name, fields_present, elapsed_ms, "metadata extracted");
            }
        }
    }
}

/// Fan-out to several observers, in registration order.
#[derive(Clone, Default)]
pub struct Observers {
    inner: Vec<Arc<dyn ExtractionObserver>>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, observer: Arc<dyn ExtractionObserver>) {
        self.inner.push(observer);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl ExtractionObserver for Observers {
    fn on_event(&self, event: &ExtractionEvent<'_>) {
        for observer in &self.inner {
            observer.on_event(event);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records a short label per event.
    #[derive(Default)]
    pub struct RecordingObserver {
        pub events: Mutex<Vec<String>>,
    }

    impl RecordingObserver {
        pub fn labels(&self) -> Vec<String> {
            self.events.lock().map(|e| e.clone()).unwrap_or_default()
        }
    }

    impl ExtractionObserver for RecordingObserver {
        fn on_event(&self, event: &ExtractionEvent<'_>) {
            let label = match event {
                ExtractionEvent::DecodeStarted { .. } => "decode_started".to_string(),
                ExtractionEvent::TagsDecoded { .. } => "tags_decoded".to_string(),
                ExtractionEvent::Degraded { kind, detail, .. } => format!("degraded:{}:{}", kind, detail),
                ExtractionEvent::GpsResolved { strategy, .. } => format!("gps:{}", strategy),
                ExtractionEvent::ReadFailed { .. } => "read_failed".to_string(),
                ExtractionEvent::Completed { .. } => "completed".to_string(),
            };
            if let Ok(mut events) = self.events.lock() {
                events.push(label);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingObserver;
    use super::*;

    #[test]
    fn test_fan_out_preserves_order() {
        let first = Arc::new(RecordingObserver::default());
        let second = Arc::new(RecordingObserver::default());
        let mut observers = Observers::new();
        observers.push(first.clone());
        observers.push(second.clone());
        observers.push(Arc::new(TracingObserver));

        observers.on_event(&ExtractionEvent::DecodeStarted { file_name: "a.jpg", bytes: 3 });
        observers.on_event(&ExtractionEvent::Completed { file_name: "a.jpg", fields_present: 0, elapsed_ms: 1 });

        assert_eq!(observers.len(), 3);
        assert_eq!(first.labels(), vec!["decode_started", "completed"]);
        assert_eq!(second.labels(), first.labels());
    }
}
