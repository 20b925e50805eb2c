//! Metrics and observability for photo_meta

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::error::Degradation;
use crate::gps::GpsStrategy;
use crate::observer::{ExtractionEvent, ExtractionObserver};

/// Extraction and request counters. Register as an observer to count
/// extraction outcomes; call [`Metrics::record_request`] per service call.
#[derive(Default)]
pub struct Metrics {
    pub total_requests: AtomicU64,
    pub successful_requests: AtomicU64,
    pub failed_requests: AtomicU64,
    pub total_latency_ms: AtomicU64,

    pub files_extracted: AtomicU64,
    pub empty_records: AtomicU64,
    pub read_failures: AtomicU64,
    pub decode_timeouts: AtomicU64,
    pub decode_failures: AtomicU64,
    pub empty_tag_bags: AtomicU64,
    pub field_parse_failures: AtomicU64,
    pub invalid_coordinates: AtomicU64,

    // Indexed like GpsStrategy::ALL
    gps_by_strategy: [AtomicU64; 5],
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_request(&self, success: bool, latency_ms: u64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);

        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }

        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
    }

    fn record_degradation(&self, kind: Degradation) {
        let counter = match kind {
            Degradation::DecodeTimeout => &self.decode_timeouts,
            Degradation::DecodeFailure => &self.decode_failures,
            Degradation::EmptyTagBag => &self.empty_tag_bags,
            Degradation::FieldParseFailure => &self.field_parse_failures,
            Degradation::InvalidCoordinate => &self.invalid_coordinates,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn record_gps(&self, strategy: GpsStrategy) {
        if let Some(i) = GpsStrategy::ALL.iter().position(|s| *s == strategy) {
            self.gps_by_strategy[i].fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let total = self.total_requests.load(Ordering::Relaxed);
        let failed = self.failed_requests.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);
        let gps = |strategy: GpsStrategy| {
            GpsStrategy::ALL
                .iter()
                .position(|s| *s == strategy)
                .map(|i| self.gps_by_strategy[i].load(Ordering::Relaxed))
                .unwrap_or(0)
        };

        MetricsSnapshot {
            total_requests: total,
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: failed,
            error_rate: if total > 0 { failed as f64 / total as f64 } else { 0.0 },
            avg_latency_ms: if total > 0 { total_latency / total } else { 0 },
            extraction: ExtractionMetrics {
                files_extracted: self.files_extracted.load(Ordering::Relaxed),
                empty_records: self.empty_records.load(Ordering::Relaxed),
                read_failures: self.read_failures.load(Ordering::Relaxed),
                decode_timeouts: self.decode_timeouts.load(Ordering::Relaxed),
                decode_failures: self.decode_failures.load(Ordering::Relaxed),
                empty_tag_bags: self.empty_tag_bags.load(Ordering::Relaxed),
                field_parse_failures: self.field_parse_failures.load(Ordering::Relaxed),
                invalid_coordinates: self.invalid_coordinates.load(Ordering::Relaxed),
            },
            gps: GpsMetrics {
                vendor_location: gps(GpsStrategy::VendorLocation),
                xmp_location: gps(GpsStrategy::XmpLocation),
                standard_exif: gps(GpsStrategy::StandardExif),
                nested_container: gps(GpsStrategy::NestedContainer),
                coordinate_array: gps(GpsStrategy::CoordinateArray),
            },
        }
    }
}

impl ExtractionObserver for Metrics {
    fn on_event(&self, event: &ExtractionEvent<'_>) {
        match *event {
            ExtractionEvent::Degraded { kind, .. } => self.record_degradation(kind),
            ExtractionEvent::GpsResolved { strategy, .. } => self.record_gps(strategy),
            ExtractionEvent::ReadFailed { .. } => {
                self.read_failures.fetch_add(1, Ordering::Relaxed);
                self.files_extracted.fetch_add(1, Ordering::Relaxed);
                self.empty_records.fetch_add(1, Ordering::Relaxed);
            }
            ExtractionEvent::Completed { fields_present, .. } => {
                self.files_extracted.fetch_add(1, Ordering::Relaxed);
                if fields_present == 0 {
                    self.empty_records.fetch_add(1, Ordering::Relaxed);
                }
            }
            ExtractionEvent::DecodeStarted { .. } | ExtractionEvent::TagsDecoded { .. } => {}
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub error_rate: f64,
    pub avg_latency_ms: u64,
    pub extraction: ExtractionMetrics,
    pub gps: GpsMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionMetrics {
    pub files_extracted: u64,
    pub empty_records: u64,
    pub read_failures: u64,
    pub decode_timeouts: u64,
    pub decode_failures: u64,
    pub empty_tag_bags: u64,
    pub field_parse_failures: u64,
    pub invalid_coordinates: u64,
}

/// Coordinates resolved, per winning strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpsMetrics {
    pub vendor_location: u64,
    pub xmp_location: u64,
    pub standard_exif: u64,
    pub nested_container: u64,
    pub coordinate_array: u64,
}

/// Timer for tracking operation latency
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
