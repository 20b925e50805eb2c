//! Canonical image metadata
//!
//! Builds an [`ImageMetadata`] record from a [`TagBag`]. Each field is
//! resolved and normalized independently; a failure in one never affects
//! another.
//!
//! ## Example
//!
//! ```rust
//! use photo_meta::metadata::ImageMetadata;
//! use photo_meta::tag_bag::TagBag;
//! use serde_json::json;
//!
//! let tags = TagBag::from_json(&json!({
//!     "Make": "Apple",
//!     "Model": "iPhone 13",
//!     "ExposureTime": 0.002,
//! })).unwrap();
//!
//! let meta = ImageMetadata::from_tags("IMG_0001.HEIC", &tags);
//! assert_eq!(meta.model.as_deref(), Some("Apple iPhone 13"));
//! assert_eq!(meta.exposure.as_deref(), Some("1/500"));
//! ```

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::Degradation;
use crate::gps::{resolve_gps_detailed, GeoCoordinate};
use crate::normalize;
use crate::observer::{ExtractionEvent, ExtractionObserver, NullObserver};
use crate::resolver::{fields, resolve};
use crate::tag_bag::{RawValue, TagBag};

/// Normalized metadata for one image. Only `file_name` is guaranteed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    pub file_name: String,

    /// Capture timestamp as found in the tags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,

    /// Prefixed with `make` unless it already contains it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Exposure time, e.g. `1/500`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub f_number: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso: Option<u32>,

    /// Millimetres
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focal_length: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub software: Option<String>,

    /// EXIF orientation code (1-8)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<u32>,

    /// `"<width> x <height>"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub white_balance: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lens: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gps: Option<GeoCoordinate>,
}

impl ImageMetadata {
    /// The record returned when nothing could be extracted.
    pub fn fallback(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Default::default()
        }
    }

    pub fn from_tags(file_name: &str, bag: &TagBag) -> Self {
        resolve_metadata(file_name, bag, &NullObserver)
    }

    /// Number of optional fields that resolved.
    pub fn present_fields(&self) -> usize {
        [
            self.date_time.is_some(),
            self.make.is_some(),
            self.model.is_some(),
            self.exposure.is_some(),
            self.f_number.is_some(),
            self.iso.is_some(),
            self.focal_length.is_some(),
            self.software.is_some(),
            self.orientation.is_some(),
            self.resolution.is_some(),
            self.white_balance.is_some(),
            self.flash.is_some(),
            self.lens.is_some(),
            self.gps.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }

    /// True when only `file_name` is set.
    pub fn is_empty(&self) -> bool {
        self.present_fields() == 0
    }

    /// Parse `date_time` (EXIF `YYYY:MM:DD HH:MM:SS`, ISO 8601 or RFC 3339).
    pub fn captured_at(&self) -> Option<NaiveDateTime> {
        let raw = self.date_time.as_deref()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_local());
        }
        [
            "%Y:%m:%d %H:%M:%S%.f",
            "%Y:%m:%d %H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
        ]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    }
}

/// Resolve every field of `bag`, reporting degradations to `observer`.
pub fn resolve_metadata(file_name: &str, bag: &TagBag, observer: &dyn ExtractionObserver) -> ImageMetadata {
    let report = |field: &str| {
        observer.on_event(&ExtractionEvent::Degraded {
            file_name,
            kind: Degradation::FieldParseFailure,
            detail: field,
        })
    };

    // Normalize a located value; a located value that does not normalize
    // is reported as a parse failure.
    fn field<T>(
        raw: Option<RawValue>,
        name: &str,
        convert: impl Fn(&RawValue) -> Option<T>,
        report: &dyn Fn(&str),
    ) -> Option<T> {
        let raw = raw?;
        let value = convert(&raw);
        if value.is_none() {
            report(name);
        }
        value
    }

    let make = resolve(bag, fields::MAKE).and_then(|v| normalize::text(&v));
    let model = resolve(bag, fields::MODEL).and_then(|v| normalize::text(&v));
    let model = normalize::merge_make_model(make.as_deref(), model);

    let width = resolve(bag, fields::WIDTH);
    let height = resolve(bag, fields::HEIGHT);
    let resolution = normalize::resolution(width.as_ref(), height.as_ref());
    if resolution.is_none() && (width.is_some() || height.is_some()) {
        report("resolution");
    }

    let gps = resolve_gps_detailed(bag);
    for rejected in &gps.rejected {
        let detail = format!(
            "{} ({}, {})",
            rejected.strategy, rejected.latitude, rejected.longitude
        );
        observer.on_event(&ExtractionEvent::Degraded {
            file_name,
            kind: Degradation::InvalidCoordinate,
            detail: &detail,
        });
    }
    if let (Some(coordinate), Some(strategy)) = (gps.coordinate, gps.strategy) {
        observer.on_event(&ExtractionEvent::GpsResolved { file_name, strategy, coordinate });
    }

    ImageMetadata {
        file_name: file_name.to_string(),
        date_time: resolve(bag, fields::DATE_TIME).and_then(|v| normalize::text(&v)),
        make,
        model,
        exposure: field(resolve(bag, fields::EXPOSURE), "exposure", normalize::exposure, &report),
        f_number: field(resolve(bag, fields::F_NUMBER), "fNumber", normalize::f_number, &report),
        iso: field(resolve(bag, fields::ISO), "iso", normalize::iso, &report),
        focal_length: field(resolve(bag, fields::FOCAL_LENGTH), "focalLength", normalize::focal_length, &report),
        software: resolve(bag, fields::SOFTWARE).and_then(|v| normalize::text(&v)),
        orientation: field(resolve(bag, fields::ORIENTATION), "orientation", normalize::orientation, &report),
        resolution,
        white_balance: resolve(bag, fields::WHITE_BALANCE).and_then(|v| normalize::text(&v)),
        flash: resolve(bag, fields::FLASH).and_then(|v| normalize::text(&v)),
        lens: resolve(bag, fields::LENS).and_then(|v| normalize::text(&v)),
        gps: gps.coordinate,
    }
}
