//! photo_meta - photographic metadata normalization
//!
//! Turns heterogeneous tag bags (EXIF, XMP, IPTC, vendor maker notes) into
//! one canonical [`ImageMetadata`] record per image, including a validated
//! GPS coordinate resolved from whichever vendor layout carries it.
//! Extraction never fails: anything undecodable degrades to `{fileName}`.

pub mod acquisition;
pub mod decoder;
pub mod error;
pub mod extractor;
pub mod gps;
pub mod metadata;
pub mod metrics;
pub mod normalize;
pub mod observer;
pub mod organ;
pub mod resolver;
pub mod tag_bag;
pub mod validation;

pub use decoder::{DecodeOptions, ExifDecoder, JsonDecoder, TagDecoder};
pub use error::{DecodeError, Degradation, MetaError, Result};
pub use extractor::{Extractor, ExtractorConfig};
pub use gps::{resolve_gps, GeoCoordinate, GpsStrategy};
pub use metadata::{resolve_metadata, ImageMetadata};
pub use observer::{ExtractionEvent, ExtractionObserver, NullObserver, Observers, TracingObserver};
pub use tag_bag::{RawValue, TagBag, TagValue};
