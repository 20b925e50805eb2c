//! Tag decoders
//!
//! A [`TagDecoder`] turns raw file bytes into a [`TagBag`]. Binary container
//! parsing is delegated to `kamadak-exif`; [`JsonDecoder`] accepts tag dumps
//! that were decoded elsewhere (ExifReader or `exiftool -j` output).

use async_trait::async_trait;
use exif::{Context, Field, In, Tag, Value};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tracing::debug;

use crate::error::DecodeError;
use crate::gps::convert_coordinate;
use crate::tag_bag::{RawValue, TagBag, TagMap, TagValue};

/// Tags whose numeric code is more useful than the decoder's prose.
const CODE_VALUED_TAGS: &[Tag] = &[Tag::Orientation];

/// DMS rational triples described as unsigned decimal degrees.
const DEGREE_TAGS: &[Tag] = &[
    Tag::GPSLatitude,
    Tag::GPSLongitude,
    Tag::GPSDestLatitude,
    Tag::GPSDestLongitude,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Group tags under `ifd0`, `ifd1`, `exif`, `gps`, `interop`
    pub expand_namespaces: bool,
    /// Keep tags the decoder has no name for
    pub include_unrecognized: bool,
    /// Return whatever parsed before the first error
    pub best_effort_recovery: bool,
    /// Use tag names instead of hex ids as keys
    pub translate_keys: bool,
    /// Attach human-readable descriptions
    pub translate_values: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            expand_namespaces: true,
            include_unrecognized: true,
            best_effort_recovery: true,
            translate_keys: true,
            translate_values: true,
        }
    }
}

#[async_trait]
pub trait TagDecoder: Send + Sync {
    async fn decode(&self, bytes: Vec<u8>, options: DecodeOptions) -> Result<TagBag, DecodeError>;

    fn name(&self) -> &'static str;
}

// ============================================================================
// kamadak-exif backend
// ============================================================================

/// EXIF decoder backed by kamadak-exif. Parsing runs on the blocking pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExifDecoder;

#[async_trait]
impl TagDecoder for ExifDecoder {
    async fn decode(&self, bytes: Vec<u8>, options: DecodeOptions) -> Result<TagBag, DecodeError> {
        tokio::task::spawn_blocking(move || decode_exif(&bytes, &options))
            .await
            .map_err(|e| DecodeError::Task(e.to_string()))?
    }

    fn name(&self) -> &'static str {
        "kamadak-exif"
    }
}

/// Synchronous EXIF decode.
pub fn decode_exif(bytes: &[u8], options: &DecodeOptions) -> Result<TagBag, DecodeError> {
    let mut reader = exif::Reader::new();
    reader.continue_on_error(options.best_effort_recovery);

    let mut result = reader.read_from_container(&mut Cursor::new(bytes));
    if options.best_effort_recovery {
        result = result.or_else(|e| {
            e.distill_partial_result(|errors| {
                for err in errors {
                    debug!("Recovered from EXIF error: {}", err);
                }
            })
        });
    }
    let exif_data = result.map_err(|e| DecodeError::Malformed(e.to_string()))?;

    let mut root = TagMap::new();
    let mut namespaces: Vec<(&'static str, TagMap)> = Vec::new();

    for field in exif_data.fields() {
        if !options.include_unrecognized && field.tag.description().is_none() {
            continue;
        }
        let key = tag_key(field.tag, options);
        let entry = tag_entry(field, options);

        if field.ifd_num == In::PRIMARY {
            root.insert(key.clone(), entry.clone());
        }
        if options.expand_namespaces {
            let name = namespace(field);
            match namespaces.iter_mut().find(|(ns, _)| *ns == name) {
                Some((_, map)) => {
                    map.insert(key, entry);
                }
                None => {
                    let mut map = TagMap::new();
                    map.insert(key, entry);
                    namespaces.push((name, map));
                }
            }
        }
    }

    for (name, map) in namespaces {
        root.insert(name.to_string(), TagValue::Nested(map));
    }
    Ok(TagBag::new(root))
}

fn tag_key(tag: Tag, options: &DecodeOptions) -> String {
    if options.translate_keys && tag.description().is_some() {
        tag.to_string()
    } else {
        format!("0x{:04x}", tag.number())
    }
}

fn namespace(field: &Field) -> &'static str {
    if field.ifd_num != In::PRIMARY {
        return "ifd1";
    }
    match field.tag.context() {
        Context::Tiff => "ifd0",
        Context::Exif => "exif",
        Context::Gps => "gps",
        Context::Interop => "interop",
        #[allow(unreachable_patterns)]
        _ => "ifd0",
    }
}

fn tag_entry(field: &Field, options: &DecodeOptions) -> TagValue {
    let value = typed_value(&field.value).map(Box::new);
    let description = if !options.translate_values {
        None
    } else if CODE_VALUED_TAGS.contains(&field.tag) {
        value.as_deref().and_then(code_text)
    } else if DEGREE_TAGS.contains(&field.tag) {
        value.as_deref().and_then(degree_text)
    } else {
        let text = field.display_value().to_string();
        let text = text.trim().trim_matches('"').trim().to_string();
        (!text.is_empty()).then_some(text)
    };
    TagValue::Described { description, value }
}

fn code_text(value: &TagValue) -> Option<String> {
    match value {
        TagValue::Scalar(crate::tag_bag::Scalar::Number(n)) => Some(format!("{}", n)),
        _ => None,
    }
}

fn degree_text(value: &TagValue) -> Option<String> {
    let raw = RawValue::locate_typed(value)?;
    convert_coordinate(&raw).map(|degrees| degrees.to_string())
}

/// kamadak value → tag value. Single-element vectors collapse to scalars.
fn typed_value(value: &Value) -> Option<TagValue> {
    fn numbers<I: IntoIterator<Item = f64>>(items: I) -> Option<TagValue> {
        let mut values: Vec<TagValue> = items.into_iter().map(TagValue::number).collect();
        match values.len() {
            0 => None,
            1 => values.pop(),
            _ => Some(TagValue::Array(values)),
        }
    }

    match value {
        Value::Ascii(lines) => {
            let mut texts: Vec<TagValue> = lines
                .iter()
                .map(|l| String::from_utf8_lossy(l).trim_end_matches('\0').trim().to_string())
                .filter(|s| !s.is_empty())
                .map(TagValue::text)
                .collect();
            match texts.len() {
                0 => None,
                1 => texts.pop(),
                _ => Some(TagValue::Array(texts)),
            }
        }
        Value::Byte(v) => numbers(v.iter().map(|&x| x as f64)),
        Value::Short(v) => numbers(v.iter().map(|&x| x as f64)),
        Value::Long(v) => numbers(v.iter().map(|&x| x as f64)),
        Value::SByte(v) => numbers(v.iter().map(|&x| x as f64)),
        Value::SShort(v) => numbers(v.iter().map(|&x| x as f64)),
        Value::SLong(v) => numbers(v.iter().map(|&x| x as f64)),
        Value::Float(v) => numbers(v.iter().map(|&x| x as f64)),
        Value::Double(v) => numbers(v.iter().copied()),
        Value::Rational(v) => numbers(v.iter().map(|r| r.to_f64())),
        Value::SRational(v) => numbers(v.iter().map(|r| r.to_f64())),
        Value::Undefined(..) | Value::Unknown(..) => None,
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

// ============================================================================
// JSON tag dumps
// ============================================================================

/// Decodes a JSON tag dump. Options do not apply: the dump is taken as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonDecoder;

#[async_trait]
impl TagDecoder for JsonDecoder {
    async fn decode(&self, bytes: Vec<u8>, _options: DecodeOptions) -> Result<TagBag, DecodeError> {
        let value: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| DecodeError::Malformed(e.to_string()))?;
        TagBag::from_json(&value)
            .ok_or_else(|| DecodeError::Malformed("tag dump is not an object".to_string()))
    }

    fn name(&self) -> &'static str {
        "json"
    }
}
