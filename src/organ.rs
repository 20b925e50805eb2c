//! Organ interface for photo_meta
//!
//! Exposes metadata extraction through the Stimulus/Response pattern so an
//! orchestrator can discover and invoke it.
//!
//! ## Available Operations
//!
//! 1. `metadata.extract` - Extract metadata from one image file
//! 2. `metadata.extract_batch` - Extract many files concurrently, keyed by id
//! 3. `metadata.resolve_tags` - Resolve an already-decoded tag dump
//! 4. `metadata.capabilities` - Capability card query
//! 5. `metadata.metrics` - Counter snapshot
//!
//! ## Example
//!
//! ```rust,no_run
//! use photo_meta::organ::{MetadataOrgan, Organ, Stimulus};
//! use serde_json::json;
//! use std::collections::HashMap;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let organ = MetadataOrgan::new();
//!
//! let card = organ.describe();
//! println!("Organ: {} v{}", card.name, card.version);
//!
//! let response = organ.stimulate(Stimulus {
//!     op: "metadata.extract".to_string(),
//!     input: json!({"path": "IMG_0042.jpg"}),
//!     context: HashMap::new(),
//! }).await?;
//! println!("{}", response.output);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::error::MetaError;
use crate::extractor::{Extractor, ExtractorConfig};
use crate::metadata::resolve_metadata;
use crate::metrics::{Metrics, Timer};
use crate::observer::{ExtractionEvent, ExtractionObserver, Observers, TracingObserver};
use crate::tag_bag::TagBag;
use crate::validation::validate_input;

/// Stimulus - input to organ operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stimulus {
    pub op: String,
    pub input: Value,
    #[serde(default)]
    pub context: HashMap<String, String>,
}

/// Response - output from organ operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,
    pub output: Value,
    pub latency_ms: u64,
    pub cost: Option<f64>,
}

#[async_trait]
pub trait Organ: Send + Sync {
    async fn stimulate(&self, stimulus: Stimulus) -> Result<Response, OrganError>;
    fn describe(&self) -> OrganCard;
}

/// Organ-level errors
#[derive(Debug, Error)]
pub enum OrganError {
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Processing error: {0}")]
    ProcessingError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl OrganError {
    fn kind(&self) -> &'static str {
        match self {
            OrganError::UnsupportedOperation(_) => "UnsupportedOperation",
            OrganError::InvalidInput(_) => "InvalidInput",
            OrganError::ProcessingError(_) => "ProcessingError",
            OrganError::SerializationError(_) => "SerializationError",
        }
    }
}

impl From<MetaError> for OrganError {
    fn from(e: MetaError) -> Self {
        match e {
            MetaError::Validation(msg) => OrganError::InvalidInput(msg),
            MetaError::Serialization(e) => OrganError::SerializationError(e),
            other => OrganError::ProcessingError(other.to_string()),
        }
    }
}

/// Organ capability card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganCard {
    pub name: String,
    pub version: String,
    pub description: String,
    pub division: String,
    pub subsystem: String,
    pub tags: Vec<String>,
    pub execution_modes: Vec<String>,
    pub functions: Vec<FunctionCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

/// Function capability card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCard {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub examples: Vec<String>,
    pub idempotent: bool,
    pub side_effects: Vec<String>,
    pub input_schema: Option<Value>,
    pub output_schema: Value,
}

const OPERATIONS: &[&str] = &[
    "metadata.extract",
    "metadata.extract_batch",
    "metadata.resolve_tags",
    "metadata.capabilities",
    "metadata.metrics",
];

/// Image metadata organ
pub struct MetadataOrgan {
    extractor: Extractor,
    observers: Observers,
    metrics: Arc<Metrics>,
}

impl MetadataOrgan {
    pub fn new() -> Self {
        Self::with_config(ExtractorConfig::default())
    }

    pub fn with_config(config: ExtractorConfig) -> Self {
        Self::with_extractor(Extractor::new(config))
    }

    /// Wrap an existing extractor; the organ adds its own metrics observer.
    pub fn with_extractor(extractor: Extractor) -> Self {
        let metrics = Metrics::new();
        let extractor = extractor.with_observer(metrics.clone());
        let mut observers = Observers::new();
        observers.push(Arc::new(TracingObserver));
        observers.push(metrics.clone());
        Self {
            extractor,
            observers,
            metrics,
        }
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Handle metadata.extract operation
    async fn handle_extract(&self, input: Value) -> Result<Value, OrganError> {
        let path = input["path"]
            .as_str()
            .ok_or_else(|| OrganError::InvalidInput("Missing path".to_string()))?;

        let meta = self.extractor.extract_path(path).await;
        Ok(serde_json::to_value(&meta)?)
    }

    /// Handle metadata.extract_batch operation
    async fn handle_extract_batch(&self, input: Value) -> Result<Value, OrganError> {
        let files = input["files"]
            .as_array()
            .ok_or_else(|| OrganError::InvalidInput("Missing files".to_string()))?;

        let mut items = Vec::with_capacity(files.len());
        for file in files {
            let id = match &file["id"] {
                Value::String(s) => s.clone(),
                Value::Null => return Err(OrganError::InvalidInput("Missing id".to_string())),
                other => other.to_string(),
            };
            let path = file["path"]
                .as_str()
                .ok_or_else(|| OrganError::InvalidInput(format!("Missing path for {}", id)))?;
            items.push((id, PathBuf::from(path)));
        }

        let count = items.len();
        let results = self.extractor.extract_batch(items).await;
        debug!("Batch of {} files extracted", count);

        let mut output = Map::with_capacity(results.len());
        for (id, meta) in results {
            output.insert(id, serde_json::to_value(&meta)?);
        }
        Ok(Value::Object(output))
    }

    /// Handle metadata.resolve_tags operation
    fn handle_resolve_tags(&self, input: Value) -> Result<Value, OrganError> {
        let file_name = input["file_name"]
            .as_str()
            .ok_or_else(|| OrganError::InvalidInput("Missing file_name".to_string()))?;
        let bag = TagBag::from_json(&input["tags"])
            .ok_or_else(|| OrganError::InvalidInput("tags must be an object".to_string()))?;

        let meta = resolve_metadata(file_name, &bag, &self.observers);
        self.observers.on_event(&ExtractionEvent::Completed {
            file_name,
            fields_present: meta.present_fields(),
            elapsed_ms: 0,
        });
        Ok(serde_json::to_value(&meta)?)
    }

    /// Handle metadata.capabilities operation
    fn handle_capabilities(&self) -> Result<Value, OrganError> {
        let card = self.describe();
        serde_json::to_value(&card).map_err(OrganError::SerializationError)
    }

    fn function(&self, op: &str) -> Option<FunctionCard> {
        self.describe().functions.into_iter().find(|f| f.name == op)
    }

    async fn dispatch(&self, op: &str, input: Value) -> Result<Value, OrganError> {
        let function = self
            .function(op)
            .ok_or_else(|| OrganError::UnsupportedOperation(op.to_string()))?;
        if let Some(schema) = &function.input_schema {
            validate_input(&input, schema)?;
        }

        match op {
            "metadata.extract" => self.handle_extract(input).await,
            "metadata.extract_batch" => self.handle_extract_batch(input).await,
            "metadata.resolve_tags" => self.handle_resolve_tags(input),
            "metadata.capabilities" => self.handle_capabilities(),
            "metadata.metrics" => Ok(serde_json::to_value(self.metrics.snapshot())?),
            _ => Err(OrganError::UnsupportedOperation(op.to_string())),
        }
    }
}

impl Default for MetadataOrgan {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Organ for MetadataOrgan {
    async fn stimulate(&self, stimulus: Stimulus) -> Result<Response, OrganError> {
        let timer = Timer::new();
        let result = self.dispatch(&stimulus.op, stimulus.input).await;
        let latency = timer.elapsed_ms();
        self.metrics.record_request(result.is_ok(), latency);

        let (ok, output) = match result {
            Ok(output) => (true, output),
            Err(e @ OrganError::UnsupportedOperation(_)) => (
                false,
                json!({
                    "error": e.kind(),
                    "op": stimulus.op,
                    "available_operations": OPERATIONS,
                }),
            ),
            Err(e) => (
                false,
                json!({
                    "error": e.kind(),
                    "message": e.to_string(),
                }),
            ),
        };

        Ok(Response {
            ok,
            output,
            latency_ms: latency,
            cost: None,
        })
    }

    fn describe(&self) -> OrganCard {
        let metadata_schema = json!({
            "type": "object",
            "properties": {
                "fileName": { "type": "string" },
                "dateTime": { "type": "string" },
                "make": { "type": "string" },
                "model": { "type": "string" },
                "exposure": { "type": "string" },
                "fNumber": { "type": "number" },
                "iso": { "type": "integer" },
                "focalLength": { "type": "number" },
                "software": { "type": "string" },
                "orientation": { "type": "integer" },
                "resolution": { "type": "string" },
                "whiteBalance": { "type": "string" },
                "flash": { "type": "string" },
                "lens": { "type": "string" },
                "gps": {
                    "type": "object",
                    "properties": {
                        "latitude": { "type": "number" },
                        "longitude": { "type": "number" }
                    }
                }
            },
            "required": ["fileName"]
        });

        OrganCard {
            name: "photo_meta".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Photographic metadata normalization: camera, exposure and GPS fields from heterogeneous EXIF/XMP/maker-note tags".to_string(),
            division: "media".to_string(),
            subsystem: "metadata".to_string(),
            tags: vec![
                "media".to_string(),
                "image".to_string(),
                "metadata".to_string(),
                "exif".to_string(),
                "xmp".to_string(),
                "gps".to_string(),
            ],
            execution_modes: vec![
                "embedded".to_string(),
                "sidecar".to_string(),
                "server".to_string(),
            ],
            author: None,
            repository: None,
            functions: vec![
                FunctionCard {
                    name: "metadata.extract".to_string(),
                    description: "Decode an image file's tags and return its normalized metadata record".to_string(),
                    tags: vec!["image".to_string(), "exif".to_string(), "extraction".to_string()],
                    examples: vec![
                        "Read camera model and capture time from a JPEG".to_string(),
                        "Locate where an iPhone HEIC was taken".to_string(),
                    ],
                    idempotent: true,
                    side_effects: vec!["reads image file".to_string()],
                    input_schema: Some(json!({
                        "type": "object",
                        "properties": {
                            "path": { "type": "string", "description": "Path to the image file" }
                        },
                        "required": ["path"]
                    })),
                    output_schema: metadata_schema.clone(),
                },
                FunctionCard {
                    name: "metadata.extract_batch".to_string(),
                    description: "Extract metadata for many files concurrently; results keyed by caller id".to_string(),
                    tags: vec!["image".to_string(), "batch".to_string(), "extraction".to_string()],
                    examples: vec![
                        "Index an album of photos in one call".to_string(),
                    ],
                    idempotent: true,
                    side_effects: vec!["reads image files".to_string()],
                    input_schema: Some(json!({
                        "type": "object",
                        "properties": {
                            "files": {
                                "type": "array",
                                "description": "Files to extract",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "path": { "type": "string" }
                                    },
                                    "required": ["id", "path"]
                                }
                            }
                        },
                        "required": ["files"]
                    })),
                    output_schema: json!({
                        "type": "object",
                        "additionalProperties": metadata_schema.clone()
                    }),
                },
                FunctionCard {
                    name: "metadata.resolve_tags".to_string(),
                    description: "Resolve a tag dump decoded elsewhere (ExifReader or exiftool JSON) into a metadata record".to_string(),
                    tags: vec!["metadata".to_string(), "normalization".to_string(), "gps".to_string()],
                    examples: vec![
                        "Normalize tags already parsed in a browser".to_string(),
                        "Resolve GPS from vendor maker notes".to_string(),
                    ],
                    idempotent: true,
                    side_effects: vec![],
                    input_schema: Some(json!({
                        "type": "object",
                        "properties": {
                            "file_name": { "type": "string", "description": "Name reported in the record" },
                            "tags": { "type": "object", "description": "Decoded tag bag" }
                        },
                        "required": ["file_name", "tags"]
                    })),
                    output_schema: metadata_schema,
                },
                FunctionCard {
                    name: "metadata.capabilities".to_string(),
                    description: "Return organ capability card with all available functions".to_string(),
                    tags: vec!["metadata".to_string(), "discovery".to_string(), "mcp".to_string()],
                    examples: vec![
                        "Discover available metadata operations".to_string(),
                    ],
                    idempotent: true,
                    side_effects: vec![],
                    input_schema: None,
                    output_schema: json!({
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "version": { "type": "string" },
                            "functions": { "type": "array" }
                        }
                    }),
                },
                FunctionCard {
                    name: "metadata.metrics".to_string(),
                    description: "Return request and extraction counters".to_string(),
                    tags: vec!["metrics".to_string(), "observability".to_string()],
                    examples: vec![
                        "Check how many decodes timed out".to_string(),
                    ],
                    idempotent: true,
                    side_effects: vec![],
                    input_schema: None,
                    output_schema: json!({
                        "type": "object",
                        "properties": {
                            "total_requests": { "type": "integer" },
                            "extraction": { "type": "object" },
                            "gps": { "type": "object" }
                        }
                    }),
                },
            ],
        }
    }
}
