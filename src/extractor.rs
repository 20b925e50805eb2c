//! Per-file and batch extraction
//!
//! ## Example
//!
//! ```rust,no_run
//! use photo_meta::extractor::{Extractor, ExtractorConfig};
//! use std::path::PathBuf;
//!
//! # async fn example() {
//! let extractor = Extractor::new(ExtractorConfig::default());
//!
//! let meta = extractor.extract_path("IMG_0042.jpg").await;
//! println!("{:?} at {:?}", meta.model, meta.gps);
//!
//! let batch = extractor
//!     .extract_batch(vec![(1, PathBuf::from("a.jpg")), (2, PathBuf::from("b.heic"))])
//!     .await;
//! assert_eq!(batch.len(), 2);
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use crate::acquisition::{acquire, DEFAULT_DECODE_TIMEOUT};
use crate::decoder::{DecodeOptions, ExifDecoder, TagDecoder};
use crate::error::{MetaError, Result};
use crate::metadata::{resolve_metadata, ImageMetadata};
use crate::observer::{ExtractionEvent, ExtractionObserver, Observers, TracingObserver};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Budget for one decode call
    pub decode_timeout_ms: u64,
    /// Files decoded at once in a batch
    pub max_concurrency: usize,
    pub decode_options: DecodeOptions,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            decode_timeout_ms: DEFAULT_DECODE_TIMEOUT.as_millis() as u64,
            max_concurrency: 8,
            decode_options: DecodeOptions::default(),
        }
    }
}

impl ExtractorConfig {
    pub fn decode_timeout(&self) -> Duration {
        Duration::from_millis(self.decode_timeout_ms)
    }

    /// Load from a JSON file; missing keys take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.decode_timeout_ms == 0 {
            return Err(MetaError::Validation("decode_timeout_ms must be positive".to_string()));
        }
        if self.max_concurrency == 0 {
            return Err(MetaError::Validation("max_concurrency must be positive".to_string()));
        }
        Ok(())
    }
}

/// Decodes and resolves image metadata. Cheap to clone.
#[derive(Clone)]
pub struct Extractor {
    decoder: Arc<dyn TagDecoder>,
    observers: Observers,
    config: ExtractorConfig,
}

impl Extractor {
    /// kamadak-exif decoding with tracing diagnostics.
    pub fn new(config: ExtractorConfig) -> Self {
        let mut observers = Observers::new();
        observers.push(Arc::new(TracingObserver));
        Self {
            decoder: Arc::new(ExifDecoder),
            observers,
            config,
        }
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn TagDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ExtractionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn decoder_name(&self) -> &'static str {
        self.decoder.name()
    }

    /// Extract from bytes already in memory. Never fails: decoder problems
    /// degrade to a record holding only `file_name`.
    pub async fn extract_bytes(&self, file_name: &str, bytes: Vec<u8>) -> ImageMetadata {
        let start = Instant::now();
        let bag = acquire(
            self.decoder.as_ref(),
            file_name,
            bytes,
            self.config.decode_options,
            self.config.decode_timeout(),
            &self.observers,
        )
        .await;

        let meta = resolve_metadata(file_name, &bag, &self.observers);
        self.observers.on_event(&ExtractionEvent::Completed {
            file_name,
            fields_present: meta.present_fields(),
            elapsed_ms: start.elapsed().as_millis() as u64,
        });
        meta
    }

    /// Read and extract a file. An unreadable file yields `{fileName}`.
    pub async fn extract_path(&self, path: impl AsRef<Path>) -> ImageMetadata {
        let path = path.as_ref();
        let file_name = display_name(path);
        match tokio::fs::read(path).await {
            Ok(bytes) => self.extract_bytes(&file_name, bytes).await,
            Err(e) => {
                let error = e.to_string();
                self.observers.on_event(&ExtractionEvent::ReadFailed { file_name: &file_name, error: &error });
                ImageMetadata::fallback(file_name)
            }
        }
    }

    /// Extract many files with bounded, unordered concurrency. Results are
    /// keyed by the caller's identifiers.
    pub async fn extract_batch<K>(&self, items: Vec<(K, PathBuf)>) -> HashMap<K, ImageMetadata>
    where
        K: Eq + Hash + Clone + Send + 'static,
    {
        let permits = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut tasks = JoinSet::new();
        let mut pending: HashMap<K, String> = HashMap::with_capacity(items.len());

        for (key, path) in items {
            pending.insert(key.clone(), display_name(&path));
            let extractor = self.clone();
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                let meta = extractor.extract_path(&path).await;
                (key, meta)
            });
        }

        let mut results = HashMap::with_capacity(pending.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((key, meta)) => {
                    pending.remove(&key);
                    results.insert(key, meta);
                }
                Err(e) => warn!("Extraction task failed: {}", e),
            }
        }
        // A panicked task still gets its fallback record
        for (key, file_name) in pending {
            results.insert(key, ImageMetadata::fallback(file_name));
        }
        results
    }
}

/// File name component of a path, or the whole path if it has none.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::JsonDecoder;
    use crate::error::DecodeError;
    use crate::observer::testing::RecordingObserver;
    use crate::tag_bag::TagBag;
    use async_trait::async_trait;

    struct StalledDecoder;

    #[async_trait]
    impl TagDecoder for StalledDecoder {
        async fn decode(&self, _bytes: Vec<u8>, _options: DecodeOptions) -> std::result::Result<TagBag, DecodeError> {
            std::future::pending().await
        }

        fn name(&self) -> &'static str {
            "stalled"
        }
    }

    fn quick_config() -> ExtractorConfig {
        ExtractorConfig {
            decode_timeout_ms: 50,
            ..Default::default()
        }
    }

    #[test]
    fn test_config_defaults_and_partial_json() {
        let config = ExtractorConfig::default();
        assert_eq!(config.decode_timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());

        let config: ExtractorConfig = serde_json::from_str(r#"{"max_concurrency": 2}"#).unwrap();
        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.decode_timeout_ms, 10_000);
        assert!(config.decode_options.translate_values);

        let bad = ExtractorConfig { max_concurrency: 0, ..Default::default() };
        assert!(bad.validate().is_err());
    }

    #[tokio::test]
    async fn test_stalled_decoder_returns_file_name_only() {
        let extractor = Extractor::new(quick_config()).with_decoder(Arc::new(StalledDecoder));
        let meta = extractor.extract_bytes("never.jpg", vec![0xff, 0xd8]).await;
        assert_eq!(meta, ImageMetadata::fallback("never.jpg"));
    }

    #[tokio::test]
    async fn test_garbage_bytes_return_file_name_only() {
        let extractor = Extractor::new(quick_config());
        let meta = extractor.extract_bytes("noise.bin", b"definitely not an image".to_vec()).await;
        assert_eq!(meta, ImageMetadata::fallback("noise.bin"));

        let meta = extractor.extract_bytes("empty.jpg", Vec::new()).await;
        assert!(meta.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_returns_fallback() {
        let observer = Arc::new(RecordingObserver::default());
        let extractor = Extractor::new(quick_config()).with_observer(observer.clone());
        let meta = extractor.extract_path("/nonexistent/dir/IMG_1.jpg").await;
        assert_eq!(meta, ImageMetadata::fallback("IMG_1.jpg"));
        assert_eq!(observer.labels(), vec!["read_failed"]);
    }

    #[tokio::test]
    async fn test_json_dump_through_extractor() {
        let observer = Arc::new(RecordingObserver::default());
        let extractor = Extractor::new(quick_config())
            .with_decoder(Arc::new(JsonDecoder))
            .with_observer(observer.clone());
        let dump = br#"{"Make": "Xiaomi", "Model": "13T", "gps": {"Latitude": 41.39, "Longitude": 2.17}}"#;
        let meta = extractor.extract_bytes("dump.json", dump.to_vec()).await;

        assert_eq!(meta.model.as_deref(), Some("Xiaomi 13T"));
        assert!(meta.gps.is_some());
        assert_eq!(
            observer.labels(),
            vec!["decode_started", "tags_decoded", "gps:nested_container", "completed"]
        );
    }
}
