//! Tag bag acquisition
//!
//! Runs one decode per file against a time budget. Every failure mode of
//! the decoder ends here as an empty tag bag.

use std::time::Duration;

use crate::decoder::{DecodeOptions, TagDecoder};
use crate::error::Degradation;
use crate::observer::{ExtractionEvent, ExtractionObserver};
use crate::tag_bag::TagBag;

/// Default decode budget.
pub const DEFAULT_DECODE_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn acquire(
    decoder: &dyn TagDecoder,
    file_name: &str,
    bytes: Vec<u8>,
    options: DecodeOptions,
    timeout: Duration,
    observer: &dyn ExtractionObserver,
) -> TagBag {
    observer.on_event(&ExtractionEvent::DecodeStarted { file_name, bytes: bytes.len() });

    let degraded = |kind: Degradation, detail: &str| {
        observer.on_event(&ExtractionEvent::Degraded { file_name, kind, detail });
        TagBag::empty()
    };

    match tokio::time::timeout(timeout, decoder.decode(bytes, options)).await {
        Ok(Ok(bag)) if bag.is_empty() => degraded(Degradation::EmptyTagBag, decoder.name()),
        Ok(Ok(bag)) => {
            observer.on_event(&ExtractionEvent::TagsDecoded { file_name, top_level_keys: bag.len() });
            bag
        }
        Ok(Err(e)) => degraded(Degradation::DecodeFailure, &e.to_string()),
        Err(_) => degraded(
            Degradation::DecodeTimeout,
            &format!("{} ms", timeout.as_millis()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::JsonDecoder;
    use crate::error::DecodeError;
    use crate::observer::testing::RecordingObserver;
    use async_trait::async_trait;

    struct StalledDecoder;

    #[async_trait]
    impl TagDecoder for StalledDecoder {
        async fn decode(&self, _bytes: Vec<u8>, _options: DecodeOptions) -> Result<TagBag, DecodeError> {
            std::future::pending().await
        }

        fn name(&self) -> &'static str {
            "stalled"
        }
    }

    #[tokio::test]
    async fn test_timeout_yields_empty_bag() {
        let observer = RecordingObserver::default();
        let started = std::time::Instant::now();
        let bag = acquire(
            &StalledDecoder,
            "slow.jpg",
            vec![1, 2, 3],
            DecodeOptions::default(),
            Duration::from_millis(30),
            &observer,
        )
        .await;

        assert!(bag.is_empty());
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(observer.labels(), vec!["decode_started", "degraded:decode_timeout:30 ms"]);
    }

    #[tokio::test]
    async fn test_decode_failure_yields_empty_bag() {
        let observer = RecordingObserver::default();
        let bag = acquire(
            &JsonDecoder,
            "broken.json",
            b"{not json".to_vec(),
            DecodeOptions::default(),
            DEFAULT_DECODE_TIMEOUT,
            &observer,
        )
        .await;

        assert!(bag.is_empty());
        assert!(observer.labels()[1].starts_with("degraded:decode_failure:"));
    }

    #[tokio::test]
    async fn test_empty_result_is_reported() {
        let observer = RecordingObserver::default();
        let bag = acquire(
            &JsonDecoder,
            "empty.json",
            b"{}".to_vec(),
            DecodeOptions::default(),
            DEFAULT_DECODE_TIMEOUT,
            &observer,
        )
        .await;

        assert!(bag.is_empty());
        assert_eq!(observer.labels()[1], "degraded:empty_tag_bag:json");
    }
}
