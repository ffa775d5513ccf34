use futures::future::join_all;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::color::ColorCategory;
use crate::config::DetectionConfig;
use crate::error::DetectError;
use crate::state::data::GalleryItem;
use crate::state::library::ColorCache;

use super::loader::{detect_dominant_colors, ImageFetcher};

/// Outcome of one detection batch
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Detected colours per item id; failed items map to an empty list
    pub colors: HashMap<i64, Vec<ColorCategory>>,
    /// Items answered from the cache without fetching
    pub hits: usize,
    /// Items fetched and sampled
    pub computed: usize,
    /// Items whose fetch or decode failed
    pub failed: usize,
}

/// Detect colours for every item, concurrently
///
/// Cache hits are answered immediately. Every miss becomes its own task and
/// the batch waits for all of them; a failing task only empties that item's
/// colours. Successful results are stored in `cache`, which is persisted
/// once the whole batch has finished.
pub async fn run_detection_batch<F>(
    items: &[GalleryItem],
    cache: &mut ColorCache,
    fetcher: &F,
    config: &DetectionConfig,
) -> BatchReport
where
    F: ImageFetcher + ?Sized,
{
    let mut report = BatchReport::default();
    let mut pending = Vec::new();

    for item in items {
        if let Some(colors) = cache.get(item.id) {
            debug!(id = item.id, "colour cache hit");
            report.colors.insert(item.id, colors.to_vec());
            report.hits += 1;
        } else {
            pending.push(detect_item(item.id, item.image.src.clone(), fetcher, config.clone()));
        }
    }

    for (id, result) in join_all(pending).await {
        match result {
            Ok(colors) => {
                cache.insert(id, colors.clone());
                report.colors.insert(id, colors);
                report.computed += 1;
            }
            Err(DetectError::MissingSource) => {
                debug!(id, "item has no image, skipping detection");
                report.colors.insert(id, Vec::new());
                report.failed += 1;
            }
            Err(err) => {
                warn!(id, %err, "colour detection failed");
                report.colors.insert(id, Vec::new());
                report.failed += 1;
            }
        }
    }

    if let Err(err) = cache.persist() {
        warn!(%err, "failed to persist colour cache");
    }

    info!(
        items = items.len(),
        hits = report.hits,
        computed = report.computed,
        failed = report.failed,
        "colour detection batch finished"
    );
    report
}

async fn detect_item<F>(
    id: i64,
    src: String,
    fetcher: &F,
    config: DetectionConfig,
) -> (i64, Result<Vec<ColorCategory>, DetectError>)
where
    F: ImageFetcher + ?Sized,
{
    let result = async move {
        let bytes = fetcher.fetch(&src).await?;
        detect_dominant_colors(bytes, id as u64, config).await
    }
    .await;

    (id, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::loader::tests::banded_png;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;
    use tokio::sync::Notify;

    /// Serves canned images and counts how often it was asked
    struct CountingFetcher {
        images: HashMap<String, Vec<u8>>,
        calls: AtomicUsize,
    }

    impl CountingFetcher {
        fn new() -> Self {
            let images = HashMap::from([
                ("red.png".to_string(), banded_png(&[[220, 38, 38]])),
                ("mix.png".to_string(), banded_png(&[[34, 160, 70], [37, 99, 235]])),
                ("broken.png".to_string(), b"garbage".to_vec()),
            ]);
            Self {
                images,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImageFetcher for CountingFetcher {
        async fn fetch(&self, src: &str) -> Result<Vec<u8>, DetectError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if src.is_empty() {
                return Err(DetectError::MissingSource);
            }
            self.images
                .get(src)
                .cloned()
                .ok_or_else(|| DetectError::Io(std::io::Error::from(std::io::ErrorKind::NotFound)))
        }
    }

    fn item(id: i64, src: &str) -> GalleryItem {
        let mut item = GalleryItem::new(id, format!("Item {id}"), "1");
        item.image.src = src.to_string();
        item
    }

    #[tokio::test]
    async fn test_batch_detects_every_item() {
        let items = vec![item(1, "red.png"), item(2, "mix.png")];
        let fetcher = CountingFetcher::new();
        let mut cache = ColorCache::in_memory();

        let report = run_detection_batch(&items, &mut cache, &fetcher, &DetectionConfig::default()).await;

        assert_eq!(report.computed, 2);
        assert_eq!(report.colors[&1], vec![ColorCategory::Red]);
        assert!(report.colors[&2].contains(&ColorCategory::Green));
        assert!(report.colors[&2].contains(&ColorCategory::Blue));
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_failures_degrade_to_empty() {
        let items = vec![
            item(1, "red.png"),
            item(2, "broken.png"),
            item(3, "missing.png"),
            item(4, ""),
        ];
        let fetcher = CountingFetcher::new();
        let mut cache = ColorCache::in_memory();

        let report = run_detection_batch(&items, &mut cache, &fetcher, &DetectionConfig::default()).await;

        assert_eq!(report.computed, 1);
        assert_eq!(report.failed, 3);
        assert_eq!(report.colors[&1], vec![ColorCategory::Red]);
        for id in [2, 3, 4] {
            assert!(report.colors[&id].is_empty());
        }
        // Failures are not cached, so they are retried next time
        assert_eq!(cache.len(), 1);
        assert!(cache.get(2).is_none());
    }

    /// Holds `slow.png` until the gate opens; every other image returns at once
    struct GatedFetcher {
        gate: Notify,
        started: AtomicUsize,
        finished: AtomicUsize,
        image: Vec<u8>,
    }

    #[async_trait]
    impl ImageFetcher for GatedFetcher {
        async fn fetch(&self, src: &str) -> Result<Vec<u8>, DetectError> {
            self.started.fetch_add(1, Ordering::SeqCst);
            if src == "slow.png" {
                self.gate.notified().await;
            }
            self.finished.fetch_add(1, Ordering::SeqCst);
            Ok(self.image.clone())
        }
    }

    #[tokio::test]
    async fn test_slow_image_does_not_hold_back_others() {
        let items = vec![item(1, "slow.png"), item(2, "a.png"), item(3, "b.png")];
        let fetcher = GatedFetcher {
            gate: Notify::new(),
            started: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
            image: banded_png(&[[220, 38, 38]]),
        };
        let mut cache = ColorCache::in_memory();
        let config = DetectionConfig::default();

        let batch = run_detection_batch(&items, &mut cache, &fetcher, &config);
        let observer = async {
            for _ in 0..1_000 {
                if fetcher.finished.load(Ordering::SeqCst) >= 2 {
                    break;
                }
                tokio::task::yield_now().await;
            }
            let seen = (
                fetcher.started.load(Ordering::SeqCst),
                fetcher.finished.load(Ordering::SeqCst),
            );
            fetcher.gate.notify_one();
            seen
        };

        let (report, (started, finished)) = tokio::join!(batch, observer);

        // every fetch was issued and the fast ones completed while slow.png waited
        assert_eq!((started, finished), (3, 2));
        assert_eq!(report.computed, 3);
        for id in [1, 2, 3] {
            assert_eq!(report.colors[&id], vec![ColorCategory::Red]);
        }
    }

    #[tokio::test]
    async fn test_reloaded_cache_skips_sampling() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gallery.db");
        let items = vec![item(1, "red.png"), item(2, "mix.png")];
        let config = DetectionConfig::default();

        let first_fetcher = CountingFetcher::new();
        let mut cache = ColorCache::open(&path).unwrap();
        let first = run_detection_batch(&items, &mut cache, &first_fetcher, &config).await;
        assert_eq!(first_fetcher.calls(), 2);
        drop(cache);

        let second_fetcher = CountingFetcher::new();
        let mut reloaded = ColorCache::open(&path).unwrap();
        let second = run_detection_batch(&items, &mut reloaded, &second_fetcher, &config).await;

        assert_eq!(second_fetcher.calls(), 0);
        assert_eq!(second.hits, 2);
        assert_eq!(second.computed, 0);
        assert_eq!(second.colors, first.colors);
    }
}
