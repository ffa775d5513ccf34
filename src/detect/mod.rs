/// Dominant-colour detection
///
/// This module turns an item's image into a short ranked list of colour
/// categories:
/// - Tiered downscale and reservoir sampling (sampler.rs)
/// - k-means++ in CIE Lab with noise merging (kmeans.rs)
/// - Image fetching and the blocking decode worker (loader.rs)
/// - Concurrent, cached detection batches (batch.rs)

pub mod batch;
pub mod kmeans;
pub mod loader;
pub mod sampler;

pub use batch::{run_detection_batch, BatchReport};
pub use loader::{detect_dominant_colors, ImageBase, ImageFetcher, SourceFetcher};
