use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tokio::task;

use crate::color::ColorCategory;
use crate::config::DetectionConfig;
use crate::error::DetectError;

use super::kmeans::dominant_categories;
use super::sampler::{downscale, sample_pixels};

/// Where relative image sources resolve from
#[derive(Debug, Clone, PartialEq)]
pub enum ImageBase {
    /// Directory of a gallery document read from disk
    Dir(PathBuf),
    /// URL of a gallery document fetched over http(s)
    Url(reqwest::Url),
}

/// A resolved image location
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    File(PathBuf),
    Remote(reqwest::Url),
}

impl ImageBase {
    /// Resolve an item's `image.src` against this base
    pub fn resolve(&self, src: &str) -> Result<ImageSource, DetectError> {
        let src = src.trim();
        if src.is_empty() {
            return Err(DetectError::MissingSource);
        }

        if src.starts_with("http://") || src.starts_with("https://") {
            return reqwest::Url::parse(src)
                .map(ImageSource::Remote)
                .map_err(|_| DetectError::InvalidSource(src.to_string()));
        }

        match self {
            ImageBase::Dir(dir) => {
                let path = Path::new(src);
                if path.is_absolute() {
                    Ok(ImageSource::File(path.to_path_buf()))
                } else {
                    Ok(ImageSource::File(dir.join(path)))
                }
            }
            ImageBase::Url(base) => base
                .join(src)
                .map(ImageSource::Remote)
                .map_err(|_| DetectError::InvalidSource(src.to_string())),
        }
    }
}

/// Fetches the raw bytes of an item's image
///
/// The detection batch only talks to this trait, so tests can count or fake
/// fetches without touching the disk or the network.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, src: &str) -> Result<Vec<u8>, DetectError>;
}

/// Reads local files or downloads over http(s)
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    base: ImageBase,
    client: reqwest::Client,
}

impl SourceFetcher {
    pub fn new(base: ImageBase) -> Self {
        Self {
            base,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ImageFetcher for SourceFetcher {
    async fn fetch(&self, src: &str) -> Result<Vec<u8>, DetectError> {
        match self.base.resolve(src)? {
            ImageSource::File(path) => Ok(tokio::fs::read(&path).await?),
            ImageSource::Remote(url) => {
                let response = self.client.get(url).send().await?;
                if !response.status().is_success() {
                    return Err(DetectError::Status(response.status()));
                }
                Ok(response.bytes().await?.to_vec())
            }
        }
    }
}

/// Detect the dominant colour categories of an encoded image
///
/// Decoding and clustering run on a blocking worker. `seed` makes the
/// sampling and k-means seeding reproducible per item.
pub async fn detect_dominant_colors(
    bytes: Vec<u8>,
    seed: u64,
    config: DetectionConfig,
) -> Result<Vec<ColorCategory>, DetectError> {
    task::spawn_blocking(move || detect_blocking(&bytes, seed, &config)).await?
}

/// Blocking implementation of colour detection
fn detect_blocking(
    bytes: &[u8],
    seed: u64,
    config: &DetectionConfig,
) -> Result<Vec<ColorCategory>, DetectError> {
    let img = image::load_from_memory(bytes)?;
    let canvas = downscale(&img);

    let mut rng = StdRng::seed_from_u64(seed);
    let samples = sample_pixels(&canvas, config.max_samples, &mut rng);

    // Fully transparent or all-white images simply have no colours
    Ok(dominant_categories(&samples, config, &mut rng))
}
