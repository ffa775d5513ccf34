//! Host configuration for one gallery view

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{GalleryError, Result};

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// What an untouched gallery shows
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PristineView {
    /// A "start searching" placeholder instead of results
    Prompt,
    /// Every item, in the default order
    #[default]
    FullList,
}

impl FromStr for PristineView {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prompt" => Ok(PristineView::Prompt),
            "full-list" | "full" | "list" => Ok(PristineView::FullList),
            other => Err(format!("unknown pristine view: {other}")),
        }
    }
}

/// Tunables for dominant-colour detection
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DetectionConfig {
    /// Run a detection batch after loading
    pub enabled: bool,
    /// Reservoir size per image
    pub max_samples: usize,
    /// Lloyd iterations before giving up on convergence
    pub max_iterations: usize,
    /// Clusters holding less than this share of samples are merged away
    pub min_cluster_share: f32,
    /// How many categories an image may be tagged with
    pub top_categories: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_samples: 3500,
            max_iterations: 12,
            min_cluster_share: 0.015,
            top_categories: 6,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GalleryConfig {
    pub page_size: usize,
    pub pristine_view: PristineView,
    /// Persisted colour cache; `None` keeps the cache in memory only
    pub cache_path: Option<PathBuf>,
    pub detection: DetectionConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            pristine_view: PristineView::default(),
            cache_path: default_cache_path(),
            detection: DetectionConfig::default(),
        }
    }
}

/// Get the path where the colour cache database should be stored
///
/// - Linux: ~/.local/share/bento-gallery/gallery.db
/// - macOS: ~/Library/Application Support/bento-gallery/gallery.db
/// - Windows: %APPDATA%\bento-gallery\gallery.db
pub fn default_cache_path() -> Option<PathBuf> {
    let mut path = dirs::data_dir().or_else(dirs::home_dir)?;
    path.push("bento-gallery");
    path.push("gallery.db");
    Some(path)
}

impl GalleryConfig {
    /// Defaults overlaid with `BENTO_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each known key
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("BENTO_PAGE_SIZE") {
            config.page_size = parse_value("BENTO_PAGE_SIZE", &value)?;
            if config.page_size == 0 {
                return Err(invalid("BENTO_PAGE_SIZE", &value));
            }
        }
        if let Some(value) = lookup("BENTO_PRISTINE_VIEW") {
            config.pristine_view = parse_value("BENTO_PRISTINE_VIEW", &value)?;
        }
        if let Some(value) = lookup("BENTO_CACHE_PATH") {
            let value = value.trim();
            config.cache_path = match value {
                "" | "none" | "memory" => None,
                path => Some(PathBuf::from(path)),
            };
        }
        if let Some(value) = lookup("BENTO_DETECT") {
            config.detection.enabled = parse_flag("BENTO_DETECT", &value)?;
        }

        Ok(config)
    }
}

fn invalid(key: &str, value: &str) -> GalleryError {
    GalleryError::Config {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}
