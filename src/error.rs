//! Error types for the gallery engine
//!
//! Only `GalleryError` is ever surfaced to the host view. `DetectError` lives
//! and dies inside a detection batch: every failing item degrades to an empty
//! colour set.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Failed to fetch gallery document: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Failed to load gallery document: {0}")]
    Status(reqwest::StatusCode),

    #[error("Failed to read gallery document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed gallery document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Colour cache error: {0}")]
    Cache(#[from] rusqlite::Error),

    #[error("Invalid configuration value for {key}: {value}")]
    Config { key: String, value: String },

    #[error("Failed to render markup: {0}")]
    Render(#[from] askama::Error),
}

pub type Result<T, E = GalleryError> = std::result::Result<T, E>;

/// Why a single item produced no detected colours
#[derive(Error, Debug)]
pub enum DetectError {
    #[error("item has no image source")]
    MissingSource,

    #[error("image source cannot be resolved: {0}")]
    InvalidSource(String),

    #[error("image fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("image fetch returned {0}")]
    Status(reqwest::StatusCode),

    #[error("image read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("detection worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
