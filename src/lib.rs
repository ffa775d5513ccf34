//! Search, filtering and dominant-colour tagging for image galleries
//!
//! Load a gallery document with [`state::data::load_document`], wrap its items
//! in a [`state::Gallery`], optionally enrich them with
//! [`detect::run_detection_batch`], then render pages with [`ui::render`].

pub mod color;
pub mod config;
pub mod detect;
pub mod error;
pub mod search;
pub mod state;
pub mod ui;

pub use color::ColorCategory;
pub use config::{DetectionConfig, GalleryConfig, PristineView};
pub use error::{DetectError, GalleryError, Result};
pub use state::{FilterState, Gallery, GalleryItem, SortMode, ViewsRange};
