/// State management module
///
/// This module handles all gallery state, including:
/// - Shared data structures and document loading (data.rs)
/// - Filter parameters for a view (filters.rs)
/// - The persisted colour cache (library.rs)
/// - The per-view controller (gallery.rs)

pub mod data;
pub mod filters;
pub mod gallery;
pub mod library;

pub use data::{GalleryDocument, GalleryItem};
pub use filters::{FilterState, SortMode, ViewsRange};
pub use gallery::{Gallery, GalleryView, Selection};
pub use library::ColorCache;
