//! Per-item search index

use std::collections::BTreeSet;

use crate::color::{resolve_alias, ColorCategory};
use crate::state::data::GalleryItem;

use super::normalize::{normalize, tokenize};

/// One normalized field: full text plus its tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldIndex {
    pub text: String,
    pub tokens: Vec<String>,
}

impl FieldIndex {
    pub fn new(raw: &str) -> Self {
        Self {
            text: normalize(raw),
            tokens: tokenize(raw),
        }
    }
}

/// Normalized projection of an item's searchable fields
///
/// Always derivable from the item's base fields plus its detected colors;
/// items memoize it but it is never the source of truth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchIndex {
    pub title: FieldIndex,
    pub description: FieldIndex,
    pub alt: FieldIndex,
    pub author: FieldIndex,
    /// Declared color words plus the canonical name of every merged category
    pub colors: FieldIndex,
    /// Canonical categories: declared colors resolved through the alias table,
    /// unioned with detected colors
    pub color_set: BTreeSet<ColorCategory>,
}

/// Build the search index for an item
///
/// Idempotent: the same item always produces the same index.
pub fn build_index(item: &GalleryItem) -> SearchIndex {
    let mut color_set: BTreeSet<ColorCategory> = item.detected_colors().clone();
    for declared in &item.colors {
        // "navy blue" contributes both of its words
        if let Some(category) = resolve_alias(declared) {
            color_set.insert(category);
        }
        for word in tokenize(declared) {
            if let Some(category) = resolve_alias(&word) {
                color_set.insert(category);
            }
        }
    }

    let mut color_words: Vec<String> = item.colors.clone();
    color_words.extend(color_set.iter().map(|c| c.name().to_string()));

    SearchIndex {
        title: FieldIndex::new(&item.title),
        description: FieldIndex::new(&item.description),
        alt: FieldIndex::new(&item.image.alt),
        author: FieldIndex::new(&item.author.name),
        colors: FieldIndex::new(&color_words.join(" ")),
        color_set,
    }
}
