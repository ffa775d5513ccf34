//! Shared data structures for the gallery state
//!
//! These structs represent the data model that flows between the loaded
//! gallery document, the search engine and the markup layer.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::DateTime;
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use serde_json::Value;
use tracing::{info, warn};

use crate::color::ColorCategory;
use crate::detect::loader::ImageBase;
use crate::error::{GalleryError, Result};
use crate::search::index::{build_index, SearchIndex};

/// Synthetic timestamps count back from this instant (2025-01-01T00:00:00Z, in ms)
const CREATED_BASE_MS: i64 = 1_735_689_600_000;
/// Spacing between synthetic timestamps: one day per position
const CREATED_STEP_MS: i64 = 86_400_000;

static VIEWS_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+(?:\.[0-9]+)?)(k|m)?").expect("valid views regex"));
static VIEWS_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)([kKmM])$").expect("valid views suffix regex"));

/// Media reference of an item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageRef {
    pub src: String,
    pub alt: String,
}

/// Author of an item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Author {
    pub name: String,
    pub avatar: String,
    pub alt: String,
}

/// Represents a single image record in the gallery
#[derive(Debug, Clone, Default)]
pub struct GalleryItem {
    /// Unique within one load; synthesized from array position when missing
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image: ImageRef,
    pub author: Author,
    /// Human readable count such as "1.2k"; "0" when missing
    pub views: String,
    /// Author-declared color words (free text, may be aliases)
    pub colors: Vec<String>,
    /// Milliseconds since the epoch; synthesized from array position when missing
    pub created: i64,
    detected_colors: BTreeSet<ColorCategory>,
    index: OnceCell<SearchIndex>,
}

impl GalleryItem {
    pub fn new(id: i64, title: impl Into<String>, views: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            views: views.into(),
            ..Self::default()
        }
    }

    /// Numeric magnitude of `views`
    pub fn views_count(&self) -> u64 {
        parse_views(&self.views)
    }

    /// Colors found by the detector (empty until a detection batch merges in)
    pub fn detected_colors(&self) -> &BTreeSet<ColorCategory> {
        &self.detected_colors
    }

    /// Replace the detected colors; the search index is rebuilt on next access
    pub fn set_detected_colors(&mut self, colors: impl IntoIterator<Item = ColorCategory>) {
        self.detected_colors = colors.into_iter().collect();
        self.index = OnceCell::new();
    }

    /// Normalized projection of the text fields, built once and memoized
    pub fn index(&self) -> &SearchIndex {
        self.index.get_or_init(|| build_index(self))
    }
}

/// Parse a views string ("910", "1.2k", "2m") into its numeric value
///
/// Takes the first number in the string with an optional k/m suffix,
/// case-insensitively. Anything unparsable is 0.
pub fn parse_views(views: &str) -> u64 {
    let lowered = views.trim().to_lowercase();
    let Some(captures) = VIEWS_NUMBER.captures(&lowered) else {
        return 0;
    };

    let number: f64 = captures[1].parse().unwrap_or(0.0);
    let multiplier = match captures.get(2).map(|m| m.as_str()) {
        Some("k") => 1_000.0,
        Some("m") => 1_000_000.0,
        _ => 1.0,
    };

    (number * multiplier).round() as u64
}

/// Put a space between the number and a k/m suffix ("1.2k" → "1.2 k")
pub fn format_views(views: &str) -> String {
    VIEWS_SUFFIX.replace(views, "$1 $2").into_owned()
}

/// A loaded gallery document plus where its relative image paths resolve from
#[derive(Debug, Clone)]
pub struct GalleryDocument {
    pub items: Vec<GalleryItem>,
    pub base: ImageBase,
}

/// Fetch and parse a gallery document from a file path or http(s) URL
///
/// This is the only user-visible failure in the engine: the caller renders a
/// load error and stops.
pub async fn load_document(source: &str) -> Result<GalleryDocument> {
    let (json, base) = if source.starts_with("http://") || source.starts_with("https://") {
        let url = reqwest::Url::parse(source).map_err(|_| GalleryError::Config {
            key: "source".to_string(),
            value: source.to_string(),
        })?;
        let response = reqwest::get(url.clone()).await?;
        if !response.status().is_success() {
            return Err(GalleryError::Status(response.status()));
        }
        (response.text().await?, ImageBase::Url(url))
    } else {
        let path = PathBuf::from(source);
        let json = tokio::fs::read_to_string(&path).await?;
        (json, ImageBase::Dir(document_dir(&path)))
    };

    let items = parse_document(&json)?;
    info!(source, count = items.len(), "loaded gallery document");

    Ok(GalleryDocument { items, base })
}

fn document_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Parse a gallery document: a bare array of items or `{ "images": [...] }`
///
/// The document itself must be valid JSON. Individual entries never fail:
/// missing or mistyped fields fall back to empty strings / "0" views, and
/// absent ids and timestamps are synthesized from the entry's position.
pub fn parse_document(json: &str) -> Result<Vec<GalleryItem>> {
    let document: Value = serde_json::from_str(json)?;

    let entries = match document {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("images") {
            Some(Value::Array(entries)) => entries,
            _ => {
                warn!("gallery document has no images array");
                Vec::new()
            }
        },
        _ => {
            warn!("gallery document is neither an array nor an object");
            Vec::new()
        }
    };

    Ok(entries
        .iter()
        .enumerate()
        .map(|(position, entry)| item_from_value(position, entry))
        .collect())
}

fn item_from_value(position: usize, entry: &Value) -> GalleryItem {
    let image = field(entry, "image");
    let author = field(entry, "author");

    let views = lenient_string(field(entry, "views"));

    GalleryItem {
        id: lenient_id(field(entry, "id")).unwrap_or(position as i64 + 1),
        title: lenient_string(field(entry, "title")),
        description: lenient_string(field(entry, "description")),
        image: ImageRef {
            src: lenient_string(field(image, "src")),
            alt: lenient_string(field(image, "alt")),
        },
        author: Author {
            name: lenient_string(field(author, "name")),
            avatar: lenient_string(field(author, "avatar")),
            alt: lenient_string(field(author, "alt")),
        },
        views: if views.is_empty() { "0".to_string() } else { views },
        colors: lenient_string_list(field(entry, "colors")),
        created: lenient_timestamp(field(entry, "created"))
            .unwrap_or(CREATED_BASE_MS - position as i64 * CREATED_STEP_MS),
        detected_colors: BTreeSet::new(),
        index: OnceCell::new(),
    }
}

static NULL: Value = Value::Null;

fn field<'a>(value: &'a Value, name: &str) -> &'a Value {
    value.get(name).unwrap_or(&NULL)
}

fn lenient_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn lenient_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(values) => values
            .iter()
            .map(lenient_string)
            .filter(|s| !s.trim().is_empty())
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Accepts epoch milliseconds or an RFC 3339 string
fn lenient_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .map(|dt| dt.timestamp_millis())
            .ok()
            .or_else(|| s.trim().parse().ok()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_views() {
        assert_eq!(parse_views("910"), 910);
        assert_eq!(parse_views("1.2k"), 1_200);
        assert_eq!(parse_views("2m"), 2_000_000);
        assert_eq!(parse_views(" 5.0K "), 5_000);
        assert_eq!(parse_views("about 3k views"), 3_000);
        assert_eq!(parse_views("lots"), 0);
        assert_eq!(parse_views(""), 0);
    }

    #[test]
    fn test_format_views() {
        assert_eq!(format_views("1.2k"), "1.2 k");
        assert_eq!(format_views("3M"), "3 M");
        assert_eq!(format_views("910"), "910");
    }

    #[test]
    fn test_bare_array_and_wrapped_documents() {
        let bare = parse_document(r#"[{"title": "A"}, {"title": "B"}]"#).unwrap();
        assert_eq!(bare.len(), 2);

        let wrapped = parse_document(r#"{"images": [{"title": "A"}]}"#).unwrap();
        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped[0].title, "A");

        let other = parse_document(r#"{"users": []}"#).unwrap();
        assert!(other.is_empty());
    }

    #[test]
    fn test_invalid_json_is_a_load_error() {
        assert!(matches!(parse_document("{not json"), Err(GalleryError::Parse(_))));
    }

    #[test]
    fn test_synthesized_ids_and_timestamps() {
        let items = parse_document(r#"[{"title": "A"}, {"id": 42, "title": "B"}, {}]"#).unwrap();
        assert_eq!(items[0].id, 1);
        assert_eq!(items[1].id, 42);
        assert_eq!(items[2].id, 3);

        // Earlier entries are "newer"
        assert!(items[0].created > items[1].created);
        assert!(items[1].created > items[2].created);
        assert_eq!(items[0].created - items[1].created, CREATED_STEP_MS);
    }

    #[test]
    fn test_malformed_fields_degrade() {
        let items = parse_document(
            r#"[{"id": "7", "title": 12, "views": null, "image": "oops", "author": {"name": ["x"]},
                 "colors": ["Blue", 3, ""], "created": "2024-05-01T00:00:00Z"}]"#,
        )
        .unwrap();
        let item = &items[0];
        assert_eq!(item.id, 7);
        assert_eq!(item.title, "12");
        assert_eq!(item.views, "0");
        assert_eq!(item.views_count(), 0);
        assert_eq!(item.image, ImageRef::default());
        assert_eq!(item.author.name, "");
        assert_eq!(item.colors, vec!["Blue", "3"]);
        assert_eq!(item.created, 1_714_521_600_000);
    }

    #[test]
    fn test_numeric_views_accepted() {
        let items = parse_document(r#"[{"views": 1500}]"#).unwrap();
        assert_eq!(items[0].views_count(), 1_500);
    }

    #[test]
    fn test_detected_colors_invalidate_index() {
        let mut item = GalleryItem::new(1, "Harbour", "10");
        assert!(item.index().color_set.is_empty());

        item.set_detected_colors([ColorCategory::Blue]);
        assert!(item.index().color_set.contains(&ColorCategory::Blue));
        assert!(item.detected_colors().contains(&ColorCategory::Blue));
    }
}
