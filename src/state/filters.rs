//! Filter parameters for one gallery view
//!
//! This struct stores every constraint the user applied to the gallery.
//! It serializes to JSON so a host can persist or restore a view's filters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::color::ColorCategory;
use crate::search::query::parse_query;

/// How results are ordered
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Only meaningful with a non-empty text query
    Relevance,
    #[default]
    Newest,
    Oldest,
    ViewsDesc,
    ViewsAsc,
    TitleAsc,
    TitleDesc,
}

impl SortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Relevance => "relevance",
            SortMode::Newest => "newest",
            SortMode::Oldest => "oldest",
            SortMode::ViewsDesc => "views-desc",
            SortMode::ViewsAsc => "views-asc",
            SortMode::TitleAsc => "title-asc",
            SortMode::TitleDesc => "title-desc",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relevance" => Ok(SortMode::Relevance),
            "newest" => Ok(SortMode::Newest),
            "oldest" => Ok(SortMode::Oldest),
            "views-desc" => Ok(SortMode::ViewsDesc),
            "views-asc" => Ok(SortMode::ViewsAsc),
            "title-asc" => Ok(SortMode::TitleAsc),
            "title-desc" => Ok(SortMode::TitleDesc),
            other => Err(format!("unknown sort mode: {other}")),
        }
    }
}

/// A canned view-count band ("1000-10000", "10000-" for no upper bound)
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewsRange {
    pub min: u64,
    /// `None` = unbounded
    pub max: Option<u64>,
}

impl ViewsRange {
    pub fn new(min: u64, max: Option<u64>) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, views: u64) -> bool {
        views >= self.min && self.max.map_or(true, |max| views <= max)
    }
}

impl FromStr for ViewsRange {
    type Err = String;

    /// Either side may be empty: "-500", "1000-", "1000-5000"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (min, max) = s
            .split_once('-')
            .ok_or_else(|| format!("views range must look like MIN-MAX: {s}"))?;

        let parse_bound = |bound: &str| -> Result<Option<u64>, String> {
            let bound = bound.trim();
            if bound.is_empty() {
                return Ok(None);
            }
            bound
                .parse()
                .map(Some)
                .map_err(|_| format!("invalid views bound: {bound}"))
        };

        Ok(ViewsRange {
            min: parse_bound(min)?.unwrap_or(0),
            max: parse_bound(max)?,
        })
    }
}

impl fmt::Display for ViewsRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}-{}", self.min, max),
            None => write!(f, "{}-", self.min),
        }
    }
}

/// All filter parameters for a gallery view
///
/// Missing fields deserialize to their defaults, so a stored state only
/// needs the filters that are actually set.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct FilterState {
    /// Free-text query (raw, as typed)
    pub query: String,

    /// Minimum views from the slider
    /// - `None` until the user explicitly moves it, so the slider's resting
    ///   position never filters anything
    pub min_views: Option<u64>,

    /// Active preset band; overrides `min_views` while set
    pub preset: Option<ViewsRange>,

    /// Selected color category
    pub color: Option<ColorCategory>,

    /// Requested ordering
    pub sort: SortMode,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert to JSON string for host storage
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check if this is the untouched configuration (never searched or filtered)
    ///
    /// A query without any searchable words counts as no query.
    pub fn is_pristine(&self) -> bool {
        !self.has_text_query()
            && self.min_views.is_none()
            && self.preset.is_none()
            && self.color.is_none()
            && self.sort == SortMode::default()
    }

    /// Reset all filters to default
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether the query yields at least one phrase or term
    pub fn has_text_query(&self) -> bool {
        !parse_query(&self.query).is_empty()
    }

    /// The ordering actually applied
    ///
    /// A text query always ranks by relevance; without one, a stored
    /// `Relevance` falls back to the default order.
    pub fn effective_sort(&self) -> SortMode {
        if self.has_text_query() {
            SortMode::Relevance
        } else if self.sort == SortMode::Relevance {
            SortMode::default()
        } else {
            self.sort
        }
    }

    /// Whether an item's view count passes the views constraints
    pub fn accepts_views(&self, views: u64) -> bool {
        match (self.preset, self.min_views) {
            (Some(preset), _) => preset.contains(views),
            (None, Some(min)) => views >= min,
            (None, None) => true,
        }
    }

    /// Activate `range`, or clear it if it is already the active preset
    pub fn toggle_preset(&mut self, range: ViewsRange) {
        self.preset = if self.preset == Some(range) {
            None
        } else {
            Some(range)
        };
    }
}
