//! The gallery controller
//!
//! One `Gallery` owns everything a single gallery view needs: the loaded
//! items, the current filters, the match list and the current page. Every
//! mutation goes through a method so the match list can never go stale.

use std::collections::HashMap;

use crate::color::ColorCategory;
use crate::config::{GalleryConfig, PristineView};
use crate::search::pipeline::{paginate, run_pipeline, total_pages};

use super::data::GalleryItem;
use super::filters::{FilterState, SortMode, ViewsRange};

/// Number of items in the promoted row
pub const PROMOTED_COUNT: usize = 6;

/// What the current page shows
#[derive(Debug, Clone)]
pub enum GalleryView<'a> {
    /// Untouched filters and the host asked for a placeholder
    Prompt,
    /// Filters are active but nothing matches
    NoMatches,
    Results {
        items: Vec<&'a GalleryItem>,
        page: usize,
        total_pages: usize,
        match_count: usize,
    },
}

/// An item opened on its own, with its neighbours in load order
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    pub item: &'a GalleryItem,
    pub prev: Option<i64>,
    pub next: Option<i64>,
}

#[derive(Debug)]
pub struct Gallery {
    items: Vec<GalleryItem>,
    filters: FilterState,
    /// Positions into `items`, in display order
    matches: Vec<usize>,
    /// 1-based
    page: usize,
    page_size: usize,
    pristine_view: PristineView,
}

impl Gallery {
    pub fn new(items: Vec<GalleryItem>, config: &GalleryConfig) -> Self {
        let mut gallery = Self {
            items,
            filters: FilterState::default(),
            matches: Vec::new(),
            page: 1,
            page_size: config.page_size.max(1),
            pristine_view: config.pristine_view,
        };
        gallery.refresh();
        gallery
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Total number of matches across all pages
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.matches.len(), self.page_size)
    }

    pub fn is_pristine(&self) -> bool {
        self.filters.is_pristine()
    }

    /// Re-run the pipeline and go back to the first page
    fn refresh(&mut self) {
        self.matches = run_pipeline(&self.items, &self.filters);
        self.page = 1;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.filters.query = query.into();
        self.refresh();
    }

    /// Explicitly move the minimum-views slider
    pub fn set_min_views(&mut self, min_views: Option<u64>) {
        self.filters.min_views = min_views;
        self.refresh();
    }

    pub fn toggle_preset(&mut self, range: ViewsRange) {
        self.filters.toggle_preset(range);
        self.refresh();
    }

    pub fn set_color(&mut self, color: Option<ColorCategory>) {
        self.filters.color = color;
        self.refresh();
    }

    pub fn set_sort(&mut self, sort: SortMode) {
        self.filters.sort = sort;
        self.refresh();
    }

    /// Replace all filters at once (e.g. restored from host storage)
    pub fn set_filters(&mut self, filters: FilterState) {
        self.filters = filters;
        self.refresh();
    }

    /// Back to the pristine configuration
    pub fn reset(&mut self) {
        self.filters.reset();
        self.refresh();
    }

    /// Jump to a 1-based page; pages past the end show nothing
    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn next_page(&mut self) {
        if self.page < self.total_pages() {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    /// Items on the current page
    pub fn page_items(&self) -> Vec<&GalleryItem> {
        paginate(&self.matches, self.page, self.page_size)
            .iter()
            .map(|position| &self.items[*position])
            .collect()
    }

    pub fn view(&self) -> GalleryView<'_> {
        if self.is_pristine() && self.pristine_view == PristineView::Prompt {
            return GalleryView::Prompt;
        }
        if self.matches.is_empty() {
            return GalleryView::NoMatches;
        }

        GalleryView::Results {
            items: self.page_items(),
            page: self.page,
            total_pages: self.total_pages(),
            match_count: self.match_count(),
        }
    }

    /// Most viewed items, independent of the current filters
    pub fn promoted(&self) -> Vec<&GalleryItem> {
        let mut ranked: Vec<&GalleryItem> = self.items.iter().collect();
        ranked.sort_by_key(|item| std::cmp::Reverse(item.views_count()));
        ranked.truncate(PROMOTED_COUNT);
        ranked
    }

    pub fn selected(&self, id: i64) -> Option<Selection<'_>> {
        let position = self.items.iter().position(|item| item.id == id)?;
        Some(Selection {
            item: &self.items[position],
            prev: position.checked_sub(1).map(|prev| self.items[prev].id),
            next: self.items.get(position + 1).map(|item| item.id),
        })
    }

    /// Fold a detection batch's results into the items
    ///
    /// Colours only ever add matches for the colour filter and search, so
    /// the current page is kept when it still exists.
    pub fn merge_detected_colors(&mut self, detected: &HashMap<i64, Vec<ColorCategory>>) {
        for item in &mut self.items {
            if let Some(colors) = detected.get(&item.id) {
                item.set_detected_colors(colors.iter().copied());
            }
        }

        let page = self.page;
        self.refresh();
        self.page = page.min(self.total_pages());
    }
}
