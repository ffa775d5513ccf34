//! Filter, sort and paginate
//!
//! The pipeline never reorders or clones the item list itself; it returns
//! positions into it so the controller can keep one owned `Vec<GalleryItem>`.

use std::cmp::Ordering;

use crate::state::data::GalleryItem;
use crate::state::filters::{FilterState, SortMode};

use super::query::parse_query;
use super::score::score_item;

/// Positions of matching items in display order
pub fn run_pipeline(items: &[GalleryItem], filters: &FilterState) -> Vec<usize> {
    // 1. non-text constraints
    let candidates = items.iter().enumerate().filter(|(_, item)| {
        filters.accepts_views(item.views_count())
            && filters
                .color
                .map_or(true, |color| item.index().color_set.contains(&color))
    });

    let query = parse_query(&filters.query);
    if !query.is_empty() {
        // 2. relevance
        let mut scored: Vec<(usize, f32)> = candidates
            .map(|(position, item)| (position, score_item(item, &query)))
            .filter(|(_, score)| *score > 0.0)
            .collect();

        scored.sort_by(|(a_pos, a_score), (b_pos, b_score)| {
            b_score
                .total_cmp(a_score)
                .then_with(|| compare_relevance_ties(&items[*a_pos], &items[*b_pos]))
        });

        return scored.into_iter().map(|(position, _)| position).collect();
    }

    // 3. explicit sort mode
    let mut positions: Vec<usize> = candidates.map(|(position, _)| position).collect();
    let sort = filters.effective_sort();
    positions.sort_by(|a, b| compare_by_mode(&items[*a], &items[*b], sort));
    positions
}

/// Higher views first, then more recent
fn compare_relevance_ties(a: &GalleryItem, b: &GalleryItem) -> Ordering {
    b.views_count()
        .cmp(&a.views_count())
        .then_with(|| b.created.cmp(&a.created))
}

fn compare_by_mode(a: &GalleryItem, b: &GalleryItem, sort: SortMode) -> Ordering {
    match sort {
        // Only reachable when a caller bypasses `effective_sort`
        SortMode::Relevance | SortMode::Newest => b.created.cmp(&a.created),
        SortMode::Oldest => a.created.cmp(&b.created),
        SortMode::ViewsDesc => b.views_count().cmp(&a.views_count()),
        SortMode::ViewsAsc => a.views_count().cmp(&b.views_count()),
        SortMode::TitleAsc => a.index().title.text.cmp(&b.index().title.text),
        SortMode::TitleDesc => b.index().title.text.cmp(&a.index().title.text),
    }
}

/// Number of pages needed for `count` matches (at least 1)
pub fn total_pages(count: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    count.div_ceil(page_size).max(1)
}

/// Slice out 1-based page `page`
///
/// A page past the end is an empty slice, not an error. Page 0 is read as page 1.
pub fn paginate<T>(matches: &[T], page: usize, page_size: usize) -> &[T] {
    let page_size = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if start >= matches.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(matches.len());
    &matches[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorCategory;
    use crate::state::filters::ViewsRange;

    fn item(id: i64, title: &str, views: &str, created: i64) -> GalleryItem {
        let mut item = GalleryItem::new(id, title, views);
        item.created = created;
        item
    }

    fn ids(items: &[GalleryItem], positions: &[usize]) -> Vec<i64> {
        positions.iter().map(|p| items[*p].id).collect()
    }

    #[test]
    fn test_min_views_threshold() {
        let items = vec![
            item(1, "A", "910", 3),
            item(2, "B", "1.2k", 2),
            item(3, "C", "2m", 1),
        ];
        let filters = FilterState {
            min_views: Some(1_000),
            ..FilterState::default()
        };

        assert_eq!(ids(&items, &run_pipeline(&items, &filters)), vec![2, 3]);
    }

    #[test]
    fn test_equal_relevance_breaks_ties_on_views() {
        let items = vec![
            item(1, "Mountain Sunset", "1k", 10),
            item(2, "Sunset Beach", "5k", 5),
        ];
        let filters = FilterState {
            query: "sunset".to_string(),
            ..FilterState::default()
        };

        assert_eq!(ids(&items, &run_pipeline(&items, &filters)), vec![2, 1]);
    }

    #[test]
    fn test_ties_on_views_fall_back_to_recency() {
        let items = vec![item(1, "Lake", "1k", 10), item(2, "Lake", "1k", 20)];
        let filters = FilterState {
            query: "lake".to_string(),
            ..FilterState::default()
        };

        assert_eq!(ids(&items, &run_pipeline(&items, &filters)), vec![2, 1]);
    }

    #[test]
    fn test_query_drops_non_matches() {
        let items = vec![item(1, "Forest", "1k", 1), item(2, "Harbor", "1k", 2)];
        let filters = FilterState {
            query: "forest".to_string(),
            ..FilterState::default()
        };
        assert_eq!(ids(&items, &run_pipeline(&items, &filters)), vec![1]);
    }

    #[test]
    fn test_sort_modes() {
        let items = vec![
            item(1, "banana", "300", 2),
            item(2, "Apple", "100", 3),
            item(3, "cherry", "200", 1),
        ];
        let sorted = |sort| {
            let filters = FilterState {
                sort,
                ..FilterState::default()
            };
            ids(&items, &run_pipeline(&items, &filters))
        };

        assert_eq!(sorted(SortMode::Newest), vec![2, 1, 3]);
        assert_eq!(sorted(SortMode::Oldest), vec![3, 1, 2]);
        assert_eq!(sorted(SortMode::ViewsDesc), vec![1, 3, 2]);
        assert_eq!(sorted(SortMode::ViewsAsc), vec![2, 3, 1]);
        assert_eq!(sorted(SortMode::TitleAsc), vec![2, 1, 3]);
        assert_eq!(sorted(SortMode::TitleDesc), vec![3, 1, 2]);
        // No query: relevance behaves like the default order
        assert_eq!(sorted(SortMode::Relevance), vec![2, 1, 3]);
    }

    #[test]
    fn test_wordless_query_keeps_selected_sort() {
        let items = vec![
            item(1, "banana", "300", 2),
            item(2, "Apple", "100", 3),
            item(3, "cherry", "200", 1),
        ];

        for query in ["!!!", "--", "\"\""] {
            let filters = FilterState {
                query: query.to_string(),
                sort: SortMode::TitleDesc,
                ..FilterState::default()
            };
            assert_eq!(ids(&items, &run_pipeline(&items, &filters)), vec![3, 1, 2]);
        }
    }

    #[test]
    fn test_color_and_preset_constraints() {
        let mut red = item(1, "Poppies", "20k", 1);
        red.colors = vec!["crimson".to_string()];
        let mut blue = item(2, "Ocean", "20k", 2);
        blue.set_detected_colors([ColorCategory::Blue]);
        let mut cheap_red = item(3, "Brick", "50", 3);
        cheap_red.colors = vec!["red".to_string()];
        let items = vec![red, blue, cheap_red];

        let filters = FilterState {
            color: Some(ColorCategory::Red),
            preset: Some(ViewsRange::new(10_000, None)),
            ..FilterState::default()
        };
        assert_eq!(ids(&items, &run_pipeline(&items, &filters)), vec![1]);

        let blue_only = FilterState {
            color: Some(ColorCategory::Blue),
            ..FilterState::default()
        };
        assert_eq!(ids(&items, &run_pipeline(&items, &blue_only)), vec![2]);
    }

    #[test]
    fn test_pagination() {
        let matches: Vec<usize> = (1..=25).collect();

        assert_eq!(paginate(&matches, 1, 20), &matches[0..20]);
        assert_eq!(paginate(&matches, 2, 20), &[21, 22, 23, 24, 25]);
        assert!(paginate(&matches, 3, 20).is_empty());
        assert_eq!(paginate(&matches, 0, 20), paginate(&matches, 1, 20));
        assert_eq!(total_pages(25, 20), 2);
        assert_eq!(total_pages(0, 20), 1);
        assert_eq!(total_pages(40, 20), 2);
    }
}
