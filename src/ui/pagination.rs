//! Page-button model for the pagination control

/// Up to this many pages, every page gets a button
const SHOW_ALL_LIMIT: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSlot {
    Page { number: usize, current: bool },
    Ellipsis,
}

/// Everything the pagination control needs to draw itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub current: usize,
    pub total: usize,
    /// Target of the Previous button; `None` = disabled
    pub prev: Option<usize>,
    /// Target of the Next button; `None` = disabled
    pub next: Option<usize>,
    pub slots: Vec<PageSlot>,
}

impl Pagination {
    /// Control for page `current` of `total`; `None` when there is nothing to paginate
    pub fn new(current: usize, total: usize) -> Option<Self> {
        if total <= 1 {
            return None;
        }

        let page = |number: usize| PageSlot::Page {
            number,
            current: number == current,
        };

        let slots = if total <= SHOW_ALL_LIMIT {
            (1..=total).map(page).collect()
        } else {
            let window_start = current.saturating_sub(1).max(2);
            let window_end = (current + 1).min(total - 1);

            let mut slots = vec![page(1)];
            if window_start > 2 {
                slots.push(PageSlot::Ellipsis);
            }
            slots.extend((window_start..=window_end).map(page));
            if window_end < total - 1 {
                slots.push(PageSlot::Ellipsis);
            }
            slots.push(page(total));
            slots
        };

        Some(Self {
            current,
            total,
            prev: (current > 1).then(|| current - 1),
            next: (current < total).then(|| current + 1),
            slots,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pagination: &Pagination) -> Vec<String> {
        pagination
            .slots
            .iter()
            .map(|slot| match slot {
                PageSlot::Page { number, current: true } => format!("[{number}]"),
                PageSlot::Page { number, .. } => number.to_string(),
                PageSlot::Ellipsis => "...".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_single_page_has_no_control() {
        assert_eq!(Pagination::new(1, 1), None);
        assert_eq!(Pagination::new(1, 0), None);
    }

    #[test]
    fn test_short_ranges_show_every_page() {
        let p = Pagination::new(2, 7).unwrap();
        assert_eq!(labels(&p), vec!["1", "[2]", "3", "4", "5", "6", "7"]);
        assert_eq!((p.prev, p.next), (Some(1), Some(3)));
    }

    #[test]
    fn test_long_ranges_use_ellipses() {
        let start = Pagination::new(1, 12).unwrap();
        assert_eq!(labels(&start), vec!["[1]", "2", "...", "12"]);
        assert_eq!(start.prev, None);

        let middle = Pagination::new(6, 12).unwrap();
        assert_eq!(labels(&middle), vec!["1", "...", "5", "[6]", "7", "...", "12"]);

        let end = Pagination::new(12, 12).unwrap();
        assert_eq!(labels(&end), vec!["1", "...", "11", "[12]"]);
        assert_eq!(end.next, None);
    }

    #[test]
    fn test_no_ellipsis_next_to_the_edges() {
        let p = Pagination::new(3, 10).unwrap();
        assert_eq!(labels(&p), vec!["1", "2", "[3]", "4", "...", "10"]);
    }
}
