// pipeline/paginate.rs — Fixed-size page slicing and the compact page bar.

use serde::Serialize;

pub const CATALOG_PAGE_SIZES: [usize; 4] = [6, 12, 24, 48];
pub const DEFAULT_CATALOG_PAGE_SIZE: usize = 12;
pub const LIBRARY_PAGE_SIZE: usize = 24;

/// Up to this many pages, the bar lists every page.
const MAX_VISIBLE_PAGES: usize = 5;

/// `max(1, ceil(total / size))`. An empty collection still has one page.
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1)).max(1)
}

// ---------------------------------------------------------------------------
// Page state
// ---------------------------------------------------------------------------

/// Zero-based page index plus page size, owned by a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageState {
    pub page_index: usize,
    pub page_size:  usize,
}

impl PageState {
    pub fn new(page_size: usize) -> Self {
        Self { page_index: 0, page_size: page_size.max(1) }
    }

    pub fn reset(&mut self) {
        self.page_index = 0;
    }

    /// Pull the index back into `[0, total_pages - 1]`.
    pub fn clamp(&mut self, total_items: usize) {
        let last = total_pages(total_items, self.page_size) - 1;
        self.page_index = self.page_index.min(last);
    }

    /// A size change always returns to the first page.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page_index = 0;
    }

    /// Jump to a zero-based page. Out-of-range and same-page requests are
    /// ignored; returns whether the index moved.
    pub fn go_to(&mut self, page_index: usize, total_items: usize) -> bool {
        if page_index >= total_pages(total_items, self.page_size) || page_index == self.page_index {
            return false;
        }
        self.page_index = page_index;
        true
    }

    pub fn next(&mut self, total_items: usize) -> bool {
        self.go_to(self.page_index + 1, total_items)
    }

    pub fn prev(&mut self, total_items: usize) -> bool {
        match self.page_index.checked_sub(1) {
            Some(index) => self.go_to(index, total_items),
            None => false,
        }
    }

    pub fn first(&mut self, total_items: usize) -> bool {
        self.go_to(0, total_items)
    }

    pub fn last(&mut self, total_items: usize) -> bool {
        self.go_to(total_pages(total_items, self.page_size) - 1, total_items)
    }
}

// ---------------------------------------------------------------------------
// Slicing
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    pub items:       &'a [T],
    pub total_items: usize,
    pub total_pages: usize,
    pub page_index:  usize,
    pub page_size:   usize,
}

impl<T> Page<'_, T> {
    /// One-based page number for display.
    pub fn current_page(&self) -> usize {
        self.page_index + 1
    }

    pub fn has_prev(&self) -> bool {
        self.page_index > 0
    }

    pub fn has_next(&self) -> bool {
        self.page_index + 1 < self.total_pages
    }

    pub fn markers(&self) -> Vec<PageMarker> {
        page_numbers(self.current_page(), self.total_pages)
    }

    pub fn range_label(&self) -> String {
        range_label(self.page_index, self.page_size, self.total_items)
    }
}

/// The page of `collection` that `state` points at. A stale index is clamped
/// to the last page rather than producing an empty slice.
pub fn slice<'a, T>(collection: &'a [T], state: &PageState) -> Page<'a, T> {
    let total_items = collection.len();
    let page_size = state.page_size.max(1);
    let total_pages = total_pages(total_items, page_size);
    let page_index = state.page_index.min(total_pages - 1);

    let start = (page_index * page_size).min(total_items);
    let end = (start + page_size).min(total_items);

    Page {
        items: &collection[start..end],
        total_items,
        total_pages,
        page_index,
        page_size,
    }
}

// ---------------------------------------------------------------------------
// Page bar
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageMarker {
    Page(usize),
    Ellipsis,
}

/// Compact page bar for one-based `current` out of `total` pages.
///
/// Beyond five pages the bar is the first page, the neighbours of `current`
/// and the last page, with an ellipsis wherever the neighbour window does not
/// touch the ends. The ellipsis is emitted even when it stands for a single
/// page.
pub fn page_numbers(current: usize, total: usize) -> Vec<PageMarker> {
    let total = total.max(1);
    if total <= MAX_VISIBLE_PAGES {
        return (1..=total).map(PageMarker::Page).collect();
    }

    let current = current.clamp(1, total);
    let left_bound = current.saturating_sub(1).max(2);
    let right_bound = (current + 1).min(total - 1);

    let mut markers = vec![PageMarker::Page(1)];
    if left_bound > 2 {
        markers.push(PageMarker::Ellipsis);
    }
    markers.extend((left_bound..=right_bound).map(PageMarker::Page));
    if right_bound < total - 1 {
        markers.push(PageMarker::Ellipsis);
    }
    markers.push(PageMarker::Page(total));
    markers
}

/// `"13-24 of 40"`. An empty collection reads `"0-0 of 0"`.
pub fn range_label(page_index: usize, page_size: usize, total_items: usize) -> String {
    if total_items == 0 || page_size == 0 {
        return format!("0-0 of {total_items}");
    }
    let start = (page_index * page_size).min(total_items);
    let end = (start + page_size).min(total_items);
    format!("{}-{} of {}", start + 1, end, total_items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_never_zero() {
        assert_eq!(total_pages(0, 12), 1);
        assert_eq!(total_pages(12, 12), 1);
        assert_eq!(total_pages(13, 12), 2);
    }

    #[test]
    fn test_slice_clamps_stale_index() {
        let data: Vec<u32> = (0..30).collect();
        let page = slice(&data, &PageState { page_index: 9, page_size: 12 });
        assert_eq!(page.page_index, 2);
        assert_eq!(page.items, &data[24..30]);
        assert!(!page.has_next());
        assert!(page.has_prev());
        assert_eq!(page.range_label(), "25-30 of 30");
    }

    #[test]
    fn test_navigation_ignores_out_of_range_and_same_page() {
        let mut state = PageState::new(10);
        assert!(!state.go_to(0, 25));
        assert!(!state.go_to(3, 25));
        assert!(state.last(25));
        assert_eq!(state.page_index, 2);
        assert!(!state.next(25));
        assert!(state.prev(25));
        assert!(state.first(25));
        assert!(!state.prev(25));
    }

    #[test]
    fn test_page_size_change_resets() {
        let mut state = PageState { page_index: 3, page_size: 6 };
        state.set_page_size(24);
        assert_eq!(state, PageState { page_index: 0, page_size: 24 });
    }

    #[test]
    fn test_literal_ellipsis_for_single_gap() {
        use PageMarker::*;
        assert_eq!(page_numbers(4, 6), vec![Page(1), Ellipsis, Page(3), Page(4), Page(5), Page(6)]);
    }

    #[test]
    fn test_range_label_empty() {
        assert_eq!(range_label(0, 12, 0), "0-0 of 0");
        assert_eq!(range_label(1, 12, 40), "13-24 of 40");
    }
}
