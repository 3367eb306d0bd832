//! Fixed-page-size pagination over in-memory collections

use serde::Serialize;

/// Default number of rows per page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One page of a filtered collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number
    pub page: usize,
    pub page_size: usize,
    /// `ceil(total_items / page_size)`
    pub total_pages: usize,
    /// Number of items after filtering
    pub total_items: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// 1-based position of the first item on this page (0 when empty)
    pub fn first_position(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.page - 1) * self.page_size + 1
        }
    }

    /// 1-based position of the last item on this page (0 when empty)
    pub fn last_position(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            self.first_position() + self.items.len() - 1
        }
    }
}

/// Number of pages needed for `total` items
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1))
}

/// Keep `page` inside `[1, max(1, page_count)]`
pub fn clamp_page(page: usize, total: usize, page_size: usize) -> usize {
    page.clamp(1, page_count(total, page_size).max(1))
}

/// Cut one page out of `items`; an out-of-range page is clamped
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let page = clamp_page(page, total_items, page_size);
    let start = (page - 1) * page_size;

    let items = items.into_iter().skip(start).take(page_size).collect();

    Page {
        items,
        page,
        page_size,
        total_pages: page_count(total_items, page_size),
        total_items,
    }
}
