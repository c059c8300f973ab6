//! Page-number based pagination.

use serde::Serialize;

/// One page of a listing.
///
/// Pages are numbered from 1. `total_pages` is never 0: an empty listing
/// still has one (empty) page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// `ceil(total / page_size)`, with a floor of one page.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    total.div_ceil(page_size).max(1)
}

impl<T> PageResult<T> {
    /// Wrap items already paged by the server.
    pub fn from_server(items: Vec<T>, page: usize, page_size: usize, total: usize) -> Self {
        Self {
            items,
            page: page.max(1),
            page_size,
            total,
            total_pages: total_pages(total, page_size),
        }
    }

    /// Slice page `page` out of a fully materialized list.
    ///
    /// The totals describe `all`, not whatever upstream listing it came from.
    pub fn paginate(all: Vec<T>, page: usize, page_size: usize) -> Self {
        let page = page.max(1);
        let total = all.len();
        let start = (page - 1).saturating_mul(page_size);
        let items = all.into_iter().skip(start).take(page_size).collect();
        Self {
            items,
            page,
            page_size,
            total,
            total_pages: total_pages(total, page_size),
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> PageResult<U> {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}
