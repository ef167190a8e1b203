//! Page window computation

/// Which slice of the sorted rows is visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Page index after clamping
    pub page_index: usize,
    pub page_count: usize,
    /// Start offset into the sorted rows (inclusive)
    pub start: usize,
    /// End offset into the sorted rows (exclusive)
    pub end: usize,
}

/// Compute the visible window for `total` rows.
///
/// `page_count = ceil(total / page_size)`. A page index past the end is
/// clamped to the last page; with no rows the index is 0 and the window empty.
/// A zero page size is treated as 1.
pub fn page_window(total: usize, page_index: usize, page_size: usize) -> PageWindow {
    let page_size = page_size.max(1);
    let page_count = total.div_ceil(page_size);

    if page_count == 0 {
        return PageWindow {
            page_index: 0,
            page_count: 0,
            start: 0,
            end: 0,
        };
    }

    let page_index = page_index.min(page_count - 1);
    let start = page_index * page_size;
    let end = (start + page_size).min(total);

    PageWindow {
        page_index,
        page_count,
        start,
        end,
    }
}

/// Slice the current page out of `sorted`
pub fn paginate<T>(sorted: &[T], page_index: usize, page_size: usize) -> (&[T], PageWindow) {
    let window = page_window(sorted.len(), page_index, page_size);
    (&sorted[window.start..window.end], window)
}
