//! Row-range arithmetic, page-number fallback and page results.

use serde::{Deserialize, Serialize};

use crate::response::GridResponse;

/// Half-open row window requested by the grid (`startRow`..`endRow`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRange {
    pub start: u64,
    pub end: u64,
}

impl RowRange {
    #[must_use]
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Clip the window to a result set of `count` rows.
    ///
    /// Returns `None` when nothing falls inside: the start is at or past the
    /// end of the data, or the window is empty.
    #[must_use]
    pub fn bounds(&self, count: u64) -> Option<(u64, u64)> {
        if self.start >= count {
            return None;
        }
        let end = self.end.min(count);
        (end > self.start).then_some((self.start, end))
    }

    /// Slice an in-memory collection using [`RowRange::bounds`].
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let count = items.len() as u64;
        match self.bounds(count) {
            Some((start, end)) => {
                let start = usize::try_from(start).unwrap_or(usize::MAX);
                let end = usize::try_from(end).unwrap_or(usize::MAX);
                &items[start..end]
            }
            None => &[],
        }
    }
}

/// Page-number pagination used when the grid did not send a row range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    #[must_use]
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size,
        }
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// The equivalent row window.
    #[must_use]
    pub fn as_range(&self) -> RowRange {
        let start = self.offset();
        RowRange::new(start, start.saturating_add(self.page_size))
    }
}

/// Row counts reported back to the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCounts {
    /// Rows in the base query, before any grid filter.
    pub total: u64,
    /// Rows left after grid filters.
    pub filtered: u64,
}

impl GridCounts {
    #[must_use]
    pub fn new(total: u64, filtered: u64) -> Self {
        Self { total, filtered }
    }
}

/// One window of rows plus the counts needed for the response envelope.
#[derive(Clone, Debug, PartialEq)]
pub struct GridPage<T> {
    pub items: Vec<T>,
    pub counts: GridCounts,
}

impl<T> GridPage<T> {
    #[must_use]
    pub fn new(items: Vec<T>, counts: GridCounts) -> Self {
        Self { items, counts }
    }

    #[must_use]
    pub fn empty(counts: GridCounts) -> Self {
        Self {
            items: Vec::new(),
            counts,
        }
    }

    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> GridPage<U> {
        GridPage {
            items: self.items.into_iter().map(f).collect(),
            counts: self.counts,
        }
    }

    pub fn into_response(self) -> GridResponse<T> {
        GridResponse::new(self.items, self.counts)
    }
}
