//! Pagination windows for list pages

use serde::{Deserialize, Serialize};

/// Default number of page links shown
pub const DEFAULT_WINDOW_SIZE: usize = 15;

/// A page of a list plus the page links around it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page (1-based)
    pub page_num: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub record_count: usize,
    /// Page numbers to link to, ascending
    pub page_nums: Vec<usize>,
}

impl Pagination {
    /// Compute pagination for `record_count` records
    ///
    /// A `page_num` of 0 is treated as 1. A `page_size` or `window_size` of 0
    /// is treated as 1.
    #[must_use]
    pub fn paginate(
        page_num: usize,
        page_size: usize,
        record_count: usize,
        window_size: usize,
    ) -> Self {
        let page_num = page_num.max(1);
        let page_size = page_size.max(1);
        let window_size = window_size.max(1);
        let page_count = record_count.div_ceil(page_size);

        let page_nums = if page_count == 0 {
            Vec::new()
        } else {
            let half = window_size / 2;
            let start = page_num.saturating_sub(half).max(1);
            let end = (start + window_size - 1).min(page_count);
            let start = (end + 1).saturating_sub(window_size).max(1);
            (start..=end).collect()
        };

        Self {
            page_num,
            page_size,
            page_count,
            record_count,
            page_nums,
        }
    }

    /// Index of the first record on the current page
    #[inline]
    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page_num - 1).saturating_mul(self.page_size)
    }

    /// Slice the current page out of a full record list
    #[must_use]
    pub fn slice<'a, T>(&self, records: &'a [T]) -> &'a [T] {
        let start = self.offset().min(records.len());
        let end = start.saturating_add(self.page_size).min(records.len());
        &records[start..end]
    }
}
