//! Paging window arithmetic and paging cookies
//!
//! Window selection follows the service exactly:
//! 1. page size = requested count, or the default when 0
//! 2. page number = requested page, or 1 when 0
//! 3. start = (page - 1) * size
//! 4. take everything left when the set is smaller than a page, the
//!    remainder on the last page, else a full page
//! 5. a window reaching past the end is an empty page
//! 6. more records iff size - page_size * page > 0

use std::ops::Range;

use uuid::Uuid;

use crate::query::PagingInfo;
use crate::record::Record;

/// The slice of the match set returned as one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page_number: u32,
    pub page_size: u32,
    /// First index of the page in the match set
    pub start: usize,
    /// Records on the page
    pub take: usize,
    pub more_records: bool,
}

impl PageWindow {
    /// Computes the window for a match set of `total` records
    pub fn compute(total: usize, page_info: Option<&PagingInfo>, default_page_size: u32) -> Self {
        let page_size = page_info
            .map(|p| p.count)
            .filter(|&count| count > 0)
            .unwrap_or(default_page_size);
        let page_number = page_info
            .map(|p| p.page_number)
            .filter(|&page| page > 0)
            .unwrap_or(1);

        let size = total as i64;
        let ps = i64::from(page_size);
        let pn = i64::from(page_number);

        let start = (pn - 1).saturating_mul(ps);
        // Smaller than a page, or the last partial page: whatever is left
        let take = if size < ps || size - start < ps {
            (size - start).max(0)
        } else {
            ps
        };

        let more_records = size - ps.saturating_mul(pn) > 0;

        Self {
            page_number,
            page_size,
            start: if take == 0 { 0 } else { start as usize },
            take: take as usize,
            more_records,
        }
    }

    /// Index range of the page; empty when the page has no data
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.take
    }

    pub fn is_empty(&self) -> bool {
        self.take == 0
    }
}

/// Formats an id in braced, upper-case canonical form
pub fn braced_upper(id: Uuid) -> String {
    format!("{{{}}}", id.hyphenated()).to_uppercase()
}

/// Builds the paging cookie for a page bounded by `first` and `last`
pub fn paging_cookie(page_number: u32, first: &Record, last: &Record) -> String {
    format!(
        "<cookie page=\"{}\"><{}id last=\"{}\" first=\"{}\" /></cookie>",
        page_number,
        first.logical_name,
        braced_upper(last.id_or_nil()),
        braced_upper(first.id_or_nil()),
    )
}
