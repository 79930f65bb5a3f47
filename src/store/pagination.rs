use serde::Serialize;

use crate::api::types::PaginationMeta;

/// Fixed number of listings per page
pub const PAGE_SIZE: u32 = 12;

/// Pages shown on either side of the current page in the page strip
const WINDOW_DELTA: u32 = 2;

/// Pagination of the visible list, normalised from server metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub page_size: u32,
}

impl PaginationState {
    /// An empty result set still has one (empty) page
    pub fn from_meta(meta: &PaginationMeta) -> Self {
        let total_pages = if meta.total_count == 0 {
            1
        } else {
            meta.total_pages.max(1)
        };

        Self {
            current_page: meta.current_page.clamp(1, total_pages),
            total_pages,
            total_count: meta.total_count,
            page_size: if meta.limit == 0 { PAGE_SIZE } else { meta.limit },
        }
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_prev_page(&self) -> bool {
        self.current_page > 1
    }

    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    pub fn clamp_page(&self, page: u32) -> u32 {
        page.clamp(1, self.total_pages)
    }

    /// Numbered links for the page strip; `None` marks an ellipsis
    pub fn window(&self) -> Vec<Option<u32>> {
        page_window(self.current_page, self.total_pages)
    }
}

fn page_window(current_page: u32, total_pages: u32) -> Vec<Option<u32>> {
    if total_pages <= 1 {
        return vec![];
    }

    let mut pages = vec![Some(1)];

    let start = current_page.saturating_sub(WINDOW_DELTA).max(2);
    let end = (current_page + WINDOW_DELTA).min(total_pages - 1);

    if start > 2 {
        pages.push(None);
    }
    pages.extend((start..=end).map(Some));
    if end + 1 < total_pages {
        pages.push(None);
    }

    pages.push(Some(total_pages));
    pages
}
