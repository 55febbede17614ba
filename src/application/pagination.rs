//! Page-number pagination shared by admin listings.

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// One-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, page_size: u32) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Every row in one page, for small collections and exports.
    pub fn all() -> Self {
        Self {
            page: 1,
            page_size: u32::MAX,
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        let size = u64::from(request.page_size);
        let pages = total.div_ceil(size).max(1);
        Self {
            items,
            page: request.page,
            page_size: request.page_size,
            total,
            total_pages: u32::try_from(pages).unwrap_or(u32::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_clamps_inputs() {
        let request = PageRequest::new(Some(0), 0);
        assert_eq!(request.page, 1);
        assert_eq!(request.page_size, 1);

        let request = PageRequest::new(Some(3), 12);
        assert_eq!(request.offset(), 24);
        assert_eq!(request.limit(), 12);
    }

    #[test]
    fn total_pages_rounds_up_and_never_hits_zero() {
        let request = PageRequest::new(Some(1), 12);
        assert_eq!(Paginated::<u8>::new(vec![], request, 0).total_pages, 1);
        assert_eq!(Paginated::<u8>::new(vec![], request, 12).total_pages, 1);
        assert_eq!(Paginated::<u8>::new(vec![], request, 13).total_pages, 2);
    }
}
