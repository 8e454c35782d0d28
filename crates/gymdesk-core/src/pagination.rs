//! Pagination types for list operations.
//!
//! Every list endpoint pages the same way: 1-based `page`, a `limit` capped at
//! [`PageRequest::MAX_SIZE`], and a response carrying the total count plus
//! next/previous flags.

use serde::{Deserialize, Serialize};

/// A request for a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// The page number (1-indexed).
    pub page: u32,
    /// The number of items per page.
    pub size: u32,
}

impl PageRequest {
    /// The default page size.
    pub const DEFAULT_SIZE: u32 = 10;
    /// The maximum allowed page size.
    pub const MAX_SIZE: u32 = 100;

    /// Creates a new page request, clamping out-of-range values.
    ///
    /// Page 0 becomes page 1, size 0 becomes the default size and anything
    /// above the maximum is capped.
    #[must_use]
    pub fn new(page: u32, size: u32) -> Self {
        let size = match size {
            0 => Self::DEFAULT_SIZE,
            s => s.min(Self::MAX_SIZE),
        };
        Self {
            page: page.max(1),
            size,
        }
    }

    /// Creates a page request for the first page with default size.
    #[must_use]
    pub fn first() -> Self {
        Self::new(1, Self::DEFAULT_SIZE)
    }

    /// Returns the offset for database queries.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page.saturating_sub(1) as u64) * self.size as u64
    }

    /// Returns the limit for database queries.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.size as u64
    }

    /// Slices an in-memory collection the way `LIMIT/OFFSET` would.
    #[must_use]
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        items
            .iter()
            .skip(offset)
            .take(self.size as usize)
            .cloned()
            .collect()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// Information about a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PageInfo {
    /// The current page number (1-indexed).
    pub page: u32,
    /// The number of items per page.
    #[serde(rename = "limit")]
    pub size: u32,
    /// The total number of items across all pages.
    #[serde(rename = "total")]
    pub total_elements: u64,
    /// The total number of pages.
    pub total_pages: u64,
    /// Whether a page follows this one.
    pub has_next: bool,
    /// Whether a page precedes this one.
    #[serde(rename = "has_prev")]
    pub has_previous: bool,
}

impl PageInfo {
    /// Creates a new page info.
    #[must_use]
    pub fn new(request: PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size);
        let total_pages = if size > 0 {
            total_elements.div_ceil(size)
        } else {
            0
        };

        Self {
            page: request.page,
            size: request.size,
            total_elements,
            total_pages,
            has_next: u64::from(request.page) < total_pages,
            has_previous: request.page > 1,
        }
    }
}

/// A page of results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// The items on this page.
    #[serde(rename = "items")]
    pub content: Vec<T>,
    /// Information about this page.
    #[serde(rename = "pagination")]
    pub info: PageInfo,
}

impl<T> Page<T> {
    /// Creates a new page.
    #[must_use]
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            info: PageInfo::new(request, total_elements),
        }
    }

    /// Creates an empty page.
    #[must_use]
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    /// Maps the page content to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            info: self.info,
        }
    }

    /// Returns true if the page is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Returns the total number of elements across all pages.
    #[must_use]
    pub const fn total_elements(&self) -> u64 {
        self.info.total_elements
    }

    /// Returns the total number of pages.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.info.total_pages
    }

    /// Returns true if there is a next page.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.info.has_next
    }

    /// Returns true if there is a previous page.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.info.has_previous
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.content.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request() {
        let req = PageRequest::new(3, 10);
        assert_eq!(req.offset(), 20);
        assert_eq!(req.limit(), 10);
    }

    #[test]
    fn test_page_request_clamping() {
        assert_eq!(PageRequest::new(0, 10).page, 1);
        assert_eq!(PageRequest::new(1, 0).size, PageRequest::DEFAULT_SIZE);
        assert_eq!(PageRequest::new(1, 1000).size, PageRequest::MAX_SIZE);
    }

    #[test]
    fn test_page_request_first() {
        let req = PageRequest::first();
        assert_eq!(req.page, 1);
        assert_eq!(req.offset(), 0);
        assert_eq!(req, PageRequest::default());
    }

    #[test]
    fn test_slice() {
        let items: Vec<u32> = (1..=25).collect();
        assert_eq!(PageRequest::new(3, 10).slice(&items), vec![21, 22, 23, 24, 25]);
        assert!(PageRequest::new(4, 10).slice(&items).is_empty());
    }

    #[test]
    fn test_page_info_first_page() {
        let page: Page<i32> = Page::new(vec![1, 2, 3], PageRequest::new(1, 10), 25);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_page_info_last_page() {
        let page: Page<i32> = Page::new(vec![1, 2], PageRequest::new(3, 10), 22);
        assert!(!page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn test_page_single_page() {
        let page = Page::new(vec![1, 2, 3], PageRequest::new(1, 10), 3);
        assert_eq!(page.total_pages(), 1);
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_page_empty() {
        let page: Page<i32> = Page::empty(PageRequest::first());
        assert!(page.is_empty());
        assert_eq!(page.len(), 0);
        assert_eq!(page.total_pages(), 0);
        assert!(!page.has_next());
    }

    #[test]
    fn test_page_map() {
        let page = Page::new(vec![1, 2, 3], PageRequest::first(), 3);
        let mapped = page.map(|x| x * 2);
        assert_eq!(mapped.content, vec![2, 4, 6]);
    }

    #[test]
    fn test_page_json_shape() {
        let page = Page::new(vec!["a"], PageRequest::new(2, 1), 3);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["items"][0], "a");
        assert_eq!(json["pagination"]["page"], 2);
        assert_eq!(json["pagination"]["limit"], 1);
        assert_eq!(json["pagination"]["total"], 3);
        assert_eq!(json["pagination"]["total_pages"], 3);
        assert_eq!(json["pagination"]["has_next"], true);
        assert_eq!(json["pagination"]["has_prev"], true);
    }
}
