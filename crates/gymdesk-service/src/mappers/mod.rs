//! Entity-DTO mappers.
//!
//! One-to-one conversions live as `From` impls next to the DTOs. This module
//! holds the paged list envelope shared by every list endpoint.

use gymdesk_core::{Page, PageInfo};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A page of DTOs: `{"items": [...], "pagination": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> PageResponse<T> {
    /// Maps each entity of `page` into its response type.
    pub fn from_page<E, F: FnMut(E) -> T>(page: Page<E>, f: F) -> Self {
        let page = page.map(f);
        Self {
            items: page.content,
            pagination: page.info,
        }
    }
}

impl<T> From<Page<T>> for PageResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            items: page.content,
            pagination: page.info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gymdesk_core::PageRequest;

    #[test]
    fn test_page_response_shape() {
        let page = Page::new(vec![1, 2], PageRequest::new(2, 2), 5);
        let response = PageResponse::from_page(page, |n: i32| n * 10);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["items"], serde_json::json!([10, 20]));
        assert_eq!(json["pagination"]["total"], 5);
        assert_eq!(json["pagination"]["total_pages"], 3);
        assert_eq!(json["pagination"]["has_next"], true);
        assert_eq!(json["pagination"]["has_prev"], true);
    }
}
