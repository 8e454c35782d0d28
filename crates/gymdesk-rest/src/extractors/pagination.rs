//! Pagination extractor.

use gymdesk_core::PageRequest;
use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters for pagination: `?page=&limit=` (`size` is accepted too).
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// 1-based page number.
    #[serde(default)]
    pub page: Option<u32>,
    /// Items per page, capped at 100.
    #[serde(default, alias = "size")]
    pub limit: Option<u32>,
}

impl From<PaginationQuery> for PageRequest {
    fn from(query: PaginationQuery) -> Self {
        PageRequest::new(
            query.page.unwrap_or(1),
            query.limit.unwrap_or(PageRequest::DEFAULT_SIZE),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::Uri;

    fn parse(uri: &str) -> PageRequest {
        let uri: Uri = uri.parse().unwrap();
        let Query(query) = Query::<PaginationQuery>::try_from_uri(&uri).unwrap();
        query.into()
    }

    #[test]
    fn test_defaults() {
        assert_eq!(parse("/users"), PageRequest::new(1, 10));
    }

    #[test]
    fn test_limit_and_size_alias() {
        assert_eq!(parse("/users?page=3&limit=25"), PageRequest::new(3, 25));
        assert_eq!(parse("/users?page=2&size=5"), PageRequest::new(2, 5));
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let page = parse("/users?page=0&limit=1000");
        assert_eq!(page.page, 1);
        assert_eq!(page.size, PageRequest::MAX_SIZE);
    }
}
