//! Standard list response envelope.

use serde::{Deserialize, Serialize};

/// Pagination metadata for list responses.
#[derive(Serialize, Deserialize, Debug)]
pub struct PaginationMeta {
    /// Total number of items matching the query (across all pages)
    pub total: usize,
    /// Maximum number of items per page (request parameter)
    pub limit: usize,
    /// Number of items skipped (request parameter)
    pub offset: usize,
    /// True if more items are available after this page
    pub has_more: bool,
}

/// List response wrapper with pagination metadata.
#[derive(Serialize, Deserialize, Debug)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T: Serialize> ListResponse<T> {
    /// Create a paginated list response; `has_more` is derived from offset,
    /// page length, and total.
    pub fn new(data: Vec<T>, total: usize, limit: usize, offset: usize) -> Self {
        let has_more = offset + data.len() < total;
        Self {
            data,
            pagination: PaginationMeta {
                total,
                limit,
                offset,
                has_more,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_more_on_first_page() {
        let resp = ListResponse::new(vec![1, 2, 3], 10, 3, 0);
        assert!(resp.pagination.has_more);
    }

    #[test]
    fn test_no_more_on_last_page() {
        let resp = ListResponse::new(vec![9, 10], 10, 3, 8);
        assert!(!resp.pagination.has_more);
    }

    #[test]
    fn test_empty_result() {
        let resp: ListResponse<i32> = ListResponse::new(vec![], 0, 50, 0);
        assert!(!resp.pagination.has_more);
        assert_eq!(resp.pagination.total, 0);
    }
}
