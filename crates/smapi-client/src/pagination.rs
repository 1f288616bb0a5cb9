//! Cursor-style pagination for list operations
//!
//! List operations return one page per call. The caller feeds the page back
//! into `PageRequest::next_page` to get the request for the following page.

/// Paging parameters for a list call; unset fields are omitted from the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub next_token: Option<String>,
    pub max_results: Option<u32>,
}

impl PageRequest {
    /// First page with an optional size limit.
    pub fn first(max_results: Option<u32>) -> Self {
        Self {
            next_token: None,
            max_results,
        }
    }

    /// Request for the page after `page`, or `None` when `page` was the last.
    pub fn next_page<P: Paginated>(&self, page: &P) -> Option<PageRequest> {
        if !page.is_truncated() {
            return None;
        }
        page.next_token().map(|token| PageRequest {
            next_token: Some(token.to_string()),
            max_results: self.max_results,
        })
    }
}

/// A list response carrying `isTruncated` / `nextToken`.
pub trait Paginated {
    fn is_truncated(&self) -> bool;
    fn next_token(&self) -> Option<&str>;
}
