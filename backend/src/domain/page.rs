//! Offset pagination primitives shared by list endpoints.

use serde::Serialize;
use utoipa::ToSchema;

/// Default page size for list views.
pub const DEFAULT_PER_PAGE: u32 = 24;
/// Upper bound on page size.
pub const MAX_PER_PAGE: u32 = 100;

/// Validation failures for page requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// `page` was zero; pages are 1-based.
    #[error("page must be at least 1")]
    ZeroPage,
    /// `per_page` was zero or above [`MAX_PER_PAGE`].
    #[error("per_page must be between 1 and {MAX_PER_PAGE}")]
    PerPageOutOfRange,
}

/// A validated 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Validate a raw page/per-page pair.
    pub fn new(page: u32, per_page: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(PageRequestError::PerPageOutOfRange);
        }
        Ok(Self { page, per_page })
    }

    /// 1-based page number.
    pub fn page(self) -> u32 {
        self.page
    }

    /// Items per page.
    pub fn per_page(self) -> u32 {
        self.per_page
    }

    /// Row offset for SQL `OFFSET`.
    pub fn offset(self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }

    /// Row limit for SQL `LIMIT`.
    pub fn limit(self) -> i64 {
        i64::from(self.per_page)
    }
}

/// Response envelope for paginated list endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    /// Items on this page, in requested order.
    pub items: Vec<T>,
    /// 1-based page number echoed back.
    pub page: u32,
    /// Page size echoed back.
    pub per_page: u32,
    /// Total matching rows across all pages.
    pub total: u64,
}

impl<T> PageEnvelope<T> {
    /// Wrap one page of results.
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page(),
            per_page: request.per_page(),
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_are_first_page() {
        let request = PageRequest::default();
        assert_eq!(request.page(), 1);
        assert_eq!(request.per_page(), DEFAULT_PER_PAGE);
        assert_eq!(request.offset(), 0);
    }

    #[rstest]
    #[case(1, 24, 0)]
    #[case(2, 24, 24)]
    #[case(5, 10, 40)]
    fn offset_follows_page(#[case] page: u32, #[case] per_page: u32, #[case] expected: i64) {
        let request = PageRequest::new(page, per_page).expect("valid request");
        assert_eq!(request.offset(), expected);
    }

    #[rstest]
    #[case(0, 24, PageRequestError::ZeroPage)]
    #[case(1, 0, PageRequestError::PerPageOutOfRange)]
    #[case(1, MAX_PER_PAGE + 1, PageRequestError::PerPageOutOfRange)]
    fn invalid_requests_are_rejected(
        #[case] page: u32,
        #[case] per_page: u32,
        #[case] expected: PageRequestError,
    ) {
        assert_eq!(PageRequest::new(page, per_page).expect_err("invalid"), expected);
    }
}
