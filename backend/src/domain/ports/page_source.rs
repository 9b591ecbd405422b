//! Outbound page fetching port.

use async_trait::async_trait;
use url::Url;

/// A fetched HTML document and the URL it finally resolved to after
/// redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Location the body was served from.
    pub final_url: Url,
    /// Decoded response body.
    pub body: String,
}

/// Raw fetched bytes, for image downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBytes {
    /// Location the body was served from.
    pub final_url: Url,
    /// Response body.
    pub bytes: Vec<u8>,
    /// `Content-Type` header value, when the server sent one.
    pub content_type: Option<String>,
}

/// Failures surfaced by page fetching.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageSourceError {
    /// The URL could not be parsed or used.
    #[error("invalid url: {message}")]
    InvalidUrl {
        /// Description of the defect.
        message: String,
    },
    /// The request timed out, retries included.
    #[error("timed out fetching {url}")]
    Timeout {
        /// URL being fetched.
        url: String,
    },
    /// Transport-level failure, retries included.
    #[error("transport failure fetching {url}: {message}")]
    Transport {
        /// URL being fetched.
        url: String,
        /// Adapter-provided description.
        message: String,
    },
    /// A non-success status that is not retried (4xx).
    #[error("{url} answered status {status}")]
    Status {
        /// URL being fetched.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// Retries were exhausted on retryable failures (5xx, transport,
    /// timeout).
    #[error("retries exhausted fetching {url}: {message}")]
    RetriesExhausted {
        /// URL being fetched.
        url: String,
        /// Last failure observed.
        message: String,
    },
    /// The redirect budget was spent without reaching a terminal response.
    #[error("too many redirects fetching {url}")]
    TooManyRedirects {
        /// URL the chain started from.
        url: String,
    },
}

impl From<PageSourceError> for crate::domain::Error {
    fn from(value: PageSourceError) -> Self {
        match value {
            PageSourceError::InvalidUrl { .. } => Self::invalid_request(value.to_string()),
            other => {
                tracing::warn!(error = %other, "page fetch failed");
                Self::new(crate::domain::ErrorCode::InternalError, other.to_string())
            }
        }
    }
}

/// Fetches remote pages and image bytes.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch a page body, following redirects and retrying per policy.
    async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, PageSourceError>;

    /// Fetch raw bytes, following redirects and retrying per policy.
    async fn fetch_bytes(&self, url: &Url) -> Result<FetchedBytes, PageSourceError>;
}
