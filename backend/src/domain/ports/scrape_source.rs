//! Image candidate extraction port.

use async_trait::async_trait;
use url::Url;

use crate::domain::image_scrape::FilterMode;

use super::page_source::PageSourceError;

/// Produces deduplicated, normalised image candidates for a page.
#[async_trait]
pub trait ImageCandidateSource: Send + Sync {
    /// Fetch the page and return surviving candidates in first-seen order.
    async fn fetch_candidates(
        &self,
        page_url: &Url,
        mode: FilterMode,
    ) -> Result<Vec<Url>, PageSourceError>;
}
