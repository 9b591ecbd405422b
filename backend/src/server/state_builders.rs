//! Assembling the HTTP state from configuration.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::ports::{ImageStore, ImageStoreError, PageSource, StoredImage};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::fetch::{HttpPageFetcher, RetryPolicy};
use crate::outbound::persistence::{
    DieselAttributeRepository, DieselPolishRepository, DieselShoeRepository,
};
use crate::outbound::scrape::HtmlCandidateExtractor;
use crate::outbound::storage::HttpBucketStore;

use super::config::{BucketConfig, ServerConfig};

/// Stand-in store used when no bucket is configured; uploads fail with a
/// clear message instead of silently going nowhere.
struct UnconfiguredImageStore;

#[async_trait]
impl ImageStore for UnconfiguredImageStore {
    async fn put(
        &self,
        _filename: &str,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<StoredImage, ImageStoreError> {
        Err(ImageStoreError::Transport {
            message: "no image bucket configured".to_owned(),
        })
    }
}

fn build_image_store(bucket: Option<&BucketConfig>) -> std::io::Result<Arc<dyn ImageStore>> {
    match bucket {
        Some(bucket) => {
            let store = HttpBucketStore::new(bucket.base_url.clone(), bucket.bearer_token.clone())
                .map_err(|err| {
                    std::io::Error::other(format!("image bucket client construction failed: {err}"))
                })?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("no image bucket configured; image selection will fail");
            Ok(Arc::new(UnconfiguredImageStore))
        }
    }
}

/// Build the handler state: Diesel repositories when a pool is configured,
/// in-memory fixtures otherwise.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let Some(pool) = &config.db_pool else {
        tracing::warn!("no database configured; serving in-memory fixtures");
        return Ok(HttpState::fixture(config.editor_password.as_str()));
    };

    let pages: Arc<dyn PageSource> = Arc::new(
        HttpPageFetcher::with_policy(Duration::from_secs(30), RetryPolicy::default()).map_err(
            |err| std::io::Error::other(format!("fetch client construction failed: {err}")),
        )?,
    );
    let candidates = Arc::new(HtmlCandidateExtractor::new(pages.clone()));
    let images = build_image_store(config.bucket.as_ref())?;

    Ok(HttpState::new(
        HttpStatePorts {
            attributes: Arc::new(DieselAttributeRepository::new(pool.clone())),
            shoes: Arc::new(DieselShoeRepository::new(pool.clone())),
            polishes: Arc::new(DieselPolishRepository::new(pool.clone())),
            pages,
            candidates,
            images,
        },
        config.editor_password.as_str(),
    ))
}
