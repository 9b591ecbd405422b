//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and services and remain testable without I/O.

use std::sync::Arc;

use crate::domain::attribute_admin::AttributeAdminService;
use crate::domain::image_selection::ImageSelectionService;
use crate::domain::ports::{
    AttributeRepository, ImageCandidateSource, ImageStore, InMemoryCollection, PageSource,
    PolishRepository, ShoeRepository,
};
use crate::domain::reclassify::ReclassificationService;

/// Parameter object bundling the port implementations handlers need.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub attributes: Arc<dyn AttributeRepository>,
    pub shoes: Arc<dyn ShoeRepository>,
    pub polishes: Arc<dyn PolishRepository>,
    pub pages: Arc<dyn PageSource>,
    pub candidates: Arc<dyn ImageCandidateSource>,
    pub images: Arc<dyn ImageStore>,
}

/// Dependency bundle for HTTP handlers: raw ports plus the domain services
/// assembled over them.
#[derive(Clone)]
pub struct HttpState {
    pub attributes: Arc<dyn AttributeRepository>,
    pub shoes: Arc<dyn ShoeRepository>,
    pub polishes: Arc<dyn PolishRepository>,
    pub candidates: Arc<dyn ImageCandidateSource>,
    pub attribute_admin: Arc<AttributeAdminService>,
    pub reclassification: Arc<ReclassificationService>,
    pub image_selection: Arc<ImageSelectionService>,
    /// Password the single editor logs in with.
    pub editor_password: Arc<str>,
}

impl HttpState {
    /// Construct state from a ports bundle.
    pub fn new(ports: HttpStatePorts, editor_password: impl Into<Arc<str>>) -> Self {
        let HttpStatePorts {
            attributes,
            shoes,
            polishes,
            pages,
            candidates,
            images,
        } = ports;
        let attribute_admin = Arc::new(AttributeAdminService::new(attributes.clone()));
        let reclassification = Arc::new(ReclassificationService::new(polishes.clone()));
        let image_selection = Arc::new(ImageSelectionService::new(
            shoes.clone(),
            attributes.clone(),
            pages,
            images,
        ));
        Self {
            attributes,
            shoes,
            polishes,
            candidates,
            attribute_admin,
            reclassification,
            image_selection,
            editor_password: editor_password.into(),
        }
    }

    /// State backed entirely by in-memory fixtures, for tests and for
    /// running without a database.
    pub fn fixture(editor_password: impl Into<Arc<str>>) -> Self {
        Self::fixture_with(Arc::new(InMemoryCollection::new()), editor_password)
    }

    /// Fixture state over a caller-provided collection, so tests can seed
    /// it.
    pub fn fixture_with(
        collection: Arc<InMemoryCollection>,
        editor_password: impl Into<Arc<str>>,
    ) -> Self {
        use crate::domain::ports::{
            FetchedBytes, FetchedPage, ImageStoreError, PageSourceError, StoredImage,
        };
        use async_trait::async_trait;
        use url::Url;

        /// Page source answering 404 for everything; fixture mode has no
        /// outbound network.
        struct OfflinePageSource;

        #[async_trait]
        impl PageSource for OfflinePageSource {
            async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, PageSourceError> {
                Err(PageSourceError::Status {
                    url: url.to_string(),
                    status: 404,
                })
            }

            async fn fetch_bytes(&self, url: &Url) -> Result<FetchedBytes, PageSourceError> {
                Err(PageSourceError::Status {
                    url: url.to_string(),
                    status: 404,
                })
            }
        }

        /// Image store that accepts every upload and echoes a local URL.
        struct NullImageStore;

        #[async_trait]
        impl ImageStore for NullImageStore {
            async fn put(
                &self,
                filename: &str,
                _content_type: &str,
                _bytes: Vec<u8>,
            ) -> Result<StoredImage, ImageStoreError> {
                Ok(StoredImage {
                    public_url: format!("https://images.invalid/{filename}"),
                })
            }
        }

        let pages: Arc<dyn PageSource> = Arc::new(OfflinePageSource);
        let candidates = Arc::new(crate::outbound::scrape::HtmlCandidateExtractor::new(
            pages.clone(),
        ));
        Self::new(
            HttpStatePorts {
                attributes: collection.clone(),
                shoes: collection.clone(),
                polishes: collection,
                pages,
                candidates,
                images: Arc::new(NullImageStore),
            },
            editor_password,
        )
    }
}
