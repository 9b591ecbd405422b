//! Applying a chosen image candidate to a shoe.
//!
//! The selected candidate URL is downloaded, re-hosted in the image bucket
//! under a brand-and-label filename, and the bucket URL is persisted on the
//! shoe. The shoe record never points at the scraped origin.

use std::sync::Arc;

use chrono::Utc;
use url::Url;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::image_filename::image_filename;
use crate::domain::ports::{AttributeRepository, ImageStore, PageSource, ShoeRepository};

/// Outcome of an image selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    /// Shoe the image now belongs to.
    pub shoe_id: Uuid,
    /// Bucket URL persisted on the shoe.
    pub image_url: String,
}

/// Downloads a chosen candidate and attaches it to a shoe.
pub struct ImageSelectionService {
    shoes: Arc<dyn ShoeRepository>,
    attributes: Arc<dyn AttributeRepository>,
    pages: Arc<dyn PageSource>,
    store: Arc<dyn ImageStore>,
}

impl ImageSelectionService {
    /// Build the service over its four ports.
    pub fn new(
        shoes: Arc<dyn ShoeRepository>,
        attributes: Arc<dyn AttributeRepository>,
        pages: Arc<dyn PageSource>,
        store: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            shoes,
            attributes,
            pages,
            store,
        }
    }

    /// Download `candidate`, store it, and persist the stored URL on the
    /// shoe.
    ///
    /// # Errors
    /// Unknown shoes map to not-found; download and upload failures to the
    /// fetch and store error mappings.
    pub async fn apply(&self, shoe_id: Uuid, candidate: &Url) -> Result<SelectedImage, Error> {
        let Some(shoe) = self.shoes.find(shoe_id).await? else {
            return Err(Error::not_found("no such shoe"));
        };

        let brand_name = match shoe.brand_id {
            Some(brand_id) => self
                .attributes
                .find(brand_id)
                .await?
                .map(|attribute| attribute.name.as_str().to_owned()),
            None => None,
        };

        let fetched = self.pages.fetch_bytes(candidate).await?;
        let filename = image_filename(
            brand_name.as_deref(),
            &format!("shoe-{shoe_id}"),
            fetched.content_type.as_deref(),
            Utc::now(),
        );
        let content_type = fetched
            .content_type
            .unwrap_or_else(|| "application/octet-stream".to_owned());
        let stored = self
            .store
            .put(&filename, &content_type, fetched.bytes)
            .await?;

        if !self.shoes.set_image_url(shoe_id, &stored.public_url).await? {
            // Deleted between find and set; the upload is orphaned but
            // harmless.
            return Err(Error::not_found("no such shoe"));
        }
        tracing::info!(shoe = %shoe_id, url = %stored.public_url, "shoe image updated");
        Ok(SelectedImage {
            shoe_id,
            image_url: stored.public_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attribute::AttributeKind;
    use crate::domain::ports::{
        FetchedBytes, FetchedPage, ImageStoreError, InMemoryCollection, PageSourceError,
        StoredImage,
    };
    use crate::domain::shoe::ShoeDraft;
    use async_trait::async_trait;
    use rstest::rstest;
    use std::sync::Mutex;

    struct CannedBytes;

    #[async_trait]
    impl PageSource for CannedBytes {
        async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, PageSourceError> {
            Err(PageSourceError::Status {
                url: url.to_string(),
                status: 404,
            })
        }

        async fn fetch_bytes(&self, url: &Url) -> Result<FetchedBytes, PageSourceError> {
            Ok(FetchedBytes {
                final_url: url.clone(),
                bytes: vec![0xFF, 0xD8, 0xFF],
                content_type: Some("image/jpeg".to_owned()),
            })
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        uploads: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ImageStore for RecordingStore {
        async fn put(
            &self,
            filename: &str,
            _content_type: &str,
            _bytes: Vec<u8>,
        ) -> Result<StoredImage, ImageStoreError> {
            self.uploads
                .lock()
                .expect("uploads lock")
                .push(filename.to_owned());
            Ok(StoredImage {
                public_url: format!("https://images.example.net/{filename}"),
            })
        }
    }

    #[rstest]
    #[actix_rt::test]
    async fn selection_stores_bytes_and_updates_the_shoe() {
        let collection = Arc::new(InMemoryCollection::new());
        let brand = collection.seed_attribute(AttributeKind::Brand, "Irregular Choice");
        let shoe = ShoeRepository::create(
            collection.as_ref(),
            ShoeDraft {
                brand_id: Some(brand.id),
                ..ShoeDraft::default()
            },
        )
        .await
        .expect("create shoe");

        let store = Arc::new(RecordingStore::default());
        let service = ImageSelectionService::new(
            collection.clone(),
            collection.clone(),
            Arc::new(CannedBytes),
            store.clone(),
        );
        let candidate = Url::parse("https://cdn.example.com/product.jpg").expect("valid url");

        let selected = service.apply(shoe.id, &candidate).await.expect("apply");
        assert!(selected.image_url.starts_with("https://images.example.net/irregular-choice-"));
        assert!(selected.image_url.ends_with(".jpg"));

        let refreshed = ShoeRepository::find(collection.as_ref(), shoe.id)
            .await
            .expect("find")
            .expect("shoe exists");
        assert_eq!(refreshed.image_url.as_deref(), Some(selected.image_url.as_str()));
        assert_eq!(store.uploads.lock().expect("uploads lock").len(), 1);
    }

    #[rstest]
    #[actix_rt::test]
    async fn selection_for_unknown_shoe_is_not_found() {
        let collection = Arc::new(InMemoryCollection::new());
        let service = ImageSelectionService::new(
            collection.clone(),
            collection.clone(),
            Arc::new(CannedBytes),
            Arc::new(RecordingStore::default()),
        );
        let candidate = Url::parse("https://cdn.example.com/product.jpg").expect("valid url");

        let err = service
            .apply(Uuid::new_v4(), &candidate)
            .await
            .expect_err("unknown shoe");
        assert_eq!(err.code(), crate::domain::ErrorCode::NotFound);
    }
}
