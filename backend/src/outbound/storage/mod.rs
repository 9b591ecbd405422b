//! HTTP object-bucket image store.
//!
//! Uploads are plain `PUT {base_url}/{filename}` requests with an optional
//! bearer token, matching the bucket gateway's write API. The public URL is
//! the upload URL itself.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::domain::ports::{ImageStore, ImageStoreError, StoredImage};

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Image store writing to an HTTP bucket endpoint.
pub struct HttpBucketStore {
    client: Client,
    base_url: Url,
    bearer_token: Option<String>,
}

impl HttpBucketStore {
    /// Build a store uploading beneath `base_url`.
    ///
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, bearer_token: Option<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(UPLOAD_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url,
            bearer_token,
        })
    }

    fn object_url(&self, filename: &str) -> Result<Url, ImageStoreError> {
        self.base_url
            .join(filename)
            .map_err(|err| ImageStoreError::Transport {
                message: format!("object url for {filename:?}: {err}"),
            })
    }
}

#[async_trait]
impl ImageStore for HttpBucketStore {
    async fn put(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredImage, ImageStoreError> {
        let object_url = self.object_url(filename)?;
        let mut request = self
            .client
            .put(object_url.clone())
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .map_err(|err| ImageStoreError::Transport {
                message: err.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ImageStoreError::Status {
                status: status.as_u16(),
            });
        }
        tracing::info!(url = %object_url, "image stored");
        Ok(StoredImage {
            public_url: object_url.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_urls_join_beneath_the_base() {
        let store = HttpBucketStore::new(
            Url::parse("https://images.example.net/closet/").expect("valid url"),
            None,
        )
        .expect("client builds");
        let object = store
            .object_url("fluevog-adrian-20260820123005.jpg")
            .expect("join succeeds");
        assert_eq!(
            object.as_str(),
            "https://images.example.net/closet/fluevog-adrian-20260820123005.jpg"
        );
    }
}
