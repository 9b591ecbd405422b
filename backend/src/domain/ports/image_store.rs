//! Object-bucket storage port for shoe images.

use async_trait::async_trait;

/// Outcome of storing an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Public URL the image is now served from.
    pub public_url: String,
}

/// Failures surfaced by the image store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageStoreError {
    /// The bucket could not be reached.
    #[error("image store transport failure: {message}")]
    Transport {
        /// Adapter-provided description.
        message: String,
    },
    /// The bucket rejected the upload.
    #[error("image store answered status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },
}

impl From<ImageStoreError> for crate::domain::Error {
    fn from(value: ImageStoreError) -> Self {
        tracing::error!(error = %value, "image upload failed");
        Self::internal("image upload failed")
    }
}

/// Stores image bytes under a caller-chosen filename.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Upload `bytes` as `filename`, returning the public URL.
    async fn put(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredImage, ImageStoreError>;
}
