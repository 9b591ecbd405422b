//! Ports: async traits the domain depends on, implemented by adapters.
//!
//! Outbound adapters (Diesel repositories, the reqwest fetcher, the bucket
//! store) implement these traits; inbound handlers and domain services only
//! ever see the trait objects. In-memory fixture implementations back the
//! server when no database is configured and keep handler tests free of I/O.

mod attribute_repository;
mod image_store;
mod memory;
mod page_source;
mod polish_repository;
mod scrape_source;
mod shoe_repository;

pub use attribute_repository::AttributeRepository;
pub use image_store::{ImageStore, ImageStoreError, StoredImage};
pub use memory::InMemoryCollection;
pub use page_source::{FetchedBytes, FetchedPage, PageSource, PageSourceError};
pub use polish_repository::{PolishAssignment, PolishListRequest, PolishRepository};
pub use scrape_source::ImageCandidateSource;
pub use shoe_repository::{ShoeListRequest, ShoeRepository};

use crate::domain::Error;

/// Failures shared by the persistence ports.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// The backing store could not be reached.
    #[error("repository connection failure: {message}")]
    Connection {
        /// Adapter-provided description.
        message: String,
    },
    /// A query failed in the backing store.
    #[error("repository query failure: {message}")]
    Query {
        /// Adapter-provided description.
        message: String,
    },
    /// A unique name constraint was violated.
    #[error("name already exists")]
    DuplicateName,
}

impl RepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

impl From<RepositoryError> for Error {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::DuplicateName => {
                Self::invalid_request("an attribute with that name already exists")
            }
            RepositoryError::Connection { message } | RepositoryError::Query { message } => {
                tracing::error!(error = %message, "repository failure");
                Self::internal("storage failure")
            }
        }
    }
}
