//! Shoe persistence port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::page::PageRequest;
use crate::domain::shoe::{Shoe, ShoeDraft, ShoeFilter, SortOrder};

use super::RepositoryError;

/// One list-view query: filters, sort, and page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShoeListRequest {
    /// Attribute filters.
    pub filter: ShoeFilter,
    /// Sort order.
    pub sort: SortOrder,
    /// Page window.
    pub page: PageRequest,
}

/// Durable storage for shoes and their colour links.
#[async_trait]
pub trait ShoeRepository: Send + Sync {
    /// One page of shoes plus the total count of matching rows.
    async fn list(&self, request: &ShoeListRequest) -> Result<(Vec<Shoe>, u64), RepositoryError>;

    /// Fetch one shoe with its colour links.
    async fn find(&self, id: Uuid) -> Result<Option<Shoe>, RepositoryError>;

    /// Insert a shoe and its colour links.
    async fn create(&self, draft: ShoeDraft) -> Result<Shoe, RepositoryError>;

    /// Replace a shoe's fields and colour set. Returns `None` when absent.
    async fn update(&self, id: Uuid, draft: ShoeDraft) -> Result<Option<Shoe>, RepositoryError>;

    /// Delete a shoe, cascading its colour links. Returns `false` when
    /// absent.
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;

    /// Persist a freshly stored image URL. Returns `false` when absent.
    async fn set_image_url(&self, id: Uuid, image_url: &str) -> Result<bool, RepositoryError>;
}
