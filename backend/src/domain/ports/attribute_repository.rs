//! Lookup-attribute persistence port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::attribute::{Attribute, AttributeKind, AttributeName, AttributeUsage};

use super::RepositoryError;

/// Durable storage for lookup attributes.
#[async_trait]
pub trait AttributeRepository: Send + Sync {
    /// List a kind's attributes with usage counts, ordered by name.
    ///
    /// Usage shares are computed by the caller; implementations return raw
    /// counts with `usage_share` left at zero.
    async fn list_with_usage(
        &self,
        kind: AttributeKind,
    ) -> Result<Vec<AttributeUsage>, RepositoryError>;

    /// Fetch one attribute by id.
    async fn find(&self, id: Uuid) -> Result<Option<Attribute>, RepositoryError>;

    /// Insert a new attribute.
    ///
    /// # Errors
    /// [`RepositoryError::DuplicateName`] when the name already exists within
    /// the kind.
    async fn create(
        &self,
        kind: AttributeKind,
        name: AttributeName,
    ) -> Result<Attribute, RepositoryError>;

    /// Count rows referencing the attribute across shoes, polishes, and
    /// their colour/finish join tables.
    async fn usage_count(&self, id: Uuid) -> Result<u64, RepositoryError>;

    /// Delete an attribute row. Returns `false` when the row was absent.
    ///
    /// Callers are expected to check [`AttributeRepository::usage_count`]
    /// first; this method does not guard.
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}
