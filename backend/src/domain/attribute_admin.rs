//! Attribute management: listing with usage shares, creation, guarded
//! deletion.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::attribute::{
    Attribute, AttributeKind, AttributeName, AttributeUsage, with_usage_shares,
};
use crate::domain::ports::{AttributeRepository, RepositoryError};

/// Orchestrates attribute reads and writes over the repository port.
pub struct AttributeAdminService {
    attributes: Arc<dyn AttributeRepository>,
}

impl AttributeAdminService {
    /// Build the service over an attribute repository.
    pub fn new(attributes: Arc<dyn AttributeRepository>) -> Self {
        Self { attributes }
    }

    /// List one kind's attributes with usage counts and percentage shares.
    ///
    /// # Errors
    /// Storage failures map to internal errors.
    pub async fn list(&self, kind: AttributeKind) -> Result<Vec<AttributeUsage>, Error> {
        let rows = self.attributes.list_with_usage(kind).await?;
        Ok(with_usage_shares(rows))
    }

    /// Create an attribute, rejecting duplicate names within the kind.
    ///
    /// # Errors
    /// Duplicate names map to invalid-request; storage failures to internal
    /// errors.
    pub async fn create(&self, kind: AttributeKind, name: AttributeName) -> Result<Attribute, Error> {
        match self.attributes.create(kind, name.clone()).await {
            Ok(attribute) => Ok(attribute),
            Err(RepositoryError::DuplicateName) => Err(Error::invalid_request(format!(
                "a {kind} named {:?} already exists",
                name.as_str()
            ))),
            Err(other) => Err(other.into()),
        }
    }

    /// Delete an unused attribute and return the kind's refreshed listing.
    ///
    /// The delete is refused while any shoe or polish still references the
    /// attribute; the conflict error carries the live usage count so the
    /// client can show it.
    ///
    /// # Errors
    /// Unknown ids map to not-found, referenced attributes to conflict, and
    /// storage failures to internal errors.
    pub async fn delete(&self, id: Uuid) -> Result<Vec<AttributeUsage>, Error> {
        let Some(attribute) = self.attributes.find(id).await? else {
            return Err(Error::not_found("no such attribute"));
        };
        let usage = self.attributes.usage_count(id).await?;
        if usage > 0 {
            return Err(Error::conflict(format!(
                "{} {:?} is still in use",
                attribute.kind,
                attribute.name.as_str()
            ))
            .with_details(json!({ "usageCount": usage })));
        }
        if !self.attributes.delete(id).await? {
            // Raced with a concurrent delete; the refreshed list is still
            // the right answer.
            tracing::debug!(attribute = %id, "attribute vanished before delete");
        }
        self.list(attribute.kind).await
    }
}
