//! Nail-polish persistence port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::page::PageRequest;
use crate::domain::polish::{NailPolish, PolishDraft, PolishFilter};
use crate::domain::shoe::SortOrder;

use super::RepositoryError;

/// One list-view query: filters, sort, and page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolishListRequest {
    /// Attribute and age filters.
    pub filter: PolishFilter,
    /// Sort order.
    pub sort: SortOrder,
    /// Page window.
    pub page: PageRequest,
}

/// An explicit per-polish age assignment within a mixed brand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolishAssignment {
    /// Polish to update.
    pub polish_id: Uuid,
    /// New age flag value.
    pub is_old: bool,
}

/// Durable storage for polishes and their colour/finish links.
///
/// Create and update replace the polish row together with both join tables
/// inside a single transaction.
#[async_trait]
pub trait PolishRepository: Send + Sync {
    /// One page of polishes plus the total count of matching rows.
    async fn list(
        &self,
        request: &PolishListRequest,
    ) -> Result<(Vec<NailPolish>, u64), RepositoryError>;

    /// Fetch one polish with its colour and finish links.
    async fn find(&self, id: Uuid) -> Result<Option<NailPolish>, RepositoryError>;

    /// Insert a polish and its links transactionally.
    async fn create(&self, draft: PolishDraft) -> Result<NailPolish, RepositoryError>;

    /// Replace a polish and its links transactionally. Returns `None` when
    /// absent.
    async fn update(
        &self,
        id: Uuid,
        draft: PolishDraft,
    ) -> Result<Option<NailPolish>, RepositoryError>;

    /// Delete a polish, cascading its links. Returns `false` when absent.
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;

    /// Set `is_old` for every polish of one brand; returns rows touched.
    async fn set_old_for_brand(
        &self,
        brand_id: Uuid,
        is_old: bool,
    ) -> Result<u64, RepositoryError>;

    /// Apply explicit per-polish assignments; returns rows touched.
    async fn set_old_for_polishes(
        &self,
        assignments: &[PolishAssignment],
    ) -> Result<u64, RepositoryError>;

    /// Default `is_old` to `false` for every polish whose brand is not in
    /// `brand_ids` (including brandless polishes); returns rows touched.
    async fn set_old_false_excluding_brands(
        &self,
        brand_ids: &[Uuid],
    ) -> Result<u64, RepositoryError>;
}
