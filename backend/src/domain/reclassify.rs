//! Two-phase bulk age reclassification for nail polishes.
//!
//! The flow mirrors the two review screens: first every brand is marked
//! either uniformly old/current or flagged "mixed"; only when at least one
//! brand is mixed does the flow continue to per-polish review. The save is
//! three independent batched writes, uniform brands, mixed-brand items, and
//! a default pass setting everything unmentioned to "not old". There is
//! deliberately no atomicity across brands: each brand's outcome is reported
//! individually and a failed brand does not roll back the others.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::ports::{PolishAssignment, PolishRepository};

/// Uniform age assignment for a whole brand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrandAgeAssignment {
    /// Brand attribute id.
    pub brand_id: Uuid,
    /// Value applied to every polish of the brand.
    pub is_old: bool,
}

/// Explicit per-polish assignments for one mixed brand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixedBrandItems {
    /// Brand attribute id.
    pub brand_id: Uuid,
    /// Per-polish values.
    pub items: Vec<PolishAssignment>,
}

/// The save payload: uniform and mixed partitions. Brands mentioned in
/// neither partition are defaulted to `is_old = false` server-side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReclassificationRequest {
    /// Brands with one value for every polish.
    pub uniform: Vec<BrandAgeAssignment>,
    /// Brands reviewed polish by polish.
    pub mixed: Vec<MixedBrandItems>,
}

impl ReclassificationRequest {
    /// Every brand mentioned by either partition.
    pub fn mentioned_brands(&self) -> Vec<Uuid> {
        self.uniform
            .iter()
            .map(|assignment| assignment.brand_id)
            .chain(self.mixed.iter().map(|mixed| mixed.brand_id))
            .collect()
    }

    /// Reject requests naming one brand in both partitions.
    pub fn validate(&self) -> Result<(), Error> {
        let mut seen = HashSet::new();
        for brand_id in self.mentioned_brands() {
            if !seen.insert(brand_id) {
                return Err(Error::invalid_request(format!(
                    "brand {brand_id} appears in more than one partition"
                )));
            }
        }
        Ok(())
    }
}

/// Errors raised while driving the two-phase draft.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    /// Review requires at least one brand flagged mixed.
    #[error("flag at least one brand as mixed before reviewing items")]
    NoMixedBrands,
}

/// Per-brand mark during the first phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BrandMark {
    Uniform(bool),
    Mixed,
}

/// Phase one: brand selection.
///
/// Every brand starts untouched (which the save defaults to "not old"); the
/// user may toggle a brand old/current directly or flag it mixed, removing
/// it from direct toggling.
#[derive(Debug, Default)]
pub struct ReclassificationDraft {
    marks: BTreeMap<Uuid, BrandMark>,
}

impl ReclassificationDraft {
    /// Start with every brand untouched.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a brand uniformly old or current, clearing any mixed flag.
    pub fn set_uniform(&mut self, brand_id: Uuid, is_old: bool) {
        self.marks.insert(brand_id, BrandMark::Uniform(is_old));
    }

    /// Flag a brand as mixed, removing it from direct toggling.
    pub fn mark_mixed(&mut self, brand_id: Uuid) {
        self.marks.insert(brand_id, BrandMark::Mixed);
    }

    /// Return a brand to the untouched default.
    pub fn clear(&mut self, brand_id: Uuid) {
        self.marks.remove(&brand_id);
    }

    /// True when at least one brand is flagged mixed.
    pub fn has_mixed(&self) -> bool {
        self.marks
            .values()
            .any(|mark| matches!(mark, BrandMark::Mixed))
    }

    /// Transition to item review.
    ///
    /// # Errors
    /// [`DraftError::NoMixedBrands`] when nothing is flagged mixed; the flow
    /// should instead [`Self::finish`] directly.
    pub fn begin_review(self) -> Result<ItemReview, DraftError> {
        if !self.has_mixed() {
            return Err(DraftError::NoMixedBrands);
        }
        let mut uniform = Vec::new();
        let mut mixed = BTreeMap::new();
        for (brand_id, mark) in self.marks {
            match mark {
                BrandMark::Uniform(is_old) => uniform.push(BrandAgeAssignment { brand_id, is_old }),
                BrandMark::Mixed => {
                    mixed.insert(brand_id, Vec::new());
                }
            }
        }
        Ok(ItemReview { uniform, mixed })
    }

    /// Build the save payload without item review (no mixed brands).
    pub fn finish(self) -> ReclassificationRequest {
        let uniform = self
            .marks
            .into_iter()
            .filter_map(|(brand_id, mark)| match mark {
                BrandMark::Uniform(is_old) => Some(BrandAgeAssignment { brand_id, is_old }),
                BrandMark::Mixed => None,
            })
            .collect();
        ReclassificationRequest {
            uniform,
            mixed: Vec::new(),
        }
    }
}

/// Phase two: per-polish review of mixed brands.
#[derive(Debug)]
pub struct ItemReview {
    uniform: Vec<BrandAgeAssignment>,
    mixed: BTreeMap<Uuid, Vec<PolishAssignment>>,
}

impl ItemReview {
    /// Record an explicit value for one polish of a mixed brand; ignored for
    /// brands that were not flagged mixed.
    pub fn set_item(&mut self, brand_id: Uuid, polish_id: Uuid, is_old: bool) {
        if let Some(items) = self.mixed.get_mut(&brand_id) {
            items.retain(|item| item.polish_id != polish_id);
            items.push(PolishAssignment { polish_id, is_old });
        }
    }

    /// Build the save payload.
    pub fn finish(self) -> ReclassificationRequest {
        ReclassificationRequest {
            uniform: self.uniform,
            mixed: self
                .mixed
                .into_iter()
                .map(|(brand_id, items)| MixedBrandItems { brand_id, items })
                .collect(),
        }
    }
}

/// Result for one brand's batched write.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrandOutcome {
    /// Brand attribute id.
    pub brand_id: Uuid,
    /// Rows touched; zero on failure.
    pub updated: u64,
    /// Failure description, when the brand's write failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate result of one save.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReclassificationReport {
    /// Per-brand outcomes, uniform partitions first.
    pub brands: Vec<BrandOutcome>,
    /// Rows defaulted to "not old" by the final pass.
    pub defaulted: u64,
    /// Failure description when the default pass failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_error: Option<String>,
}

impl ReclassificationReport {
    /// True when every partition applied cleanly.
    pub fn is_clean(&self) -> bool {
        self.default_error.is_none() && self.brands.iter().all(|brand| brand.error.is_none())
    }
}

/// Applies reclassification requests against the polish repository.
pub struct ReclassificationService {
    polishes: Arc<dyn PolishRepository>,
}

impl ReclassificationService {
    /// Build the service over a polish repository.
    pub fn new(polishes: Arc<dyn PolishRepository>) -> Self {
        Self { polishes }
    }

    /// Apply a request, reporting per-brand success or failure.
    ///
    /// # Errors
    /// Only request validation fails the whole call; write failures are
    /// captured per partition in the report.
    pub async fn apply(
        &self,
        request: ReclassificationRequest,
    ) -> Result<ReclassificationReport, Error> {
        request.validate()?;
        let mentioned = request.mentioned_brands();

        let mut brands = Vec::with_capacity(request.uniform.len() + request.mixed.len());
        for assignment in &request.uniform {
            let outcome = self
                .polishes
                .set_old_for_brand(assignment.brand_id, assignment.is_old)
                .await;
            brands.push(Self::brand_outcome(assignment.brand_id, outcome));
        }
        for mixed in &request.mixed {
            let outcome = self.polishes.set_old_for_polishes(&mixed.items).await;
            brands.push(Self::brand_outcome(mixed.brand_id, outcome));
        }

        let (defaulted, default_error) = match self
            .polishes
            .set_old_false_excluding_brands(&mentioned)
            .await
        {
            Ok(count) => (count, None),
            Err(err) => {
                tracing::error!(error = %err, "default reclassification pass failed");
                (0, Some(err.to_string()))
            }
        };

        Ok(ReclassificationReport {
            brands,
            defaulted,
            default_error,
        })
    }

    fn brand_outcome(
        brand_id: Uuid,
        outcome: Result<u64, crate::domain::ports::RepositoryError>,
    ) -> BrandOutcome {
        match outcome {
            Ok(updated) => BrandOutcome {
                brand_id,
                updated,
                error: None,
            },
            Err(err) => {
                tracing::error!(brand = %brand_id, error = %err, "brand reclassification failed");
                BrandOutcome {
                    brand_id,
                    updated: 0,
                    error: Some(err.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attribute::AttributeKind;
    use crate::domain::polish::PolishDraft;
    use crate::domain::ports::{InMemoryCollection, RepositoryError};
    use async_trait::async_trait;
    use rstest::rstest;

    fn polish_draft(name: &str, brand_id: Option<Uuid>) -> PolishDraft {
        PolishDraft {
            name: name.to_owned(),
            brand_id,
            color_ids: Vec::new(),
            finish_ids: Vec::new(),
            rating: None,
            link: None,
            coats: None,
            notes: None,
            last_used: None,
            bottle_count: 1,
            empty_bottle_count: 0,
            is_old: None,
        }
    }

    #[rstest]
    fn review_requires_a_mixed_brand() {
        let mut draft = ReclassificationDraft::new();
        draft.set_uniform(Uuid::new_v4(), true);
        assert_eq!(
            draft.begin_review().expect_err("no mixed brands"),
            DraftError::NoMixedBrands
        );
    }

    #[rstest]
    fn mixed_flag_removes_brand_from_direct_toggling() {
        let brand = Uuid::new_v4();
        let mut draft = ReclassificationDraft::new();
        draft.set_uniform(brand, true);
        draft.mark_mixed(brand);
        let request = draft
            .begin_review()
            .expect("one mixed brand present")
            .finish();
        assert!(request.uniform.is_empty());
        assert_eq!(request.mixed.len(), 1);
    }

    #[rstest]
    fn duplicate_brand_across_partitions_is_rejected() {
        let brand = Uuid::new_v4();
        let request = ReclassificationRequest {
            uniform: vec![BrandAgeAssignment {
                brand_id: brand,
                is_old: true,
            }],
            mixed: vec![MixedBrandItems {
                brand_id: brand,
                items: Vec::new(),
            }],
        };
        assert!(request.validate().is_err());
    }

    #[rstest]
    #[actix_rt::test]
    async fn apply_covers_all_three_partitions() {
        let store = Arc::new(InMemoryCollection::new());
        let brand_a = store.seed_attribute(AttributeKind::Brand, "A");
        let brand_b = store.seed_attribute(AttributeKind::Brand, "B");
        let brand_c = store.seed_attribute(AttributeKind::Brand, "C");

        let repo: Arc<dyn PolishRepository> = store.clone();
        let a1 = repo
            .create(polish_draft("a1", Some(brand_a.id)))
            .await
            .expect("create");
        let a2 = repo
            .create(polish_draft("a2", Some(brand_a.id)))
            .await
            .expect("create");
        let b1 = repo
            .create(polish_draft("b1", Some(brand_b.id)))
            .await
            .expect("create");
        let b2 = repo
            .create(polish_draft("b2", Some(brand_b.id)))
            .await
            .expect("create");
        let c1 = repo
            .create(polish_draft("c1", Some(brand_c.id)))
            .await
            .expect("create");

        let service = ReclassificationService::new(repo.clone());
        let request = ReclassificationRequest {
            uniform: vec![BrandAgeAssignment {
                brand_id: brand_a.id,
                is_old: true,
            }],
            mixed: vec![MixedBrandItems {
                brand_id: brand_b.id,
                items: vec![
                    PolishAssignment {
                        polish_id: b1.id,
                        is_old: true,
                    },
                    PolishAssignment {
                        polish_id: b2.id,
                        is_old: false,
                    },
                ],
            }],
        };

        let report = service.apply(request).await.expect("apply");
        assert!(report.is_clean());
        assert_eq!(report.defaulted, 1);

        let is_old = async |id| {
            repo.find(id)
                .await
                .expect("find")
                .expect("polish exists")
                .is_old
        };
        assert_eq!(is_old(a1.id).await, Some(true));
        assert_eq!(is_old(a2.id).await, Some(true));
        assert_eq!(is_old(b1.id).await, Some(true));
        assert_eq!(is_old(b2.id).await, Some(false));
        assert_eq!(is_old(c1.id).await, Some(false));
    }

    /// Repository double whose uniform-brand write always fails.
    struct FailingBrand {
        inner: Arc<InMemoryCollection>,
        failing_brand: Uuid,
    }

    #[async_trait]
    impl PolishRepository for FailingBrand {
        async fn list(
            &self,
            request: &crate::domain::ports::PolishListRequest,
        ) -> Result<(Vec<crate::domain::polish::NailPolish>, u64), RepositoryError> {
            PolishRepository::list(self.inner.as_ref(), request).await
        }

        async fn find(
            &self,
            id: Uuid,
        ) -> Result<Option<crate::domain::polish::NailPolish>, RepositoryError> {
            PolishRepository::find(self.inner.as_ref(), id).await
        }

        async fn create(
            &self,
            draft: PolishDraft,
        ) -> Result<crate::domain::polish::NailPolish, RepositoryError> {
            PolishRepository::create(self.inner.as_ref(), draft).await
        }

        async fn update(
            &self,
            id: Uuid,
            draft: PolishDraft,
        ) -> Result<Option<crate::domain::polish::NailPolish>, RepositoryError> {
            PolishRepository::update(self.inner.as_ref(), id, draft).await
        }

        async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
            PolishRepository::delete(self.inner.as_ref(), id).await
        }

        async fn set_old_for_brand(
            &self,
            brand_id: Uuid,
            is_old: bool,
        ) -> Result<u64, RepositoryError> {
            if brand_id == self.failing_brand {
                return Err(RepositoryError::query("simulated failure"));
            }
            self.inner.set_old_for_brand(brand_id, is_old).await
        }

        async fn set_old_for_polishes(
            &self,
            assignments: &[PolishAssignment],
        ) -> Result<u64, RepositoryError> {
            self.inner.set_old_for_polishes(assignments).await
        }

        async fn set_old_false_excluding_brands(
            &self,
            brand_ids: &[Uuid],
        ) -> Result<u64, RepositoryError> {
            self.inner.set_old_false_excluding_brands(brand_ids).await
        }
    }

    #[rstest]
    #[actix_rt::test]
    async fn brand_failures_are_reported_without_rollback() {
        let store = Arc::new(InMemoryCollection::new());
        let failing = store.seed_attribute(AttributeKind::Brand, "Failing");
        let healthy = store.seed_attribute(AttributeKind::Brand, "Healthy");
        let repo: Arc<dyn PolishRepository> = store.clone();
        let kept = repo
            .create(polish_draft("kept", Some(healthy.id)))
            .await
            .expect("create");

        let service = ReclassificationService::new(Arc::new(FailingBrand {
            inner: store.clone(),
            failing_brand: failing.id,
        }));
        let report = service
            .apply(ReclassificationRequest {
                uniform: vec![
                    BrandAgeAssignment {
                        brand_id: failing.id,
                        is_old: true,
                    },
                    BrandAgeAssignment {
                        brand_id: healthy.id,
                        is_old: true,
                    },
                ],
                mixed: Vec::new(),
            })
            .await
            .expect("apply");

        assert!(!report.is_clean());
        let failed = report
            .brands
            .iter()
            .find(|outcome| outcome.brand_id == failing.id)
            .expect("failing outcome present");
        assert!(failed.error.is_some());
        // The healthy brand's write still landed.
        let polish = repo
            .find(kept.id)
            .await
            .expect("find")
            .expect("polish exists");
        assert_eq!(polish.is_old, Some(true));
    }
}
