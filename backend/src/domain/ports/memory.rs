//! In-memory fixture adapters.
//!
//! One shared store implements all three repository ports so the server can
//! run without a database (demo mode) and handler tests stay free of I/O.
//! Reference counting, list filtering, and the bulk age updates mirror the
//! SQL adapters' observable behaviour.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::attribute::{Attribute, AttributeKind, AttributeName, AttributeUsage};
use crate::domain::polish::{NailPolish, PolishDraft};
use crate::domain::shoe::{Shoe, ShoeDraft, SortDirection, SortKey};

use super::{
    AttributeRepository, PolishAssignment, PolishListRequest, PolishRepository, RepositoryError,
    ShoeListRequest, ShoeRepository,
};

#[derive(Debug, Default)]
struct State {
    attributes: Vec<Attribute>,
    shoes: Vec<Shoe>,
    polishes: Vec<NailPolish>,
}

/// Shared in-memory collection implementing every repository port.
#[derive(Debug, Default)]
pub struct InMemoryCollection {
    state: Mutex<State>,
}

impl InMemoryCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed an attribute directly, bypassing uniqueness checks; test helper.
    pub fn seed_attribute(&self, kind: AttributeKind, name: &str) -> Attribute {
        let now = Utc::now();
        let attribute = Attribute {
            id: Uuid::new_v4(),
            kind,
            name: AttributeName::new(name).unwrap_or_else(|err| panic!("seed name: {err}")),
            created_at: now,
            updated_at: now,
        };
        self.lock().attributes.push(attribute.clone());
        attribute
    }

    fn usage_count_locked(state: &State, id: Uuid) -> u64 {
        let shoe_refs = state
            .shoes
            .iter()
            .map(|shoe| {
                let fk_hits = [
                    shoe.brand_id,
                    shoe.location_id,
                    shoe.shoe_type_id,
                    shoe.heel_type_id,
                    shoe.dress_style_id,
                ]
                .into_iter()
                .flatten()
                .filter(|fk| *fk == id)
                .count();
                let color_hits = shoe.color_ids.iter().filter(|c| **c == id).count();
                fk_hits + color_hits
            })
            .sum::<usize>();
        let polish_refs = state
            .polishes
            .iter()
            .map(|polish| {
                let brand_hit = usize::from(polish.brand_id == Some(id));
                let link_hits = polish
                    .color_ids
                    .iter()
                    .chain(polish.finish_ids.iter())
                    .filter(|linked| **linked == id)
                    .count();
                brand_hit + link_hits
            })
            .sum::<usize>();
        (shoe_refs + polish_refs) as u64
    }

    fn brand_name(state: &State, brand_id: Option<Uuid>) -> Option<String> {
        brand_id.and_then(|id| {
            state
                .attributes
                .iter()
                .find(|attribute| attribute.id == id)
                .map(|attribute| attribute.name.as_str().to_owned())
        })
    }
}

/// Order by brand name with unbranded entries last in either direction.
fn compare_brand_names(
    direction: SortDirection,
    a: Option<&String>,
    b: Option<&String>,
) -> std::cmp::Ordering {
    match (a, b) {
        (None, None) => std::cmp::Ordering::Equal,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (Some(_), None) => std::cmp::Ordering::Less,
        (Some(a), Some(b)) => match direction {
            SortDirection::Ascending => a.cmp(b),
            SortDirection::Descending => b.cmp(a),
        },
    }
}

#[async_trait]
impl AttributeRepository for InMemoryCollection {
    async fn list_with_usage(
        &self,
        kind: AttributeKind,
    ) -> Result<Vec<AttributeUsage>, RepositoryError> {
        let state = self.lock();
        let mut usages: Vec<AttributeUsage> = state
            .attributes
            .iter()
            .filter(|attribute| attribute.kind == kind)
            .map(|attribute| AttributeUsage {
                attribute: attribute.clone(),
                usage_count: Self::usage_count_locked(&state, attribute.id),
                usage_share: 0.0,
            })
            .collect();
        usages.sort_by(|a, b| a.attribute.name.as_str().cmp(b.attribute.name.as_str()));
        Ok(usages)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Attribute>, RepositoryError> {
        Ok(self
            .lock()
            .attributes
            .iter()
            .find(|attribute| attribute.id == id)
            .cloned())
    }

    async fn create(
        &self,
        kind: AttributeKind,
        name: AttributeName,
    ) -> Result<Attribute, RepositoryError> {
        let mut state = self.lock();
        let duplicate = state
            .attributes
            .iter()
            .any(|existing| existing.kind == kind && existing.name == name);
        if duplicate {
            return Err(RepositoryError::DuplicateName);
        }
        let now = Utc::now();
        let attribute = Attribute {
            id: Uuid::new_v4(),
            kind,
            name,
            created_at: now,
            updated_at: now,
        };
        state.attributes.push(attribute.clone());
        Ok(attribute)
    }

    async fn usage_count(&self, id: Uuid) -> Result<u64, RepositoryError> {
        let state = self.lock();
        Ok(Self::usage_count_locked(&state, id))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut state = self.lock();
        let before = state.attributes.len();
        state.attributes.retain(|attribute| attribute.id != id);
        Ok(state.attributes.len() < before)
    }
}

fn apply_shoe_draft(shoe: &mut Shoe, draft: ShoeDraft) {
    shoe.image_url = draft.image_url;
    shoe.brand_id = draft.brand_id;
    shoe.location_id = draft.location_id;
    shoe.shoe_type_id = draft.shoe_type_id;
    shoe.heel_type_id = draft.heel_type_id;
    shoe.dress_style_id = draft.dress_style_id;
    shoe.color_ids = draft.color_ids;
    shoe.notes = draft.notes;
    shoe.updated_at = Utc::now();
}

#[async_trait]
impl ShoeRepository for InMemoryCollection {
    async fn list(&self, request: &ShoeListRequest) -> Result<(Vec<Shoe>, u64), RepositoryError> {
        let state = self.lock();
        let filter = &request.filter;
        let mut matching: Vec<Shoe> = state
            .shoes
            .iter()
            .filter(|shoe| {
                filter.brand_id.is_none_or(|id| shoe.brand_id == Some(id))
                    && filter.color_id.is_none_or(|id| shoe.color_ids.contains(&id))
                    && filter
                        .dress_style_id
                        .is_none_or(|id| shoe.dress_style_id == Some(id))
                    && filter
                        .shoe_type_id
                        .is_none_or(|id| shoe.shoe_type_id == Some(id))
                    && filter
                        .heel_type_id
                        .is_none_or(|id| shoe.heel_type_id == Some(id))
                    && filter
                        .location_id
                        .is_none_or(|id| shoe.location_id == Some(id))
            })
            .cloned()
            .collect();

        match request.sort.key {
            SortKey::CreatedAt => {
                matching.sort_by_key(|shoe| shoe.created_at);
                if request.sort.direction == SortDirection::Descending {
                    matching.reverse();
                }
            }
            SortKey::BrandName => matching.sort_by(|a, b| {
                compare_brand_names(
                    request.sort.direction,
                    Self::brand_name(&state, a.brand_id).as_ref(),
                    Self::brand_name(&state, b.brand_id).as_ref(),
                )
            }),
        }

        let total = matching.len() as u64;
        let offset = usize::try_from(request.page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(request.page.limit()).unwrap_or(usize::MAX);
        let page = matching.into_iter().skip(offset).take(limit).collect();
        Ok((page, total))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Shoe>, RepositoryError> {
        Ok(self.lock().shoes.iter().find(|shoe| shoe.id == id).cloned())
    }

    async fn create(&self, draft: ShoeDraft) -> Result<Shoe, RepositoryError> {
        let now = Utc::now();
        let mut shoe = Shoe {
            id: Uuid::new_v4(),
            image_url: None,
            brand_id: None,
            location_id: None,
            shoe_type_id: None,
            heel_type_id: None,
            dress_style_id: None,
            color_ids: Vec::new(),
            notes: None,
            created_at: now,
            updated_at: now,
        };
        apply_shoe_draft(&mut shoe, draft);
        self.lock().shoes.push(shoe.clone());
        Ok(shoe)
    }

    async fn update(&self, id: Uuid, draft: ShoeDraft) -> Result<Option<Shoe>, RepositoryError> {
        let mut state = self.lock();
        let Some(shoe) = state.shoes.iter_mut().find(|shoe| shoe.id == id) else {
            return Ok(None);
        };
        apply_shoe_draft(shoe, draft);
        Ok(Some(shoe.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut state = self.lock();
        let before = state.shoes.len();
        state.shoes.retain(|shoe| shoe.id != id);
        Ok(state.shoes.len() < before)
    }

    async fn set_image_url(&self, id: Uuid, image_url: &str) -> Result<bool, RepositoryError> {
        let mut state = self.lock();
        let Some(shoe) = state.shoes.iter_mut().find(|shoe| shoe.id == id) else {
            return Ok(false);
        };
        shoe.image_url = Some(image_url.to_owned());
        shoe.updated_at = Utc::now();
        Ok(true)
    }
}

fn apply_polish_draft(polish: &mut NailPolish, draft: PolishDraft) {
    polish.name = draft.name;
    polish.brand_id = draft.brand_id;
    polish.color_ids = draft.color_ids;
    polish.finish_ids = draft.finish_ids;
    polish.rating = draft.rating;
    polish.link = draft.link;
    polish.coats = draft.coats;
    polish.notes = draft.notes;
    polish.last_used = draft.last_used;
    polish.bottle_count = draft.bottle_count;
    polish.empty_bottle_count = draft.empty_bottle_count;
    polish.is_old = draft.is_old;
    polish.updated_at = Utc::now();
}

#[async_trait]
impl PolishRepository for InMemoryCollection {
    async fn list(
        &self,
        request: &PolishListRequest,
    ) -> Result<(Vec<NailPolish>, u64), RepositoryError> {
        let state = self.lock();
        let filter = &request.filter;
        let mut matching: Vec<NailPolish> = state
            .polishes
            .iter()
            .filter(|polish| {
                filter.brand_id.is_none_or(|id| polish.brand_id == Some(id))
                    && filter
                        .color_id
                        .is_none_or(|id| polish.color_ids.contains(&id))
                    && filter
                        .finish_id
                        .is_none_or(|id| polish.finish_ids.contains(&id))
                    && filter.is_old.is_none_or(|wanted| polish.is_old == wanted)
            })
            .cloned()
            .collect();

        match request.sort.key {
            SortKey::CreatedAt => {
                matching.sort_by_key(|polish| polish.created_at);
                if request.sort.direction == SortDirection::Descending {
                    matching.reverse();
                }
            }
            SortKey::BrandName => matching.sort_by(|a, b| {
                compare_brand_names(
                    request.sort.direction,
                    Self::brand_name(&state, a.brand_id).as_ref(),
                    Self::brand_name(&state, b.brand_id).as_ref(),
                )
            }),
        }

        let total = matching.len() as u64;
        let offset = usize::try_from(request.page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(request.page.limit()).unwrap_or(usize::MAX);
        let page = matching.into_iter().skip(offset).take(limit).collect();
        Ok((page, total))
    }

    async fn find(&self, id: Uuid) -> Result<Option<NailPolish>, RepositoryError> {
        Ok(self
            .lock()
            .polishes
            .iter()
            .find(|polish| polish.id == id)
            .cloned())
    }

    async fn create(&self, draft: PolishDraft) -> Result<NailPolish, RepositoryError> {
        let now = Utc::now();
        let mut polish = NailPolish {
            id: Uuid::new_v4(),
            name: String::new(),
            brand_id: None,
            color_ids: Vec::new(),
            finish_ids: Vec::new(),
            rating: None,
            link: None,
            coats: None,
            notes: None,
            last_used: None,
            bottle_count: 0,
            empty_bottle_count: 0,
            is_old: None,
            created_at: now,
            updated_at: now,
        };
        apply_polish_draft(&mut polish, draft);
        self.lock().polishes.push(polish.clone());
        Ok(polish)
    }

    async fn update(
        &self,
        id: Uuid,
        draft: PolishDraft,
    ) -> Result<Option<NailPolish>, RepositoryError> {
        let mut state = self.lock();
        let Some(polish) = state.polishes.iter_mut().find(|polish| polish.id == id) else {
            return Ok(None);
        };
        apply_polish_draft(polish, draft);
        Ok(Some(polish.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut state = self.lock();
        let before = state.polishes.len();
        state.polishes.retain(|polish| polish.id != id);
        Ok(state.polishes.len() < before)
    }

    async fn set_old_for_brand(
        &self,
        brand_id: Uuid,
        is_old: bool,
    ) -> Result<u64, RepositoryError> {
        let mut state = self.lock();
        let mut touched = 0;
        for polish in state
            .polishes
            .iter_mut()
            .filter(|polish| polish.brand_id == Some(brand_id))
        {
            polish.is_old = Some(is_old);
            polish.updated_at = Utc::now();
            touched += 1;
        }
        Ok(touched)
    }

    async fn set_old_for_polishes(
        &self,
        assignments: &[PolishAssignment],
    ) -> Result<u64, RepositoryError> {
        let wanted: HashMap<Uuid, bool> = assignments
            .iter()
            .map(|assignment| (assignment.polish_id, assignment.is_old))
            .collect();
        let mut state = self.lock();
        let mut touched = 0;
        for polish in state.polishes.iter_mut() {
            if let Some(is_old) = wanted.get(&polish.id) {
                polish.is_old = Some(*is_old);
                polish.updated_at = Utc::now();
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn set_old_false_excluding_brands(
        &self,
        brand_ids: &[Uuid],
    ) -> Result<u64, RepositoryError> {
        let mut state = self.lock();
        let mut touched = 0;
        for polish in state.polishes.iter_mut().filter(|polish| {
            polish
                .brand_id
                .is_none_or(|brand| !brand_ids.contains(&brand))
        }) {
            polish.is_old = Some(false);
            polish.updated_at = Utc::now();
            touched += 1;
        }
        Ok(touched)
    }
}
