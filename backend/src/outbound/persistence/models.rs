//! Diesel row and insert structs for the collection tables.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::attribute::{Attribute, AttributeKind, AttributeName};
use crate::domain::polish::{NailPolish, PolishDraft, Rating};
use crate::domain::shoe::{Shoe, ShoeDraft};

use super::schema::{attributes, polish_colors, polish_finishes, polishes, shoe_colors, shoes};

/// Queryable row for lookup attributes.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = attributes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AttributeRow {
    pub id: Uuid,
    pub kind: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AttributeRow {
    /// Convert to the domain type; fails on values the database should never
    /// hold.
    pub(crate) fn into_domain(self) -> Result<Attribute, String> {
        let kind: AttributeKind = self.kind.parse().map_err(|_| {
            format!("attribute {} has unknown kind {:?}", self.id, self.kind)
        })?;
        let name = AttributeName::new(&self.name)
            .map_err(|err| format!("attribute {} has invalid name: {err}", self.id))?;
        Ok(Attribute {
            id: self.id,
            kind,
            name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Insertable attribute record.
#[derive(Debug, Insertable)]
#[diesel(table_name = attributes)]
pub(crate) struct NewAttributeRow {
    pub id: Uuid,
    pub kind: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Queryable row for shoes, colour links loaded separately.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = shoes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ShoeRow {
    pub id: Uuid,
    pub image_url: Option<String>,
    pub brand_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub shoe_type_id: Option<Uuid>,
    pub heel_type_id: Option<Uuid>,
    pub dress_style_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShoeRow {
    pub(crate) fn into_domain(self, color_ids: Vec<Uuid>) -> Shoe {
        Shoe {
            id: self.id,
            image_url: self.image_url,
            brand_id: self.brand_id,
            location_id: self.location_id,
            shoe_type_id: self.shoe_type_id,
            heel_type_id: self.heel_type_id,
            dress_style_id: self.dress_style_id,
            color_ids,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Insertable shoe record.
#[derive(Debug, Insertable)]
#[diesel(table_name = shoes)]
pub(crate) struct NewShoeRow {
    pub id: Uuid,
    pub image_url: Option<String>,
    pub brand_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub shoe_type_id: Option<Uuid>,
    pub heel_type_id: Option<Uuid>,
    pub dress_style_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewShoeRow {
    pub(crate) fn from_draft(id: Uuid, draft: &ShoeDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            image_url: draft.image_url.clone(),
            brand_id: draft.brand_id,
            location_id: draft.location_id,
            shoe_type_id: draft.shoe_type_id,
            heel_type_id: draft.heel_type_id,
            dress_style_id: draft.dress_style_id,
            notes: draft.notes.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Changeset applied on shoe replacement.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = shoes)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ShoeChangeset {
    pub image_url: Option<String>,
    pub brand_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub shoe_type_id: Option<Uuid>,
    pub heel_type_id: Option<Uuid>,
    pub dress_style_id: Option<Uuid>,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ShoeChangeset {
    pub(crate) fn from_draft(draft: &ShoeDraft, now: DateTime<Utc>) -> Self {
        Self {
            image_url: draft.image_url.clone(),
            brand_id: draft.brand_id,
            location_id: draft.location_id,
            shoe_type_id: draft.shoe_type_id,
            heel_type_id: draft.heel_type_id,
            dress_style_id: draft.dress_style_id,
            notes: draft.notes.clone(),
            updated_at: now,
        }
    }
}

/// Insertable shoe-colour link.
#[derive(Debug, Insertable)]
#[diesel(table_name = shoe_colors)]
pub(crate) struct NewShoeColorRow {
    pub shoe_id: Uuid,
    pub color_id: Uuid,
}

/// Queryable row for polishes, link tables loaded separately.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = polishes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PolishRow {
    pub id: Uuid,
    pub name: String,
    pub brand_id: Option<Uuid>,
    pub rating: Option<String>,
    pub link: Option<String>,
    pub coats: Option<i16>,
    pub notes: Option<String>,
    pub last_used: Option<NaiveDate>,
    pub bottle_count: i32,
    pub empty_bottle_count: i32,
    pub is_old: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PolishRow {
    /// Convert to the domain type; fails on grades the database should never
    /// hold.
    pub(crate) fn into_domain(
        self,
        color_ids: Vec<Uuid>,
        finish_ids: Vec<Uuid>,
    ) -> Result<NailPolish, String> {
        let rating = self
            .rating
            .as_deref()
            .map(str::parse::<Rating>)
            .transpose()
            .map_err(|_| format!("polish {} has invalid rating", self.id))?;
        Ok(NailPolish {
            id: self.id,
            name: self.name,
            brand_id: self.brand_id,
            color_ids,
            finish_ids,
            rating,
            link: self.link,
            coats: self.coats,
            notes: self.notes,
            last_used: self.last_used,
            bottle_count: self.bottle_count,
            empty_bottle_count: self.empty_bottle_count,
            is_old: self.is_old,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Insertable polish record.
#[derive(Debug, Insertable)]
#[diesel(table_name = polishes)]
pub(crate) struct NewPolishRow {
    pub id: Uuid,
    pub name: String,
    pub brand_id: Option<Uuid>,
    pub rating: Option<String>,
    pub link: Option<String>,
    pub coats: Option<i16>,
    pub notes: Option<String>,
    pub last_used: Option<NaiveDate>,
    pub bottle_count: i32,
    pub empty_bottle_count: i32,
    pub is_old: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewPolishRow {
    pub(crate) fn from_draft(id: Uuid, draft: &PolishDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            brand_id: draft.brand_id,
            rating: draft.rating.map(|rating| rating.as_str().to_owned()),
            link: draft.link.clone(),
            coats: draft.coats,
            notes: draft.notes.clone(),
            last_used: draft.last_used,
            bottle_count: draft.bottle_count,
            empty_bottle_count: draft.empty_bottle_count,
            is_old: draft.is_old,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Changeset applied on polish replacement.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = polishes)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct PolishChangeset {
    pub name: String,
    pub brand_id: Option<Uuid>,
    pub rating: Option<String>,
    pub link: Option<String>,
    pub coats: Option<i16>,
    pub notes: Option<String>,
    pub last_used: Option<NaiveDate>,
    pub bottle_count: i32,
    pub empty_bottle_count: i32,
    pub is_old: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl PolishChangeset {
    pub(crate) fn from_draft(draft: &PolishDraft, now: DateTime<Utc>) -> Self {
        Self {
            name: draft.name.clone(),
            brand_id: draft.brand_id,
            rating: draft.rating.map(|rating| rating.as_str().to_owned()),
            link: draft.link.clone(),
            coats: draft.coats,
            notes: draft.notes.clone(),
            last_used: draft.last_used,
            bottle_count: draft.bottle_count,
            empty_bottle_count: draft.empty_bottle_count,
            is_old: draft.is_old,
            updated_at: now,
        }
    }
}

/// Insertable polish-colour link.
#[derive(Debug, Insertable)]
#[diesel(table_name = polish_colors)]
pub(crate) struct NewPolishColorRow {
    pub polish_id: Uuid,
    pub color_id: Uuid,
}

/// Insertable polish-finish link.
#[derive(Debug, Insertable)]
#[diesel(table_name = polish_finishes)]
pub(crate) struct NewPolishFinishRow {
    pub polish_id: Uuid,
    pub finish_id: Uuid,
}
