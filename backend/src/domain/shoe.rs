//! Shoe aggregate and list-view query types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// A shoe in the collection.
///
/// All classification links are optional; a shoe may be recorded before it is
/// fully catalogued. Colour links live in a join table and are carried here
/// as a flat id list.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shoe {
    /// Primary key.
    pub id: Uuid,
    /// Public URL of the stored image, when one has been selected.
    pub image_url: Option<String>,
    /// Brand attribute link.
    pub brand_id: Option<Uuid>,
    /// Storage location link.
    pub location_id: Option<Uuid>,
    /// Shoe type link.
    pub shoe_type_id: Option<Uuid>,
    /// Heel type link.
    pub heel_type_id: Option<Uuid>,
    /// Dress style link.
    pub dress_style_id: Option<Uuid>,
    /// Colour attribute links.
    pub color_ids: Vec<Uuid>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input shape for creating or fully replacing a shoe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShoeDraft {
    /// Public image URL.
    pub image_url: Option<String>,
    /// Brand attribute link.
    pub brand_id: Option<Uuid>,
    /// Storage location link.
    pub location_id: Option<Uuid>,
    /// Shoe type link.
    pub shoe_type_id: Option<Uuid>,
    /// Heel type link.
    pub heel_type_id: Option<Uuid>,
    /// Dress style link.
    pub dress_style_id: Option<Uuid>,
    /// Replacement colour set.
    pub color_ids: Vec<Uuid>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Attribute filters applied to the shoe list view. `None` means "any".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShoeFilter {
    /// Restrict to one brand.
    pub brand_id: Option<Uuid>,
    /// Restrict to shoes carrying one colour.
    pub color_id: Option<Uuid>,
    /// Restrict to one dress style.
    pub dress_style_id: Option<Uuid>,
    /// Restrict to one shoe type.
    pub shoe_type_id: Option<Uuid>,
    /// Restrict to one heel type.
    pub heel_type_id: Option<Uuid>,
    /// Restrict to one location.
    pub location_id: Option<Uuid>,
}

impl ShoeFilter {
    /// True when no filter is active.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Sort key for list views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Order by record creation time.
    #[default]
    CreatedAt,
    /// Order by brand name, unbranded entries last.
    BrandName,
}

/// Sort direction for list views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Newest (or alphabetically last) first.
    #[default]
    Descending,
    /// Oldest (or alphabetically first) first.
    Ascending,
}

/// Combined sort order for list views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortOrder {
    /// Column to order by.
    pub key: SortKey,
    /// Direction.
    pub direction: SortDirection,
}
