//! Lookup attributes shared by shoes and nail polishes.
//!
//! Brands, colors, dress styles, shoe types, heel types, locations, and
//! polish finishes all share one shape: an id and a unique name within their
//! kind. They are referenced by the collection entities and may only be
//! deleted while nothing references them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Maximum accepted attribute name length in characters.
pub const MAX_ATTRIBUTE_NAME_CHARS: usize = 64;

/// Discriminator for the lookup table an attribute belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    /// Shoe or polish manufacturer.
    Brand,
    /// Colour, shared by shoes and polishes.
    Color,
    /// Dress style a shoe suits (casual, formal, ...).
    DressStyle,
    /// Shoe silhouette (boot, sandal, ...).
    ShoeType,
    /// Heel type (stiletto, block, flat, ...).
    HeelType,
    /// Physical storage location.
    Location,
    /// Polish finish (creme, shimmer, ...).
    Finish,
}

impl AttributeKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 7] = [
        Self::Brand,
        Self::Color,
        Self::DressStyle,
        Self::ShoeType,
        Self::HeelType,
        Self::Location,
        Self::Finish,
    ];

    /// Stable string form used in the database and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Brand => "brand",
            Self::Color => "color",
            Self::DressStyle => "dress_style",
            Self::ShoeType => "shoe_type",
            Self::HeelType => "heel_type",
            Self::Location => "location",
            Self::Finish => "finish",
        }
    }
}

impl std::fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing an unknown attribute kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown attribute kind: {0}")]
pub struct UnknownAttributeKind(pub String);

impl FromStr for AttributeKind {
    type Err = UnknownAttributeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownAttributeKind(s.to_owned()))
    }
}

/// Validation failures for attribute names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttributeNameError {
    /// The name is empty or whitespace only.
    #[error("attribute name must not be empty")]
    Empty,
    /// The name exceeds [`MAX_ATTRIBUTE_NAME_CHARS`].
    #[error("attribute name must be at most {MAX_ATTRIBUTE_NAME_CHARS} characters")]
    TooLong,
}

/// Validated attribute name: trimmed, non-empty, bounded length.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(transparent)]
pub struct AttributeName(String);

impl AttributeName {
    /// Trim and validate a raw name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, AttributeNameError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AttributeNameError::Empty);
        }
        if trimmed.chars().count() > MAX_ATTRIBUTE_NAME_CHARS {
            return Err(AttributeNameError::TooLong);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The validated name text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AttributeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A lookup attribute row.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    /// Primary key.
    pub id: Uuid,
    /// Which lookup table the attribute belongs to.
    pub kind: AttributeKind,
    /// Unique name within the kind.
    pub name: AttributeName,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// An attribute together with how much of the collection references it.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttributeUsage {
    /// The attribute itself.
    #[serde(flatten)]
    pub attribute: Attribute,
    /// Number of referencing rows (shoes, polishes, and join rows).
    pub usage_count: u64,
    /// Share of total usages within the kind, as a percentage (0 when the
    /// kind is entirely unused).
    pub usage_share: f64,
}

/// Compute usage shares for a kind's attributes from their raw counts.
///
/// Shares sum to (approximately) 100 when any usage exists; all zero
/// otherwise.
pub fn with_usage_shares(mut usages: Vec<AttributeUsage>) -> Vec<AttributeUsage> {
    let total: u64 = usages.iter().map(|usage| usage.usage_count).sum();
    if total == 0 {
        return usages;
    }
    #[expect(clippy::cast_precision_loss, reason = "collection counts are small")]
    for usage in &mut usages {
        usage.usage_share = usage.usage_count as f64 / total as f64 * 100.0;
    }
    usages
}
