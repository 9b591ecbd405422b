//! Nail polish aggregate, rating scale, and draft input shape.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Ordinal school-style rating, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ToSchema)]
pub enum Rating {
    /// Top marks.
    APlus,
    /// Excellent.
    A,
    /// Very good.
    AMinus,
    /// Good.
    BPlus,
    /// Decent.
    B,
    /// Below average.
    BMinus,
    /// Mediocre.
    CPlus,
    /// Poor.
    C,
    /// Very poor.
    CMinus,
    /// Barely usable.
    D,
    /// Never again.
    F,
}

impl Rating {
    /// All ratings, best first.
    pub const ALL: [Self; 11] = [
        Self::APlus,
        Self::A,
        Self::AMinus,
        Self::BPlus,
        Self::B,
        Self::BMinus,
        Self::CPlus,
        Self::C,
        Self::CMinus,
        Self::D,
        Self::F,
    ];

    /// Stable string form used in the database and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::AMinus => "A-",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::BMinus => "B-",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::CMinus => "C-",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing an unknown rating grade.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rating grade: {0}")]
pub struct UnknownRating(pub String);

impl FromStr for Rating {
    type Err = UnknownRating;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|rating| rating.as_str() == s)
            .ok_or_else(|| UnknownRating(s.to_owned()))
    }
}

impl Serialize for Rating {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A nail polish in the collection.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NailPolish {
    /// Primary key.
    pub id: Uuid,
    /// Display name, non-empty.
    pub name: String,
    /// Brand attribute link.
    pub brand_id: Option<Uuid>,
    /// Colour attribute links.
    pub color_ids: Vec<Uuid>,
    /// Finish attribute links.
    pub finish_ids: Vec<Uuid>,
    /// Ordinal rating, when graded.
    pub rating: Option<Rating>,
    /// Product or swatch link.
    pub link: Option<String>,
    /// Coats needed for full coverage.
    pub coats: Option<i16>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Date the polish was last worn.
    pub last_used: Option<NaiveDate>,
    /// Bottles currently on hand.
    pub bottle_count: i32,
    /// Finished bottles kept for reference.
    pub empty_bottle_count: i32,
    /// Tri-state age flag: `Some(true)` old formula, `Some(false)` current,
    /// `None` not yet classified.
    pub is_old: Option<bool>,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input shape for creating or fully replacing a polish.
#[derive(Debug, Clone, PartialEq)]
pub struct PolishDraft {
    /// Display name, non-empty.
    pub name: String,
    /// Brand attribute link.
    pub brand_id: Option<Uuid>,
    /// Replacement colour set.
    pub color_ids: Vec<Uuid>,
    /// Replacement finish set.
    pub finish_ids: Vec<Uuid>,
    /// Ordinal rating.
    pub rating: Option<Rating>,
    /// Product or swatch link.
    pub link: Option<String>,
    /// Coats needed for full coverage.
    pub coats: Option<i16>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Date the polish was last worn.
    pub last_used: Option<NaiveDate>,
    /// Bottles currently on hand.
    pub bottle_count: i32,
    /// Finished bottles kept for reference.
    pub empty_bottle_count: i32,
    /// Tri-state age flag.
    pub is_old: Option<bool>,
}

/// Filters applied to the polish list view. `None` means "any".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolishFilter {
    /// Restrict to one brand.
    pub brand_id: Option<Uuid>,
    /// Restrict to polishes carrying one colour.
    pub color_id: Option<Uuid>,
    /// Restrict to polishes carrying one finish.
    pub finish_id: Option<Uuid>,
    /// Restrict by the tri-state age flag; `Some(None)` matches unclassified
    /// polishes.
    pub is_old: Option<Option<bool>>,
}

impl PolishFilter {
    /// True when no filter is active.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
