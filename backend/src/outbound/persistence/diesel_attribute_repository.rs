//! PostgreSQL-backed lookup-attribute adapter.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::attribute::{Attribute, AttributeKind, AttributeName, AttributeUsage};
use crate::domain::ports::{AttributeRepository, RepositoryError};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{AttributeRow, NewAttributeRow};
use super::pool::DbPool;
use super::schema::{attributes, polish_colors, polish_finishes, polishes, shoe_colors, shoes};

/// Diesel-backed implementation of the attribute port.
#[derive(Clone)]
pub struct DieselAttributeRepository {
    pool: DbPool,
}

impl DieselAttributeRepository {
    /// Create a new repository over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn merge_optional(counts: &mut HashMap<Uuid, u64>, rows: Vec<(Option<Uuid>, i64)>) {
    for (id, count) in rows {
        if let Some(id) = id {
            *counts.entry(id).or_default() += u64::try_from(count).unwrap_or_default();
        }
    }
}

fn merge(counts: &mut HashMap<Uuid, u64>, rows: Vec<(Uuid, i64)>) {
    for (id, count) in rows {
        *counts.entry(id).or_default() += u64::try_from(count).unwrap_or_default();
    }
}

/// Reference counts per attribute id, summed across every referencing
/// column. Attribute ids are unique across kinds, so columns that can only
/// hold one kind never collide in the map.
async fn reference_counts(
    conn: &mut diesel_async::AsyncPgConnection,
) -> Result<HashMap<Uuid, u64>, diesel::result::Error> {
    let mut counts = HashMap::new();
    merge_optional(
        &mut counts,
        shoes::table
            .group_by(shoes::brand_id)
            .select((shoes::brand_id, count_star()))
            .load(conn)
            .await?,
    );
    merge_optional(
        &mut counts,
        shoes::table
            .group_by(shoes::location_id)
            .select((shoes::location_id, count_star()))
            .load(conn)
            .await?,
    );
    merge_optional(
        &mut counts,
        shoes::table
            .group_by(shoes::shoe_type_id)
            .select((shoes::shoe_type_id, count_star()))
            .load(conn)
            .await?,
    );
    merge_optional(
        &mut counts,
        shoes::table
            .group_by(shoes::heel_type_id)
            .select((shoes::heel_type_id, count_star()))
            .load(conn)
            .await?,
    );
    merge_optional(
        &mut counts,
        shoes::table
            .group_by(shoes::dress_style_id)
            .select((shoes::dress_style_id, count_star()))
            .load(conn)
            .await?,
    );
    merge(
        &mut counts,
        shoe_colors::table
            .group_by(shoe_colors::color_id)
            .select((shoe_colors::color_id, count_star()))
            .load(conn)
            .await?,
    );
    merge_optional(
        &mut counts,
        polishes::table
            .group_by(polishes::brand_id)
            .select((polishes::brand_id, count_star()))
            .load(conn)
            .await?,
    );
    merge(
        &mut counts,
        polish_colors::table
            .group_by(polish_colors::color_id)
            .select((polish_colors::color_id, count_star()))
            .load(conn)
            .await?,
    );
    merge(
        &mut counts,
        polish_finishes::table
            .group_by(polish_finishes::finish_id)
            .select((polish_finishes::finish_id, count_star()))
            .load(conn)
            .await?,
    );
    Ok(counts)
}

fn rows_to_domain(rows: Vec<AttributeRow>) -> Result<Vec<Attribute>, RepositoryError> {
    rows.into_iter()
        .map(|row| row.into_domain().map_err(RepositoryError::query))
        .collect()
}

#[async_trait]
impl AttributeRepository for DieselAttributeRepository {
    async fn list_with_usage(
        &self,
        kind: AttributeKind,
    ) -> Result<Vec<AttributeUsage>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<AttributeRow> = attributes::table
            .filter(attributes::kind.eq(kind.as_str()))
            .select(AttributeRow::as_select())
            .order_by(attributes::name)
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "attribute list"))?;
        let counts = reference_counts(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "attribute usage counts"))?;
        Ok(rows_to_domain(rows)?
            .into_iter()
            .map(|attribute| {
                let usage_count = counts.get(&attribute.id).copied().unwrap_or_default();
                AttributeUsage {
                    attribute,
                    usage_count,
                    usage_share: 0.0,
                }
            })
            .collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Attribute>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AttributeRow> = attributes::table
            .find(id)
            .select(AttributeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "attribute find"))?;
        row.map(|row| row.into_domain().map_err(RepositoryError::query))
            .transpose()
    }

    async fn create(
        &self,
        kind: AttributeKind,
        name: AttributeName,
    ) -> Result<Attribute, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let now = Utc::now();
        let record = NewAttributeRow {
            id: Uuid::new_v4(),
            kind: kind.as_str().to_owned(),
            name: name.as_str().to_owned(),
            created_at: now,
            updated_at: now,
        };
        let row: AttributeRow = diesel::insert_into(attributes::table)
            .values(&record)
            .returning(AttributeRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "attribute create"))?;
        row.into_domain().map_err(RepositoryError::query)
    }

    async fn usage_count(&self, id: Uuid) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let counts = reference_counts(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "attribute usage count"))?;
        Ok(counts.get(&id).copied().unwrap_or_default())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(attributes::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "attribute delete"))?;
        Ok(deleted > 0)
    }
}
