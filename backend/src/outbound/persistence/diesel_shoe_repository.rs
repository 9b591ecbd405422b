//! PostgreSQL-backed shoe adapter.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use uuid::Uuid;

use crate::domain::ports::{RepositoryError, ShoeListRequest, ShoeRepository};
use crate::domain::shoe::{Shoe, ShoeDraft, ShoeFilter, SortDirection, SortKey};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewShoeColorRow, NewShoeRow, ShoeChangeset, ShoeRow};
use super::pool::DbPool;
use super::schema::{attributes, shoe_colors, shoes};

/// Apply the list-view filters to a boxed query over `shoes`.
///
/// A macro rather than a function because the filtered source differs
/// between the plain and the brand-joined query paths.
macro_rules! apply_shoe_filters {
    ($query:expr, $filter:expr) => {{
        let filter: &ShoeFilter = $filter;
        let mut query = $query;
        if let Some(id) = filter.brand_id {
            query = query.filter(shoes::brand_id.eq(id));
        }
        if let Some(id) = filter.dress_style_id {
            query = query.filter(shoes::dress_style_id.eq(id));
        }
        if let Some(id) = filter.shoe_type_id {
            query = query.filter(shoes::shoe_type_id.eq(id));
        }
        if let Some(id) = filter.heel_type_id {
            query = query.filter(shoes::heel_type_id.eq(id));
        }
        if let Some(id) = filter.location_id {
            query = query.filter(shoes::location_id.eq(id));
        }
        if let Some(id) = filter.color_id {
            query = query.filter(
                shoes::id.eq_any(
                    shoe_colors::table
                        .filter(shoe_colors::color_id.eq(id))
                        .select(shoe_colors::shoe_id),
                ),
            );
        }
        query
    }};
}

/// Diesel-backed implementation of the shoe port.
#[derive(Clone)]
pub struct DieselShoeRepository {
    pool: DbPool,
}

impl DieselShoeRepository {
    /// Create a new repository over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Colour links for the given shoes, grouped by shoe id.
async fn color_links(
    conn: &mut diesel_async::AsyncPgConnection,
    shoe_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Uuid>>, diesel::result::Error> {
    let links: Vec<(Uuid, Uuid)> = shoe_colors::table
        .filter(shoe_colors::shoe_id.eq_any(shoe_ids))
        .order_by((shoe_colors::shoe_id, shoe_colors::color_id))
        .load(conn)
        .await?;
    let mut grouped: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (shoe_id, color_id) in links {
        grouped.entry(shoe_id).or_default().push(color_id);
    }
    Ok(grouped)
}

fn assemble(rows: Vec<ShoeRow>, mut colors: HashMap<Uuid, Vec<Uuid>>) -> Vec<Shoe> {
    rows.into_iter()
        .map(|row| {
            let color_ids = colors.remove(&row.id).unwrap_or_default();
            row.into_domain(color_ids)
        })
        .collect()
}

async fn replace_color_links(
    conn: &mut diesel_async::AsyncPgConnection,
    shoe_id: Uuid,
    color_ids: &[Uuid],
) -> Result<(), diesel::result::Error> {
    diesel::delete(shoe_colors::table.filter(shoe_colors::shoe_id.eq(shoe_id)))
        .execute(conn)
        .await?;
    let links: Vec<NewShoeColorRow> = color_ids
        .iter()
        .map(|&color_id| NewShoeColorRow { shoe_id, color_id })
        .collect();
    diesel::insert_into(shoe_colors::table)
        .values(&links)
        .execute(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl ShoeRepository for DieselShoeRepository {
    async fn list(&self, request: &ShoeListRequest) -> Result<(Vec<Shoe>, u64), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = apply_shoe_filters!(shoes::table.count().into_boxed(), &request.filter)
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "shoe count"))?;

        let rows: Vec<ShoeRow> = match request.sort.key {
            SortKey::CreatedAt => {
                let mut query = apply_shoe_filters!(
                    shoes::table.select(ShoeRow::as_select()).into_boxed(),
                    &request.filter
                );
                query = match request.sort.direction {
                    SortDirection::Descending => {
                        query.order((shoes::created_at.desc(), shoes::id.desc()))
                    }
                    SortDirection::Ascending => {
                        query.order((shoes::created_at.asc(), shoes::id.asc()))
                    }
                };
                query
                    .offset(request.page.offset())
                    .limit(request.page.limit())
                    .load(&mut conn)
                    .await
            }
            SortKey::BrandName => {
                // Unbranded shoes sort last in either direction.
                let joined = shoes::table
                    .left_join(
                        attributes::table.on(attributes::id.nullable().eq(shoes::brand_id)),
                    )
                    .select(ShoeRow::as_select())
                    .into_boxed();
                let mut query = apply_shoe_filters!(joined, &request.filter);
                query = match request.sort.direction {
                    SortDirection::Descending => query.order((
                        attributes::name.desc().nulls_last(),
                        shoes::created_at.desc(),
                        shoes::id.desc(),
                    )),
                    SortDirection::Ascending => query.order((
                        attributes::name.asc().nulls_last(),
                        shoes::created_at.asc(),
                        shoes::id.asc(),
                    )),
                };
                query
                    .offset(request.page.offset())
                    .limit(request.page.limit())
                    .load(&mut conn)
                    .await
            }
        }
        .map_err(|err| map_diesel_error(err, "shoe list"))?;

        let shoe_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let colors = color_links(&mut conn, &shoe_ids)
            .await
            .map_err(|err| map_diesel_error(err, "shoe colour links"))?;
        Ok((
            assemble(rows, colors),
            u64::try_from(total).unwrap_or_default(),
        ))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Shoe>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ShoeRow> = shoes::table
            .find(id)
            .select(ShoeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "shoe find"))?;
        let Some(row) = row else {
            return Ok(None);
        };
        let colors = color_links(&mut conn, &[row.id])
            .await
            .map_err(|err| map_diesel_error(err, "shoe colour links"))?;
        Ok(assemble(vec![row], colors).pop())
    }

    async fn create(&self, draft: ShoeDraft) -> Result<Shoe, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let record = NewShoeRow::from_draft(Uuid::new_v4(), &draft, Utc::now());
        let color_ids = draft.color_ids.clone();
        let row: ShoeRow = conn
            .transaction(|conn| {
                async move {
                    let row: ShoeRow = diesel::insert_into(shoes::table)
                        .values(&record)
                        .returning(ShoeRow::as_returning())
                        .get_result(conn)
                        .await?;
                    replace_color_links(conn, row.id, &color_ids).await?;
                    Ok::<_, diesel::result::Error>(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_diesel_error(err, "shoe create"))?;
        Ok(row.into_domain(draft.color_ids))
    }

    async fn update(&self, id: Uuid, draft: ShoeDraft) -> Result<Option<Shoe>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = ShoeChangeset::from_draft(&draft, Utc::now());
        let color_ids = draft.color_ids.clone();
        let row: Option<ShoeRow> = conn
            .transaction(|conn| {
                async move {
                    let row: Option<ShoeRow> = diesel::update(shoes::table.find(id))
                        .set(&changeset)
                        .returning(ShoeRow::as_returning())
                        .get_result(conn)
                        .await
                        .optional()?;
                    if row.is_some() {
                        replace_color_links(conn, id, &color_ids).await?;
                    }
                    Ok::<_, diesel::result::Error>(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_diesel_error(err, "shoe update"))?;
        Ok(row.map(|row| row.into_domain(draft.color_ids)))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // Colour links cascade with the row.
        let deleted = diesel::delete(shoes::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "shoe delete"))?;
        Ok(deleted > 0)
    }

    async fn set_image_url(&self, id: Uuid, image_url: &str) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(shoes::table.find(id))
            .set((
                shoes::image_url.eq(image_url),
                shoes::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "shoe image url"))?;
        Ok(updated > 0)
    }
}
