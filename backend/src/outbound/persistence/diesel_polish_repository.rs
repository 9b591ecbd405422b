//! PostgreSQL-backed nail-polish adapter.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use uuid::Uuid;

use crate::domain::polish::{NailPolish, PolishDraft, PolishFilter};
use crate::domain::ports::{
    PolishAssignment, PolishListRequest, PolishRepository, RepositoryError,
};
use crate::domain::shoe::{SortDirection, SortKey};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    NewPolishColorRow, NewPolishFinishRow, NewPolishRow, PolishChangeset, PolishRow,
};
use super::pool::DbPool;
use super::schema::{attributes, polish_colors, polish_finishes, polishes};

/// Apply the list-view filters to a boxed query over `polishes`.
macro_rules! apply_polish_filters {
    ($query:expr, $filter:expr) => {{
        let filter: &PolishFilter = $filter;
        let mut query = $query;
        if let Some(id) = filter.brand_id {
            query = query.filter(polishes::brand_id.eq(id));
        }
        if let Some(id) = filter.color_id {
            query = query.filter(
                polishes::id.eq_any(
                    polish_colors::table
                        .filter(polish_colors::color_id.eq(id))
                        .select(polish_colors::polish_id),
                ),
            );
        }
        if let Some(id) = filter.finish_id {
            query = query.filter(
                polishes::id.eq_any(
                    polish_finishes::table
                        .filter(polish_finishes::finish_id.eq(id))
                        .select(polish_finishes::polish_id),
                ),
            );
        }
        if let Some(is_old) = filter.is_old {
            query = match is_old {
                Some(value) => query.filter(polishes::is_old.eq(value)),
                None => query.filter(polishes::is_old.is_null()),
            };
        }
        query
    }};
}

/// Diesel-backed implementation of the polish port.
#[derive(Clone)]
pub struct DieselPolishRepository {
    pool: DbPool,
}

impl DieselPolishRepository {
    /// Create a new repository over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Colour and finish links for the given polishes, grouped by polish id.
async fn polish_links(
    conn: &mut diesel_async::AsyncPgConnection,
    polish_ids: &[Uuid],
) -> Result<(HashMap<Uuid, Vec<Uuid>>, HashMap<Uuid, Vec<Uuid>>), diesel::result::Error> {
    let colors: Vec<(Uuid, Uuid)> = polish_colors::table
        .filter(polish_colors::polish_id.eq_any(polish_ids))
        .order_by((polish_colors::polish_id, polish_colors::color_id))
        .load(conn)
        .await?;
    let finishes: Vec<(Uuid, Uuid)> = polish_finishes::table
        .filter(polish_finishes::polish_id.eq_any(polish_ids))
        .order_by((polish_finishes::polish_id, polish_finishes::finish_id))
        .load(conn)
        .await?;
    let mut color_map: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (polish_id, color_id) in colors {
        color_map.entry(polish_id).or_default().push(color_id);
    }
    let mut finish_map: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (polish_id, finish_id) in finishes {
        finish_map.entry(polish_id).or_default().push(finish_id);
    }
    Ok((color_map, finish_map))
}

fn assemble(
    rows: Vec<PolishRow>,
    mut colors: HashMap<Uuid, Vec<Uuid>>,
    mut finishes: HashMap<Uuid, Vec<Uuid>>,
) -> Result<Vec<NailPolish>, RepositoryError> {
    rows.into_iter()
        .map(|row| {
            let color_ids = colors.remove(&row.id).unwrap_or_default();
            let finish_ids = finishes.remove(&row.id).unwrap_or_default();
            row.into_domain(color_ids, finish_ids)
                .map_err(RepositoryError::query)
        })
        .collect()
}

async fn replace_links(
    conn: &mut diesel_async::AsyncPgConnection,
    polish_id: Uuid,
    color_ids: &[Uuid],
    finish_ids: &[Uuid],
) -> Result<(), diesel::result::Error> {
    diesel::delete(polish_colors::table.filter(polish_colors::polish_id.eq(polish_id)))
        .execute(conn)
        .await?;
    diesel::delete(polish_finishes::table.filter(polish_finishes::polish_id.eq(polish_id)))
        .execute(conn)
        .await?;
    let colors: Vec<NewPolishColorRow> = color_ids
        .iter()
        .map(|&color_id| NewPolishColorRow {
            polish_id,
            color_id,
        })
        .collect();
    diesel::insert_into(polish_colors::table)
        .values(&colors)
        .execute(conn)
        .await?;
    let finishes: Vec<NewPolishFinishRow> = finish_ids
        .iter()
        .map(|&finish_id| NewPolishFinishRow {
            polish_id,
            finish_id,
        })
        .collect();
    diesel::insert_into(polish_finishes::table)
        .values(&finishes)
        .execute(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl PolishRepository for DieselPolishRepository {
    async fn list(
        &self,
        request: &PolishListRequest,
    ) -> Result<(Vec<NailPolish>, u64), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 =
            apply_polish_filters!(polishes::table.count().into_boxed(), &request.filter)
                .get_result(&mut conn)
                .await
                .map_err(|err| map_diesel_error(err, "polish count"))?;

        let rows: Vec<PolishRow> = match request.sort.key {
            SortKey::CreatedAt => {
                let mut query = apply_polish_filters!(
                    polishes::table.select(PolishRow::as_select()).into_boxed(),
                    &request.filter
                );
                query = match request.sort.direction {
                    SortDirection::Descending => {
                        query.order((polishes::created_at.desc(), polishes::id.desc()))
                    }
                    SortDirection::Ascending => {
                        query.order((polishes::created_at.asc(), polishes::id.asc()))
                    }
                };
                query
                    .offset(request.page.offset())
                    .limit(request.page.limit())
                    .load(&mut conn)
                    .await
            }
            SortKey::BrandName => {
                // Brandless polishes sort last in either direction.
                let joined = polishes::table
                    .left_join(
                        attributes::table.on(attributes::id.nullable().eq(polishes::brand_id)),
                    )
                    .select(PolishRow::as_select())
                    .into_boxed();
                let mut query = apply_polish_filters!(joined, &request.filter);
                query = match request.sort.direction {
                    SortDirection::Descending => query.order((
                        attributes::name.desc().nulls_last(),
                        polishes::name.desc(),
                        polishes::id.desc(),
                    )),
                    SortDirection::Ascending => query.order((
                        attributes::name.asc().nulls_last(),
                        polishes::name.asc(),
                        polishes::id.asc(),
                    )),
                };
                query
                    .offset(request.page.offset())
                    .limit(request.page.limit())
                    .load(&mut conn)
                    .await
            }
        }
        .map_err(|err| map_diesel_error(err, "polish list"))?;

        let polish_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let (colors, finishes) = polish_links(&mut conn, &polish_ids)
            .await
            .map_err(|err| map_diesel_error(err, "polish links"))?;
        Ok((
            assemble(rows, colors, finishes)?,
            u64::try_from(total).unwrap_or_default(),
        ))
    }

    async fn find(&self, id: Uuid) -> Result<Option<NailPolish>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PolishRow> = polishes::table
            .find(id)
            .select(PolishRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "polish find"))?;
        let Some(row) = row else {
            return Ok(None);
        };
        let (colors, finishes) = polish_links(&mut conn, &[row.id])
            .await
            .map_err(|err| map_diesel_error(err, "polish links"))?;
        Ok(assemble(vec![row], colors, finishes)?.pop())
    }

    async fn create(&self, draft: PolishDraft) -> Result<NailPolish, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let record = NewPolishRow::from_draft(Uuid::new_v4(), &draft, Utc::now());
        let color_ids = draft.color_ids.clone();
        let finish_ids = draft.finish_ids.clone();
        let row: PolishRow = conn
            .transaction(|conn| {
                async move {
                    let row: PolishRow = diesel::insert_into(polishes::table)
                        .values(&record)
                        .returning(PolishRow::as_returning())
                        .get_result(conn)
                        .await?;
                    replace_links(conn, row.id, &color_ids, &finish_ids).await?;
                    Ok::<_, diesel::result::Error>(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_diesel_error(err, "polish create"))?;
        row.into_domain(draft.color_ids, draft.finish_ids)
            .map_err(RepositoryError::query)
    }

    async fn update(
        &self,
        id: Uuid,
        draft: PolishDraft,
    ) -> Result<Option<NailPolish>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = PolishChangeset::from_draft(&draft, Utc::now());
        let color_ids = draft.color_ids.clone();
        let finish_ids = draft.finish_ids.clone();
        let row: Option<PolishRow> = conn
            .transaction(|conn| {
                async move {
                    let row: Option<PolishRow> = diesel::update(polishes::table.find(id))
                        .set(&changeset)
                        .returning(PolishRow::as_returning())
                        .get_result(conn)
                        .await
                        .optional()?;
                    if row.is_some() {
                        replace_links(conn, id, &color_ids, &finish_ids).await?;
                    }
                    Ok::<_, diesel::result::Error>(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_diesel_error(err, "polish update"))?;
        row.map(|row| {
            row.into_domain(draft.color_ids, draft.finish_ids)
                .map_err(RepositoryError::query)
        })
        .transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // Link rows cascade with the polish.
        let deleted = diesel::delete(polishes::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "polish delete"))?;
        Ok(deleted > 0)
    }

    async fn set_old_for_brand(
        &self,
        brand_id: Uuid,
        is_old: bool,
    ) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(polishes::table.filter(polishes::brand_id.eq(brand_id)))
            .set((polishes::is_old.eq(is_old), polishes::updated_at.eq(Utc::now())))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "polish brand age"))?;
        Ok(u64::try_from(updated).unwrap_or_default())
    }

    async fn set_old_for_polishes(
        &self,
        assignments: &[PolishAssignment],
    ) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let now = Utc::now();
        let old_ids: Vec<Uuid> = assignments
            .iter()
            .filter(|assignment| assignment.is_old)
            .map(|assignment| assignment.polish_id)
            .collect();
        let current_ids: Vec<Uuid> = assignments
            .iter()
            .filter(|assignment| !assignment.is_old)
            .map(|assignment| assignment.polish_id)
            .collect();
        let updated = conn
            .transaction(|conn| {
                async move {
                    let mut updated = 0usize;
                    if !old_ids.is_empty() {
                        updated += diesel::update(
                            polishes::table.filter(polishes::id.eq_any(&old_ids)),
                        )
                        .set((polishes::is_old.eq(true), polishes::updated_at.eq(now)))
                        .execute(conn)
                        .await?;
                    }
                    if !current_ids.is_empty() {
                        updated += diesel::update(
                            polishes::table.filter(polishes::id.eq_any(&current_ids)),
                        )
                        .set((polishes::is_old.eq(false), polishes::updated_at.eq(now)))
                        .execute(conn)
                        .await?;
                    }
                    Ok::<_, diesel::result::Error>(updated)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_diesel_error(err, "polish item age"))?;
        Ok(u64::try_from(updated).unwrap_or_default())
    }

    async fn set_old_false_excluding_brands(
        &self,
        brand_ids: &[Uuid],
    ) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            polishes::table.filter(
                polishes::brand_id
                    .ne_all(brand_ids)
                    .or(polishes::brand_id.is_null()),
            ),
        )
        .set((
            polishes::is_old.eq(false),
            polishes::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(err, "polish age default"))?;
        Ok(u64::try_from(updated).unwrap_or_default())
    }
}
