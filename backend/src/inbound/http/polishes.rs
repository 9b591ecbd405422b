//! Nail polish CRUD, list-view, and bulk age reclassification endpoints.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::page::PageEnvelope;
use crate::domain::polish::{NailPolish, PolishDraft, PolishFilter, Rating};
use crate::domain::ports::{PolishAssignment, PolishListRequest};
use crate::domain::reclassify::{
    BrandAgeAssignment, MixedBrandItems, ReclassificationReport, ReclassificationRequest,
};

use super::ApiResult;
use super::session::SessionContext;
use super::shoes::parse_sort;
use super::state::HttpState;
use super::validation::{field_error, parse_page, parse_uuid};

/// Query string for the polish list view. Every filter is optional.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PolishListQuery {
    /// Restrict to one brand.
    pub brand_id: Option<String>,
    /// Restrict to polishes carrying one colour.
    pub color_id: Option<String>,
    /// Restrict to polishes carrying one finish.
    pub finish_id: Option<String>,
    /// Age filter: `true`, `false`, or `null` for unclassified polishes.
    pub is_old: Option<String>,
    /// Sort key: `createdAt` (default) or `brandName`.
    pub sort: Option<String>,
    /// Sort direction: `desc` (default) or `asc`.
    pub sort_dir: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size, at most 100.
    pub per_page: Option<u32>,
}

fn parse_is_old(raw: Option<&String>) -> ApiResult<Option<Option<bool>>> {
    match raw.map(String::as_str) {
        None => Ok(None),
        Some("true") => Ok(Some(Some(true))),
        Some("false") => Ok(Some(Some(false))),
        Some("null") => Ok(Some(None)),
        Some(other) => Err(field_error(
            "isOld",
            format!("isOld must be true, false, or null, not {other}"),
        )),
    }
}

fn optional_uuid(field: &'static str, raw: Option<&String>) -> ApiResult<Option<Uuid>> {
    raw.map(|value| parse_uuid(field, value)).transpose()
}

impl PolishListQuery {
    fn into_request(self) -> ApiResult<PolishListRequest> {
        Ok(PolishListRequest {
            filter: PolishFilter {
                brand_id: optional_uuid("brandId", self.brand_id.as_ref())?,
                color_id: optional_uuid("colorId", self.color_id.as_ref())?,
                finish_id: optional_uuid("finishId", self.finish_id.as_ref())?,
                is_old: parse_is_old(self.is_old.as_ref())?,
            },
            sort: parse_sort(self.sort.as_ref(), self.sort_dir.as_ref())?,
            page: parse_page(self.page, self.per_page)?,
        })
    }
}

/// Request body for creating or replacing a polish.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PolishPayload {
    /// Display name, non-empty.
    pub name: String,
    /// Brand attribute link.
    #[serde(default)]
    pub brand_id: Option<Uuid>,
    /// Replacement colour set.
    #[serde(default)]
    pub color_ids: Vec<Uuid>,
    /// Replacement finish set.
    #[serde(default)]
    pub finish_ids: Vec<Uuid>,
    /// Ordinal rating grade, e.g. `A+` or `C-`.
    #[serde(default)]
    pub rating: Option<Rating>,
    /// Product or swatch link.
    #[serde(default)]
    pub link: Option<String>,
    /// Coats needed for full coverage.
    #[serde(default)]
    pub coats: Option<i16>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Date the polish was last worn.
    #[serde(default)]
    pub last_used: Option<NaiveDate>,
    /// Bottles currently on hand.
    #[serde(default = "default_bottle_count")]
    pub bottle_count: i32,
    /// Finished bottles kept for reference.
    #[serde(default)]
    pub empty_bottle_count: i32,
    /// Tri-state age flag.
    #[serde(default)]
    pub is_old: Option<bool>,
}

fn default_bottle_count() -> i32 {
    1
}

impl PolishPayload {
    fn into_draft(self) -> ApiResult<PolishDraft> {
        if self.name.trim().is_empty() {
            return Err(field_error("name", "name must not be empty"));
        }
        if self.bottle_count < 0 || self.empty_bottle_count < 0 {
            return Err(field_error(
                "bottleCount",
                "bottle counts must not be negative",
            ));
        }
        Ok(PolishDraft {
            name: self.name.trim().to_owned(),
            brand_id: self.brand_id,
            color_ids: self.color_ids,
            finish_ids: self.finish_ids,
            rating: self.rating,
            link: self.link,
            coats: self.coats,
            notes: self.notes,
            last_used: self.last_used,
            bottle_count: self.bottle_count,
            empty_bottle_count: self.empty_bottle_count,
            is_old: self.is_old,
        })
    }
}

/// One uniform brand assignment in the bulk payload.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UniformBrandPayload {
    /// Brand attribute id.
    pub brand_id: Uuid,
    /// Value applied to every polish of the brand.
    pub is_old: bool,
}

/// One per-polish assignment in the bulk payload.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PolishAssignmentPayload {
    /// Polish id.
    pub polish_id: Uuid,
    /// New age flag value.
    pub is_old: bool,
}

/// One mixed brand in the bulk payload.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MixedBrandPayload {
    /// Brand attribute id.
    pub brand_id: Uuid,
    /// Per-polish values.
    #[serde(default)]
    pub items: Vec<PolishAssignmentPayload>,
}

/// Bulk age reclassification payload. Brands mentioned in neither partition
/// have their polishes defaulted to not old.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateOldRequest {
    /// Brands with one value for every polish.
    #[serde(default)]
    pub uniform: Vec<UniformBrandPayload>,
    /// Brands reviewed polish by polish.
    #[serde(default)]
    pub mixed: Vec<MixedBrandPayload>,
}

impl From<BulkUpdateOldRequest> for ReclassificationRequest {
    fn from(payload: BulkUpdateOldRequest) -> Self {
        Self {
            uniform: payload
                .uniform
                .into_iter()
                .map(|brand| BrandAgeAssignment {
                    brand_id: brand.brand_id,
                    is_old: brand.is_old,
                })
                .collect(),
            mixed: payload
                .mixed
                .into_iter()
                .map(|brand| MixedBrandItems {
                    brand_id: brand.brand_id,
                    items: brand
                        .items
                        .into_iter()
                        .map(|item| PolishAssignment {
                            polish_id: item.polish_id,
                            is_old: item.is_old,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// One page of polishes matching the filters.
#[utoipa::path(
    get,
    path = "/api/polishes",
    tags = ["polishes"],
    security([]),
    params(PolishListQuery),
    responses(
        (status = 200, description = "Matching polishes with the total count", body = PageEnvelope<NailPolish>),
        (status = 400, description = "Invalid filter, sort, or page parameter")
    )
)]
#[get("/polishes")]
pub async fn list_polishes(
    state: web::Data<HttpState>,
    query: web::Query<PolishListQuery>,
) -> ApiResult<web::Json<PageEnvelope<NailPolish>>> {
    let request = query.into_inner().into_request()?;
    let (items, total) = state.polishes.list(&request).await?;
    Ok(web::Json(PageEnvelope::new(items, request.page, total)))
}

/// Fetch one polish.
#[utoipa::path(
    get,
    path = "/api/polishes/{id}",
    tags = ["polishes"],
    security([]),
    params(("id" = String, Path, description = "Polish id")),
    responses(
        (status = 200, description = "The polish", body = NailPolish),
        (status = 404, description = "No such polish")
    )
)]
#[get("/polishes/{id}")]
pub async fn get_polish(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<NailPolish>> {
    let id = parse_uuid("id", &path)?;
    match state.polishes.find(id).await? {
        Some(polish) => Ok(web::Json(polish)),
        None => Err(Error::not_found("no such polish")),
    }
}

/// Create a polish.
#[utoipa::path(
    post,
    path = "/api/polishes",
    tags = ["polishes"],
    request_body = PolishPayload,
    responses(
        (status = 201, description = "Created polish", body = NailPolish),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Not logged in as editor")
    )
)]
#[post("/polishes")]
pub async fn create_polish(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Json<PolishPayload>,
) -> ApiResult<HttpResponse> {
    session.require_editor()?;
    let draft = body.into_inner().into_draft()?;
    let polish = state.polishes.create(draft).await?;
    Ok(HttpResponse::Created().json(polish))
}

/// Replace a polish's fields and link sets.
#[utoipa::path(
    put,
    path = "/api/polishes/{id}",
    tags = ["polishes"],
    params(("id" = String, Path, description = "Polish id")),
    request_body = PolishPayload,
    responses(
        (status = 200, description = "Updated polish", body = NailPolish),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Not logged in as editor"),
        (status = 404, description = "No such polish")
    )
)]
#[put("/polishes/{id}")]
pub async fn update_polish(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    body: web::Json<PolishPayload>,
) -> ApiResult<web::Json<NailPolish>> {
    session.require_editor()?;
    let id = parse_uuid("id", &path)?;
    let draft = body.into_inner().into_draft()?;
    match state.polishes.update(id, draft).await? {
        Some(polish) => Ok(web::Json(polish)),
        None => Err(Error::not_found("no such polish")),
    }
}

/// Delete a polish and its links.
#[utoipa::path(
    delete,
    path = "/api/polishes/{id}",
    tags = ["polishes"],
    params(("id" = String, Path, description = "Polish id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Not logged in as editor"),
        (status = 404, description = "No such polish")
    )
)]
#[delete("/polishes/{id}")]
pub async fn delete_polish(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    session.require_editor()?;
    let id = parse_uuid("id", &path)?;
    if state.polishes.delete(id).await? {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(Error::not_found("no such polish"))
    }
}

/// Apply a bulk age reclassification across the whole polish collection.
///
/// Each brand's batched write succeeds or fails on its own; the report
/// carries per-brand outcomes rather than rolling back the save.
#[utoipa::path(
    post,
    path = "/api/polishes/bulk-update-old",
    tags = ["polishes"],
    request_body = BulkUpdateOldRequest,
    responses(
        (status = 200, description = "Per-brand outcomes and the defaulted row count", body = ReclassificationReport),
        (status = 400, description = "A brand appears in both partitions"),
        (status = 401, description = "Not logged in as editor")
    )
)]
#[post("/polishes/bulk-update-old")]
pub async fn bulk_update_old(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Json<BulkUpdateOldRequest>,
) -> ApiResult<web::Json<ReclassificationReport>> {
    session.require_editor()?;
    let report = state.reclassification.apply(body.into_inner().into()).await?;
    Ok(web::Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attribute::AttributeKind;
    use crate::domain::ports::{InMemoryCollection, PolishRepository};
    use crate::inbound::http::test_utils::test_session_middleware;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use std::sync::Arc;

    const PASSWORD: &str = "open sesame";

    macro_rules! polish_app {
        ($collection:expr) => {
            actix_test::init_service(
                App::new()
                    .app_data(web::Data::new(HttpState::fixture_with($collection, PASSWORD)))
                    .wrap(test_session_middleware())
                    .service(crate::inbound::http::auth::login)
                    .service(list_polishes)
                    .service(bulk_update_old)
                    .service(get_polish)
                    .service(create_polish)
                    .service(update_polish)
                    .service(delete_polish),
            )
            .await
        };
    }

    async fn login_cookie(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
    ) -> actix_web::cookie::Cookie<'static> {
        let res = actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri("/login")
                .set_json(serde_json::json!({ "password": PASSWORD }))
                .to_request(),
        )
        .await;
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned()
    }

    fn draft(name: &str, brand_id: Option<Uuid>, is_old: Option<bool>) -> PolishDraft {
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
            is_old,
        }
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some("true"), Some(Some(true)))]
    #[case(Some("false"), Some(Some(false)))]
    #[case(Some("null"), Some(None))]
    fn is_old_filter_parsing(#[case] raw: Option<&str>, #[case] expected: Option<Option<bool>>) {
        let parsed =
            parse_is_old(raw.map(str::to_owned).as_ref()).expect("valid filter");
        assert_eq!(parsed, expected);
    }

    #[rstest]
    fn unknown_is_old_filter_is_rejected() {
        assert!(parse_is_old(Some(&"maybe".to_owned())).is_err());
    }

    #[rstest]
    fn blank_name_is_rejected() {
        let payload: PolishPayload =
            serde_json::from_value(serde_json::json!({ "name": "   " })).expect("deserialise");
        assert!(payload.into_draft().is_err());
    }

    #[actix_web::test]
    async fn listing_filters_by_age() {
        let collection = Arc::new(InMemoryCollection::new());
        let repo: Arc<dyn PolishRepository> = collection.clone();
        repo.create(draft("old one", None, Some(true)))
            .await
            .expect("create");
        repo.create(draft("fresh one", None, Some(false)))
            .await
            .expect("create");
        repo.create(draft("unknown one", None, None))
            .await
            .expect("create");
        let app = polish_app!(collection);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/polishes?isOld=null")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = actix_test::read_body_json(res).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["items"][0]["name"], "unknown one");
    }

    #[actix_web::test]
    async fn create_round_trips_the_rating_grade() {
        let app = polish_app!(Arc::new(InMemoryCollection::new()));
        let cookie = login_cookie(&app).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/polishes")
                .cookie(cookie)
                .set_json(serde_json::json!({ "name": "Hot Coral", "rating": "A-", "coats": 2 }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: serde_json::Value = actix_test::read_body_json(res).await;
        assert_eq!(body["rating"], "A-");
        assert_eq!(body["bottleCount"], 1);
    }

    #[actix_web::test]
    async fn bulk_update_reports_per_brand_outcomes() {
        let collection = Arc::new(InMemoryCollection::new());
        let brand_a = collection.seed_attribute(AttributeKind::Brand, "A");
        let brand_b = collection.seed_attribute(AttributeKind::Brand, "B");
        let repo: Arc<dyn PolishRepository> = collection.clone();
        repo.create(draft("a1", Some(brand_a.id), None))
            .await
            .expect("create");
        let b1 = repo
            .create(draft("b1", Some(brand_b.id), None))
            .await
            .expect("create");
        repo.create(draft("stray", None, None))
            .await
            .expect("create");
        let app = polish_app!(collection);
        let cookie = login_cookie(&app).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/polishes/bulk-update-old")
                .cookie(cookie)
                .set_json(serde_json::json!({
                    "uniform": [{ "brandId": brand_a.id, "isOld": true }],
                    "mixed": [{
                        "brandId": brand_b.id,
                        "items": [{ "polishId": b1.id, "isOld": false }]
                    }]
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = actix_test::read_body_json(res).await;
        assert_eq!(body["brands"].as_array().expect("brands").len(), 2);
        assert_eq!(body["defaulted"], 1);
    }

    #[actix_web::test]
    async fn duplicate_brand_across_partitions_is_a_bad_request() {
        let collection = Arc::new(InMemoryCollection::new());
        let brand = collection.seed_attribute(AttributeKind::Brand, "A");
        let app = polish_app!(collection);
        let cookie = login_cookie(&app).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/polishes/bulk-update-old")
                .cookie(cookie)
                .set_json(serde_json::json!({
                    "uniform": [{ "brandId": brand.id, "isOld": true }],
                    "mixed": [{ "brandId": brand.id, "items": [] }]
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
