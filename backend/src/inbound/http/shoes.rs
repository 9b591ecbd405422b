//! Shoe CRUD and list-view endpoints.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::page::PageEnvelope;
use crate::domain::ports::ShoeListRequest;
use crate::domain::shoe::{Shoe, ShoeDraft, ShoeFilter, SortDirection, SortKey, SortOrder};

use super::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;
use super::validation::{field_error, parse_page, parse_uuid};

/// Query string for the shoe list view. Every filter is optional.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ShoeListQuery {
    /// Restrict to one brand.
    pub brand_id: Option<String>,
    /// Restrict to shoes carrying one colour.
    pub color_id: Option<String>,
    /// Restrict to one dress style.
    pub dress_style_id: Option<String>,
    /// Restrict to one shoe type.
    pub shoe_type_id: Option<String>,
    /// Restrict to one heel type.
    pub heel_type_id: Option<String>,
    /// Restrict to one location.
    pub location_id: Option<String>,
    /// Sort key: `createdAt` (default) or `brandName`.
    pub sort: Option<String>,
    /// Sort direction: `desc` (default) or `asc`.
    pub sort_dir: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size, at most 100.
    pub per_page: Option<u32>,
}

/// Request body for creating or replacing a shoe.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShoePayload {
    /// Public image URL.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Brand attribute link.
    #[serde(default)]
    pub brand_id: Option<Uuid>,
    /// Storage location link.
    #[serde(default)]
    pub location_id: Option<Uuid>,
    /// Shoe type link.
    #[serde(default)]
    pub shoe_type_id: Option<Uuid>,
    /// Heel type link.
    #[serde(default)]
    pub heel_type_id: Option<Uuid>,
    /// Dress style link.
    #[serde(default)]
    pub dress_style_id: Option<Uuid>,
    /// Replacement colour set.
    #[serde(default)]
    pub color_ids: Vec<Uuid>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<ShoePayload> for ShoeDraft {
    fn from(payload: ShoePayload) -> Self {
        Self {
            image_url: payload.image_url,
            brand_id: payload.brand_id,
            location_id: payload.location_id,
            shoe_type_id: payload.shoe_type_id,
            heel_type_id: payload.heel_type_id,
            dress_style_id: payload.dress_style_id,
            color_ids: payload.color_ids,
            notes: payload.notes,
        }
    }
}

fn optional_uuid(field: &'static str, raw: Option<&String>) -> ApiResult<Option<Uuid>> {
    raw.map(|value| parse_uuid(field, value)).transpose()
}

pub(crate) fn parse_sort(
    sort: Option<&String>,
    sort_dir: Option<&String>,
) -> ApiResult<SortOrder> {
    let key = match sort.map(String::as_str) {
        None | Some("createdAt") => SortKey::CreatedAt,
        Some("brandName") => SortKey::BrandName,
        Some(other) => return Err(field_error("sort", format!("unknown sort key: {other}"))),
    };
    let direction = match sort_dir.map(String::as_str) {
        None | Some("desc") => SortDirection::Descending,
        Some("asc") => SortDirection::Ascending,
        Some(other) => {
            return Err(field_error(
                "sortDir",
                format!("sortDir must be asc or desc, not {other}"),
            ));
        }
    };
    Ok(SortOrder { key, direction })
}

impl ShoeListQuery {
    fn into_request(self) -> ApiResult<ShoeListRequest> {
        Ok(ShoeListRequest {
            filter: ShoeFilter {
                brand_id: optional_uuid("brandId", self.brand_id.as_ref())?,
                color_id: optional_uuid("colorId", self.color_id.as_ref())?,
                dress_style_id: optional_uuid("dressStyleId", self.dress_style_id.as_ref())?,
                shoe_type_id: optional_uuid("shoeTypeId", self.shoe_type_id.as_ref())?,
                heel_type_id: optional_uuid("heelTypeId", self.heel_type_id.as_ref())?,
                location_id: optional_uuid("locationId", self.location_id.as_ref())?,
            },
            sort: parse_sort(self.sort.as_ref(), self.sort_dir.as_ref())?,
            page: parse_page(self.page, self.per_page)?,
        })
    }
}

/// One page of shoes matching the filters.
#[utoipa::path(
    get,
    path = "/api/shoes",
    tags = ["shoes"],
    security([]),
    params(ShoeListQuery),
    responses(
        (status = 200, description = "Matching shoes with the total count", body = PageEnvelope<Shoe>),
        (status = 400, description = "Invalid filter, sort, or page parameter")
    )
)]
#[get("/shoes")]
pub async fn list_shoes(
    state: web::Data<HttpState>,
    query: web::Query<ShoeListQuery>,
) -> ApiResult<web::Json<PageEnvelope<Shoe>>> {
    let request = query.into_inner().into_request()?;
    let (items, total) = state.shoes.list(&request).await?;
    Ok(web::Json(PageEnvelope::new(items, request.page, total)))
}

/// Fetch one shoe.
#[utoipa::path(
    get,
    path = "/api/shoes/{id}",
    tags = ["shoes"],
    security([]),
    params(("id" = String, Path, description = "Shoe id")),
    responses(
        (status = 200, description = "The shoe", body = Shoe),
        (status = 404, description = "No such shoe")
    )
)]
#[get("/shoes/{id}")]
pub async fn get_shoe(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Shoe>> {
    let id = parse_uuid("id", &path)?;
    match state.shoes.find(id).await? {
        Some(shoe) => Ok(web::Json(shoe)),
        None => Err(crate::domain::Error::not_found("no such shoe")),
    }
}

/// Create a shoe.
#[utoipa::path(
    post,
    path = "/api/shoes",
    tags = ["shoes"],
    request_body = ShoePayload,
    responses(
        (status = 201, description = "Created shoe", body = Shoe),
        (status = 401, description = "Not logged in as editor")
    )
)]
#[post("/shoes")]
pub async fn create_shoe(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Json<ShoePayload>,
) -> ApiResult<HttpResponse> {
    session.require_editor()?;
    let shoe = state.shoes.create(body.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(shoe))
}

/// Replace a shoe's fields and colour set.
#[utoipa::path(
    put,
    path = "/api/shoes/{id}",
    tags = ["shoes"],
    params(("id" = String, Path, description = "Shoe id")),
    request_body = ShoePayload,
    responses(
        (status = 200, description = "Updated shoe", body = Shoe),
        (status = 401, description = "Not logged in as editor"),
        (status = 404, description = "No such shoe")
    )
)]
#[put("/shoes/{id}")]
pub async fn update_shoe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    body: web::Json<ShoePayload>,
) -> ApiResult<web::Json<Shoe>> {
    session.require_editor()?;
    let id = parse_uuid("id", &path)?;
    match state.shoes.update(id, body.into_inner().into()).await? {
        Some(shoe) => Ok(web::Json(shoe)),
        None => Err(crate::domain::Error::not_found("no such shoe")),
    }
}

/// Delete a shoe and its colour links.
#[utoipa::path(
    delete,
    path = "/api/shoes/{id}",
    tags = ["shoes"],
    params(("id" = String, Path, description = "Shoe id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Not logged in as editor"),
        (status = 404, description = "No such shoe")
    )
)]
#[delete("/shoes/{id}")]
pub async fn delete_shoe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    session.require_editor()?;
    let id = parse_uuid("id", &path)?;
    if state.shoes.delete(id).await? {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(crate::domain::Error::not_found("no such shoe"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attribute::AttributeKind;
    use crate::domain::ports::{InMemoryCollection, ShoeRepository};
    use crate::inbound::http::test_utils::test_session_middleware;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use std::sync::Arc;

    const PASSWORD: &str = "open sesame";

    macro_rules! shoe_app {
        ($collection:expr) => {
            actix_test::init_service(
                App::new()
                    .app_data(web::Data::new(HttpState::fixture_with($collection, PASSWORD)))
                    .wrap(test_session_middleware())
                    .service(crate::inbound::http::auth::login)
                    .service(list_shoes)
                    .service(get_shoe)
                    .service(create_shoe)
                    .service(update_shoe)
                    .service(delete_shoe),
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

    #[rstest]
    #[case(None, None, SortKey::CreatedAt, SortDirection::Descending)]
    #[case(Some("brandName"), Some("asc"), SortKey::BrandName, SortDirection::Ascending)]
    #[case(Some("createdAt"), Some("desc"), SortKey::CreatedAt, SortDirection::Descending)]
    fn sort_parsing(
        #[case] sort: Option<&str>,
        #[case] dir: Option<&str>,
        #[case] key: SortKey,
        #[case] direction: SortDirection,
    ) {
        let order = parse_sort(
            sort.map(str::to_owned).as_ref(),
            dir.map(str::to_owned).as_ref(),
        )
        .expect("valid sort");
        assert_eq!(order, SortOrder { key, direction });
    }

    #[rstest]
    fn unknown_sort_key_is_rejected() {
        assert!(parse_sort(Some(&"size".to_owned()), None).is_err());
    }

    #[actix_web::test]
    async fn listing_filters_and_pages() {
        let collection = Arc::new(InMemoryCollection::new());
        let brand = collection.seed_attribute(AttributeKind::Brand, "Fluevog");
        for _ in 0..3 {
            ShoeRepository::create(
                collection.as_ref(),
                ShoeDraft {
                    brand_id: Some(brand.id),
                    ..ShoeDraft::default()
                },
            )
            .await
            .expect("create shoe");
        }
        ShoeRepository::create(collection.as_ref(), ShoeDraft::default())
            .await
            .expect("create shoe");
        let app = shoe_app!(collection);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/shoes?brandId={}&perPage=2", brand.id))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = actix_test::read_body_json(res).await;
        assert_eq!(body["total"], 3);
        assert_eq!(body["items"].as_array().expect("items").len(), 2);
        assert_eq!(body["perPage"], 2);
    }

    #[actix_web::test]
    async fn invalid_page_is_a_bad_request() {
        let app = shoe_app!(Arc::new(InMemoryCollection::new()));
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/shoes?page=0").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn writes_require_the_editor_session() {
        let app = shoe_app!(Arc::new(InMemoryCollection::new()));
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/shoes")
                .set_json(serde_json::json!({}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn create_update_delete_round_trip() {
        let collection = Arc::new(InMemoryCollection::new());
        let color = collection.seed_attribute(AttributeKind::Color, "Red");
        let app = shoe_app!(collection);
        let cookie = login_cookie(&app).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/shoes")
                .cookie(cookie.clone())
                .set_json(serde_json::json!({ "colorIds": [color.id], "notes": "velvet" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: serde_json::Value = actix_test::read_body_json(res).await;
        let id = created["id"].as_str().expect("id").to_owned();
        assert_eq!(created["notes"], "velvet");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&format!("/shoes/{id}"))
                .cookie(cookie.clone())
                .set_json(serde_json::json!({ "notes": "resoled" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let updated: serde_json::Value = actix_test::read_body_json(res).await;
        assert_eq!(updated["notes"], "resoled");
        // A full replace clears the colour set too.
        assert_eq!(updated["colorIds"], serde_json::json!([]));

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/shoes/{id}"))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri(&format!("/shoes/{id}")).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
