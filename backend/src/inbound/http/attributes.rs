//! Attribute management endpoints.

use actix_web::{HttpResponse, delete, get, post, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::domain::attribute::{Attribute, AttributeKind, AttributeName, AttributeUsage};

use super::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;
use super::validation::{field_error, parse_uuid};

/// Query string for attribute listings.
#[derive(Debug, Deserialize, IntoParams)]
pub struct AttributeListQuery {
    /// Attribute kind, e.g. `brand` or `dress_style`.
    pub kind: String,
}

/// Creation payload.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAttributeRequest {
    /// Attribute kind, e.g. `brand` or `dress_style`.
    pub kind: String,
    /// Display name, unique within the kind.
    pub name: String,
}

fn parse_kind(raw: &str) -> ApiResult<AttributeKind> {
    raw.parse()
        .map_err(|_| field_error("kind", format!("unknown attribute kind: {raw}")))
}

fn parse_name(raw: &str) -> ApiResult<AttributeName> {
    AttributeName::new(raw).map_err(|err| field_error("name", err.to_string()))
}

/// List one kind's attributes with usage counts and percentage shares.
#[utoipa::path(
    get,
    path = "/api/attributes",
    tags = ["attributes"],
    security([]),
    params(AttributeListQuery),
    responses(
        (status = 200, description = "Attributes of the kind, ordered by name", body = [AttributeUsage]),
        (status = 400, description = "Unknown kind")
    )
)]
#[get("/attributes")]
pub async fn list_attributes(
    state: web::Data<HttpState>,
    query: web::Query<AttributeListQuery>,
) -> ApiResult<web::Json<Vec<AttributeUsage>>> {
    let kind = parse_kind(&query.kind)?;
    Ok(web::Json(state.attribute_admin.list(kind).await?))
}

/// Create an attribute.
#[utoipa::path(
    post,
    path = "/api/attributes",
    tags = ["attributes"],
    request_body = CreateAttributeRequest,
    responses(
        (status = 201, description = "Created attribute", body = Attribute),
        (status = 400, description = "Unknown kind, invalid name, or duplicate name"),
        (status = 401, description = "Not logged in as editor")
    )
)]
#[post("/attributes")]
pub async fn create_attribute(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Json<CreateAttributeRequest>,
) -> ApiResult<HttpResponse> {
    session.require_editor()?;
    let kind = parse_kind(&body.kind)?;
    let name = parse_name(&body.name)?;
    let attribute = state.attribute_admin.create(kind, name).await?;
    Ok(HttpResponse::Created().json(attribute))
}

/// Delete an unused attribute, returning the kind's refreshed listing.
#[utoipa::path(
    delete,
    path = "/api/attributes/{id}",
    tags = ["attributes"],
    params(("id" = String, Path, description = "Attribute id")),
    responses(
        (status = 200, description = "Refreshed listing for the attribute's kind", body = [AttributeUsage]),
        (status = 401, description = "Not logged in as editor"),
        (status = 404, description = "No such attribute"),
        (status = 409, description = "Attribute is still referenced; details carry usageCount")
    )
)]
#[delete("/attributes/{id}")]
pub async fn delete_attribute(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<AttributeUsage>>> {
    session.require_editor()?;
    let id = parse_uuid("id", &path)?;
    Ok(web::Json(state.attribute_admin.delete(id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{InMemoryCollection, ShoeRepository};
    use crate::domain::shoe::ShoeDraft;
    use crate::inbound::http::test_utils::test_session_middleware;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use std::sync::Arc;

    const PASSWORD: &str = "open sesame";

    fn app_state(collection: Arc<InMemoryCollection>) -> web::Data<HttpState> {
        web::Data::new(HttpState::fixture_with(collection, PASSWORD))
    }

    async fn login_cookie(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
    ) -> actix_web::cookie::Cookie<'static> {
        let res = test::call_service(
            app,
            test::TestRequest::post()
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

    macro_rules! attribute_app {
        ($collection:expr) => {
            test::init_service(
                App::new()
                    .app_data(app_state($collection))
                    .wrap(test_session_middleware())
                    .service(crate::inbound::http::auth::login)
                    .service(list_attributes)
                    .service(create_attribute)
                    .service(delete_attribute),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn listing_is_open_and_ordered_by_name() {
        let collection = Arc::new(InMemoryCollection::new());
        collection.seed_attribute(AttributeKind::Brand, "Zeta");
        collection.seed_attribute(AttributeKind::Brand, "Alpha");
        let app = attribute_app!(collection);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/attributes?kind=brand")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        let names: Vec<&str> = body
            .as_array()
            .expect("array")
            .iter()
            .map(|row| row["name"].as_str().expect("name"))
            .collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }

    #[actix_web::test]
    async fn unknown_kind_is_a_bad_request() {
        let app = attribute_app!(Arc::new(InMemoryCollection::new()));
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/attributes?kind=flavour")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn create_requires_the_editor_session() {
        let app = attribute_app!(Arc::new(InMemoryCollection::new()));
        let payload = serde_json::json!({ "kind": "color", "name": "Teal" });

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/attributes")
                .set_json(&payload)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let cookie = login_cookie(&app).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/attributes")
                .cookie(cookie)
                .set_json(&payload)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["name"], "Teal");
    }

    #[actix_web::test]
    async fn delete_of_referenced_attribute_conflicts() {
        let collection = Arc::new(InMemoryCollection::new());
        let brand = collection.seed_attribute(AttributeKind::Brand, "Fluevog");
        ShoeRepository::create(
            collection.as_ref(),
            ShoeDraft {
                brand_id: Some(brand.id),
                ..ShoeDraft::default()
            },
        )
        .await
        .expect("create shoe");
        let app = attribute_app!(collection);
        let cookie = login_cookie(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/attributes/{}", brand.id))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["usageCount"], 1);
    }

    #[actix_web::test]
    async fn delete_of_unused_attribute_returns_the_refreshed_listing() {
        let collection = Arc::new(InMemoryCollection::new());
        let keep = collection.seed_attribute(AttributeKind::Finish, "Creme");
        let drop = collection.seed_attribute(AttributeKind::Finish, "Shimmer");
        let app = attribute_app!(collection);
        let cookie = login_cookie(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/attributes/{}", drop.id))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        let listing = body.as_array().expect("array");
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0]["id"], serde_json::json!(keep.id));
    }
}
