//! Image scraping and selection endpoints.

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::image_scrape::FilterMode;

use super::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;
use super::validation::parse_http_url;

/// Query string for candidate scraping.
#[derive(Debug, Deserialize, IntoParams)]
pub struct FetchImagesQuery {
    /// Product page to scrape.
    pub url: String,
    /// Apply the strict keyword and size filter in addition to the
    /// extension blocklist.
    #[serde(default)]
    pub strict: bool,
}

/// Candidate URLs surviving the filters, in first-seen order.
#[derive(Debug, Serialize, ToSchema)]
pub struct FetchImagesResponse {
    /// Absolute candidate URLs.
    pub candidates: Vec<String>,
}

/// Selection payload: attach one scraped candidate to a shoe.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateImageRequest {
    /// Shoe to update.
    pub shoe_id: Uuid,
    /// Candidate URL chosen from a fetch-images response.
    pub image_url: String,
}

/// Result of an image selection.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateImageResponse {
    /// Shoe the image now belongs to.
    pub shoe_id: Uuid,
    /// Public URL persisted on the shoe.
    pub image_url: String,
}

/// Scrape a product page for shoe image candidates.
#[utoipa::path(
    get,
    path = "/api/fetch-images",
    tags = ["images"],
    security([]),
    params(FetchImagesQuery),
    responses(
        (status = 200, description = "Surviving candidate URLs", body = FetchImagesResponse),
        (status = 400, description = "Invalid page URL"),
        (status = 500, description = "The page could not be fetched")
    )
)]
#[get("/fetch-images")]
pub async fn fetch_images(
    state: web::Data<HttpState>,
    query: web::Query<FetchImagesQuery>,
) -> ApiResult<web::Json<FetchImagesResponse>> {
    let url = parse_http_url("url", &query.url)?;
    let mode = if query.strict {
        FilterMode::Strict
    } else {
        FilterMode::Extension
    };
    let candidates = state.candidates.fetch_candidates(&url, mode).await?;
    Ok(web::Json(FetchImagesResponse {
        candidates: candidates.into_iter().map(String::from).collect(),
    }))
}

/// Download a chosen candidate, re-host it, and attach it to the shoe.
#[utoipa::path(
    post,
    path = "/api/update-image",
    tags = ["images"],
    request_body = UpdateImageRequest,
    responses(
        (status = 200, description = "Stored image URL now on the shoe", body = UpdateImageResponse),
        (status = 400, description = "Invalid candidate URL"),
        (status = 401, description = "Not logged in as editor"),
        (status = 404, description = "No such shoe")
    )
)]
#[post("/update-image")]
pub async fn update_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Json<UpdateImageRequest>,
) -> ApiResult<web::Json<UpdateImageResponse>> {
    session.require_editor()?;
    let candidate = parse_http_url("imageUrl", &body.image_url)?;
    let selected = state.image_selection.apply(body.shoe_id, &candidate).await?;
    Ok(web::Json(UpdateImageResponse {
        shoe_id: selected.shoe_id,
        image_url: selected.image_url,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::test_session_middleware;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use std::sync::Arc;

    const PASSWORD: &str = "open sesame";

    #[actix_web::test]
    async fn bad_page_url_is_a_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(HttpState::fixture(PASSWORD)))
                .wrap(test_session_middleware())
                .service(fetch_images),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/fetch-images?url=ftp%3A%2F%2Fexample.com")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn update_image_requires_the_editor_session() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(HttpState::fixture(PASSWORD)))
                .wrap(test_session_middleware())
                .service(update_image),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/update-image")
                .set_json(serde_json::json!({
                    "shoeId": uuid::Uuid::new_v4(),
                    "imageUrl": "https://cdn.example.com/shoe.jpg"
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn update_image_for_unknown_shoe_is_not_found() {
        let collection = Arc::new(crate::domain::ports::InMemoryCollection::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(HttpState::fixture_with(collection, PASSWORD)))
                .wrap(test_session_middleware())
                .service(crate::inbound::http::auth::login)
                .service(update_image),
        )
        .await;
        let login = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/login")
                .set_json(serde_json::json!({ "password": PASSWORD }))
                .to_request(),
        )
        .await;
        let cookie = login
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned();

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/update-image")
                .cookie(cookie)
                .set_json(serde_json::json!({
                    "shoeId": uuid::Uuid::new_v4(),
                    "imageUrl": "https://cdn.example.com/shoe.jpg"
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
