//! Login and logout for the single editor identity.
//!
//! There are no user accounts: one shared password unlocks editing, and a
//! successful login marks the session cookie. Reads never require a login.

use actix_web::{HttpResponse, post, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::Error;

use super::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;

/// Login payload.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// The editor password.
    pub password: String,
}

/// Compare the submitted password without short-circuiting on the first
/// mismatched byte.
fn password_matches(expected: &str, submitted: &str) -> bool {
    let expected = expected.as_bytes();
    let submitted = submitted.as_bytes();
    let mut diff = expected.len() ^ submitted.len();
    for (a, b) in expected.iter().zip(submitted.iter()) {
        diff |= usize::from(a ^ b);
    }
    diff == 0
}

/// Exchange the editor password for an editor session cookie.
#[utoipa::path(
    post,
    path = "/api/login",
    tags = ["auth"],
    security([]),
    request_body = LoginRequest,
    responses(
        (status = 204, description = "Logged in; the session cookie now carries the editor mark"),
        (status = 401, description = "Wrong password")
    )
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    if !password_matches(&state.editor_password, &body.password) {
        return Err(Error::unauthorized("wrong password"));
    }
    session.persist_editor()?;
    Ok(HttpResponse::NoContent().finish())
}

/// Drop the editor session.
#[utoipa::path(
    post,
    path = "/api/logout",
    tags = ["auth"],
    responses(
        (status = 204, description = "Session cleared")
    )
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::test_session_middleware;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;

    #[rstest]
    #[case("hunter2", "hunter2", true)]
    #[case("hunter2", "hunter3", false)]
    #[case("hunter2", "hunter22", false)]
    #[case("hunter2", "", false)]
    fn password_comparison(#[case] expected: &str, #[case] submitted: &str, #[case] ok: bool) {
        assert_eq!(password_matches(expected, submitted), ok);
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorised() {
        let state = web::Data::new(HttpState::fixture("correct horse"));
        let app = actix_test::init_service(
            App::new()
                .app_data(state)
                .wrap(test_session_middleware())
                .service(login),
        )
        .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/login")
                .set_json(serde_json::json!({ "password": "battery staple" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn login_sets_the_editor_cookie() {
        let state = web::Data::new(HttpState::fixture("correct horse"));
        let app = actix_test::init_service(
            App::new()
                .app_data(state)
                .wrap(test_session_middleware())
                .service(login),
        )
        .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/login")
                .set_json(serde_json::json!({ "password": "correct horse" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert!(
            res.response()
                .cookies()
                .any(|cookie| cookie.name() == "session")
        );
    }
}
