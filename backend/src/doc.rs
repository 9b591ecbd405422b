//! OpenAPI documentation configuration.
//!
//! Registers every REST endpoint plus the domain schemas their responses
//! use. The generated document backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::attribute::{Attribute, AttributeKind, AttributeName, AttributeUsage};
use crate::domain::page::PageEnvelope;
use crate::domain::polish::{NailPolish, Rating};
use crate::domain::reclassify::{BrandOutcome, ReclassificationReport};
use crate::domain::shoe::Shoe;
use crate::domain::{Error, ErrorCode};
use crate::inbound::http::images::{
    FetchImagesResponse, UpdateImageRequest, UpdateImageResponse,
};
use crate::inbound::http::polishes::{
    BulkUpdateOldRequest, MixedBrandPayload, PolishAssignmentPayload, PolishPayload,
    UniformBrandPayload,
};
use crate::inbound::http::{attributes::CreateAttributeRequest, auth::LoginRequest, shoes::ShoePayload};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Closet backend API",
        description = "HTTP interface for the shoe and nail-polish inventory."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::attributes::list_attributes,
        crate::inbound::http::attributes::create_attribute,
        crate::inbound::http::attributes::delete_attribute,
        crate::inbound::http::shoes::list_shoes,
        crate::inbound::http::shoes::get_shoe,
        crate::inbound::http::shoes::create_shoe,
        crate::inbound::http::shoes::update_shoe,
        crate::inbound::http::shoes::delete_shoe,
        crate::inbound::http::polishes::list_polishes,
        crate::inbound::http::polishes::get_polish,
        crate::inbound::http::polishes::create_polish,
        crate::inbound::http::polishes::update_polish,
        crate::inbound::http::polishes::delete_polish,
        crate::inbound::http::polishes::bulk_update_old,
        crate::inbound::http::images::fetch_images,
        crate::inbound::http::images::update_image,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Attribute,
        AttributeKind,
        AttributeName,
        AttributeUsage,
        CreateAttributeRequest,
        Shoe,
        ShoePayload,
        PageEnvelope<Shoe>,
        PageEnvelope<NailPolish>,
        NailPolish,
        Rating,
        PolishPayload,
        BulkUpdateOldRequest,
        UniformBrandPayload,
        MixedBrandPayload,
        PolishAssignmentPayload,
        BrandOutcome,
        ReclassificationReport,
        LoginRequest,
        FetchImagesResponse,
        UpdateImageRequest,
        UpdateImageResponse,
    )),
    tags(
        (name = "auth", description = "Editor login and logout"),
        (name = "attributes", description = "Lookup attribute management"),
        (name = "shoes", description = "Shoe collection"),
        (name = "polishes", description = "Nail polish collection"),
        (name = "images", description = "Image scraping and selection"),
        (name = "health", description = "Health probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;

    #[test]
    fn document_lists_every_endpoint() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/login",
            "/api/attributes",
            "/api/attributes/{id}",
            "/api/shoes",
            "/api/shoes/{id}",
            "/api/polishes",
            "/api/polishes/bulk-update-old",
            "/api/fetch-images",
            "/api/update-image",
            "/healthz/ready",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing path: {path}");
        }
    }

    #[test]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components present");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
