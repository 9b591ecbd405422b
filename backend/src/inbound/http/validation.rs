//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;
use url::Url;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::page::{DEFAULT_PER_PAGE, PageRequest, PageRequestError};

/// Build an invalid-request error carrying the offending field.
pub(crate) fn field_error(field: &'static str, message: impl Into<String>) -> Error {
    Error::invalid_request(message.into()).with_details(json!({ "field": field }))
}

/// Parse a UUID path or query value.
pub(crate) fn parse_uuid(field: &'static str, raw: &str) -> Result<Uuid, Error> {
    raw.parse()
        .map_err(|_| field_error(field, format!("{field} must be a UUID")))
}

/// Parse an absolute http(s) URL.
pub(crate) fn parse_http_url(field: &'static str, raw: &str) -> Result<Url, Error> {
    let url = Url::parse(raw.trim())
        .map_err(|err| field_error(field, format!("{field} must be an absolute URL: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(field_error(field, format!("{field} must use http or https")));
    }
    Ok(url)
}

/// Build a page request from optional query values, applying defaults.
pub(crate) fn parse_page(page: Option<u32>, per_page: Option<u32>) -> Result<PageRequest, Error> {
    PageRequest::new(page.unwrap_or(1), per_page.unwrap_or(DEFAULT_PER_PAGE)).map_err(|err| {
        match err {
            PageRequestError::ZeroPage => field_error("page", "page must be at least 1"),
            PageRequestError::PerPageOutOfRange => {
                field_error("perPage", "perPage must be between 1 and 100")
            }
        }
    })
}
