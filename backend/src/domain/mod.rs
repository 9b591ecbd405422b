//! Domain types, ports, and services for the closet collection.
//!
//! Purpose: define strongly typed entities for shoes, nail polishes, and
//! lookup attributes, the ports adapters implement, and the services that
//! orchestrate them. Keep types immutable and document invariants and
//! serialisation contracts (serde) in each type's Rustdoc.

pub mod attribute;
pub mod attribute_admin;
pub mod error;
pub mod image_filename;
pub mod image_scrape;
pub mod image_selection;
pub mod page;
pub mod polish;
pub mod ports;
pub mod reclassify;
pub mod shoe;

pub use self::error::{Error, ErrorCode};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use closet_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
