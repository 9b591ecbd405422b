//! HTTP inbound adapter exposing the REST endpoints.

pub mod attributes;
pub mod auth;
pub mod error;
pub mod health;
pub mod images;
pub mod polishes;
pub mod session;
pub mod shoes;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
