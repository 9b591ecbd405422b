//! PostgreSQL persistence adapters.
//!
//! Diesel-backed implementations of the repository ports, plus the shared
//! pool, schema definitions, row models, and error mapping they use.

mod diesel_attribute_repository;
mod diesel_polish_repository;
mod diesel_shoe_repository;
mod error_mapping;
mod models;
pub mod pool;
pub mod schema;

pub use diesel_attribute_repository::DieselAttributeRepository;
pub use diesel_polish_repository::DieselPolishRepository;
pub use diesel_shoe_repository::DieselShoeRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
