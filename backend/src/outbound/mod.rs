//! Outbound adapters: implementations of the domain ports against real
//! infrastructure (PostgreSQL, HTTP).

pub mod fetch;
pub mod persistence;
pub mod scrape;
pub mod storage;
