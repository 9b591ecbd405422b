//! Inventory backend for a personal shoe and nail-polish collection.
//!
//! Layered hexagonally: `domain` holds the entities, ports, and services;
//! `inbound` the HTTP adapter; `outbound` the Diesel, reqwest, and bucket
//! adapters; `server` wires everything into an Actix application.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use doc::ApiDoc;
pub use middleware::Trace;
