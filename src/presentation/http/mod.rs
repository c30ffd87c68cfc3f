//! HTTP Layer
//!
//! Admin routes and handlers.

pub mod handlers;
pub mod routes;
