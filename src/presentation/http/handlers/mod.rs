//! HTTP Handlers
//!
//! Request handlers for the admin endpoints.

pub mod group;
pub mod health;
