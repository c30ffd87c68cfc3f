//! Shared Utilities
//!
//! Common utilities used across all layers.

pub mod error;

pub use error::RelayError;
