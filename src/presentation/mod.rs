//! Presentation Layer
//!
//! Admin HTTP surface: health probes, metrics, and the group listing.

pub mod http;
