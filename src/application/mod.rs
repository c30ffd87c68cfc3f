//! Application Layer
//!
//! Services that run the relay pipeline on top of the domain contracts.

pub mod services;
