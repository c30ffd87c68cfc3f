//! # Domain Layer
//!
//! The domain layer contains the types the relay pipeline moves around and
//! the contracts of its external collaborators. It does not depend on the
//! infrastructure or presentation layers.
//!
//! ## Structure
//!
//! - **entities**: Group, RelayMessage, platform events, and collaborator traits

pub mod entities;

// Re-export commonly used types
pub use entities::*;
