//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use crate::infrastructure::repositories::PgGroupRepository;
//!
//! async fn setup_repositories(pool: PgPool) {
//!     let group_repo = PgGroupRepository::new(pool.clone());
//! }
//! ```

pub mod group_repository;

pub use group_repository::PgGroupRepository;
