//! # Fellow Relay Library
//!
//! This crate relays messages observed in one Telegram group into a
//! corresponding fellow chat:
//! - Telegram Bot API long polling for inbound events
//! - A bounded dispatch queue drained by a fixed worker set
//! - PostgreSQL for the source group to fellow chat mapping
//! - An HTTP gateway to the fellow chat service
//!
//! ## Architecture
//!
//! - **Domain Layer**: Group and message types, collaborator traits
//! - **Application Layer**: Listener, dispatch pool, relay controller
//! - **Infrastructure Layer**: PostgreSQL, Telegram, fellow gateway, metrics
//! - **Presentation Layer**: Admin HTTP endpoints
//!
//! ## Module Structure
//!
//! ```text
//! fellow_relay/
//! +-- config/         Configuration management
//! +-- domain/         Entities and collaborator traits
//! +-- application/    Relay pipeline services
//! +-- infrastructure/ Database, transport, gateway, metrics
//! +-- presentation/   Admin HTTP routes
//! +-- shared/         Error taxonomy
//! ```

// Configuration module
pub mod config;

// Domain layer - Core types and contracts
pub mod domain;

// Application layer - Relay pipeline
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - Admin HTTP
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
