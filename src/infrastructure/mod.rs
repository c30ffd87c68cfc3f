//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Database repositories (PostgreSQL)
//! - Telegram Bot API event transport
//! - Fellow chat HTTP gateway
//! - Prometheus metrics

pub mod database;
pub mod fellow;
pub mod metrics;
pub mod repositories;
pub mod telegram;
