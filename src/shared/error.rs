//! Relay Error Types
//!
//! Centralized error taxonomy for the relay pipeline, with Axum integration
//! for the admin API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Relay error type
///
/// Events that are filtered out by the listener are not errors and never
/// produce one of these.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Persistence unavailable or a query failed
    #[error("Store error: {0}")]
    Store(String),

    /// The destination chat could not be created
    #[error("Creation error: {0}")]
    Creation(String),

    /// Sending to the destination chat failed
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// A mapping for this source group already exists
    #[error("Conflict: group {source_group_id} is already mapped")]
    Conflict { source_group_id: i64 },

    /// The platform event transport failed
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RelayError {
    /// Short, stable label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Store(_) => "store",
            RelayError::Creation(_) => "creation",
            RelayError::Delivery(_) => "delivery",
            RelayError::Conflict { .. } => "conflict",
            RelayError::Transport(_) => "transport",
            RelayError::Config(_) => "config",
        }
    }
}

impl From<sqlx::Error> for RelayError {
    fn from(e: sqlx::Error) -> Self {
        RelayError::Store(e.to_string())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            RelayError::Conflict { .. } => (StatusCode::CONFLICT, 10005, self.to_string()),
            RelayError::Config(msg) => (StatusCode::BAD_REQUEST, 10002, msg.clone()),
            other => {
                tracing::error!(kind = other.kind(), "Admin request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, 10000, "Internal server error".into())
            }
        };

        let body = ErrorResponse { code, message };

        (status, Json(body)).into_response()
    }
}
