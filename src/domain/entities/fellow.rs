//! Destination gateway trait.
//!
//! The fellow chat service creates destination chats and accepts relayed
//! messages into them.

use async_trait::async_trait;

use super::message::RelayMessage;
use crate::shared::error::RelayError;

/// Capability to create fellow chats and deliver messages into them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DestinationGateway: Send + Sync {
    /// Create a chat with the given title and members, returning its id.
    async fn create_chat(&self, title: &str, members: &[String]) -> Result<i64, RelayError>;

    /// Deliver one message into an existing chat.
    async fn send(&self, destination_chat_id: i64, message: &RelayMessage)
        -> Result<(), RelayError>;
}
