//! Group entity and repository trait.
//!
//! Maps to the `groups` table in the database schema.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::shared::error::RelayError;

/// Mapping from a watched source group to its fellow (destination) chat.
///
/// Maps to the `groups` table:
/// - telegram_id: BIGINT PRIMARY KEY
/// - fellow_chat_id: BIGINT NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
///
/// A group is created once, the first time its source is seen, and never
/// updated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group {
    /// Identity of the source chat on the platform
    pub source_group_id: i64,

    /// Identity of the fellow chat receiving relayed messages
    pub destination_chat_id: i64,
}

impl Group {
    pub fn new(source_group_id: i64, destination_chat_id: i64) -> Self {
        Self {
            source_group_id,
            destination_chat_id,
        }
    }
}

/// Repository trait for Group persistence.
///
/// Implementations must be safe to share across dispatch workers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Every persisted mapping. An empty result is not an error.
    async fn get_all(&self) -> Result<Vec<Group>, RelayError>;

    /// Find the mapping for one source group.
    async fn find_by_source(&self, source_group_id: i64) -> Result<Option<Group>, RelayError>;

    /// Persist a new mapping.
    ///
    /// Fails with [`RelayError::Conflict`] if the source group is already
    /// mapped; an existing destination is never overwritten.
    async fn insert(
        &self,
        source_group_id: i64,
        destination_chat_id: i64,
    ) -> Result<Group, RelayError>;
}
