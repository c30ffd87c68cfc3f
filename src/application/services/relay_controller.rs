//! Relay Controller
//!
//! Resolves a source group to its fellow chat, creating the fellow chat on
//! first sight, and delivers messages into it.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn, Instrument, Span};

use crate::domain::{DestinationGateway, Group, GroupRepository, RelayMessage};
use crate::infrastructure::metrics;
use crate::shared::error::RelayError;

/// Relay service trait
#[async_trait]
pub trait RelayService: Send + Sync {
    /// Deliver one message to the fellow chat of its source group.
    async fn forward(&self, message: RelayMessage) -> Result<(), RelayError>;

    /// Every known source group mapping.
    async fn list_groups(&self) -> Result<Vec<Group>, RelayError>;
}

/// RelayService implementation
///
/// The group cache maps source group id to fellow chat id and only ever
/// holds mappings that were loaded from or written to the repository.
/// Resolution on a cache miss is serialized per source group, so a source
/// seen concurrently by several workers gets exactly one fellow chat.
pub struct RelayController<R, G>
where
    R: GroupRepository,
    G: DestinationGateway,
{
    group_repo: Arc<R>,
    gateway: Arc<G>,
    members: Vec<String>,
    cache: DashMap<i64, i64>,
    creation_locks: DashMap<i64, Arc<Mutex<()>>>,
    span: Span,
}

impl<R, G> RelayController<R, G>
where
    R: GroupRepository,
    G: DestinationGateway,
{
    pub fn new(group_repo: Arc<R>, gateway: Arc<G>, members: Vec<String>) -> Self {
        Self {
            group_repo,
            gateway,
            members,
            cache: DashMap::new(),
            creation_locks: DashMap::new(),
            span: tracing::info_span!("relay", component = "relay"),
        }
    }

    /// Load every persisted mapping into the cache. Returns how many were loaded.
    pub async fn warm_cache(&self) -> Result<usize, RelayError> {
        let groups = self.group_repo.get_all().await?;
        for group in &groups {
            self.cache
                .insert(group.source_group_id, group.destination_chat_id);
        }
        info!(parent: &self.span, count = groups.len(), "Group cache warmed");
        Ok(groups.len())
    }

    /// Cached fellow chat for a source group, if any.
    pub fn cached_destination(&self, source_group_id: i64) -> Option<i64> {
        self.cache.get(&source_group_id).map(|entry| *entry.value())
    }

    async fn resolve_destination(&self, message: &RelayMessage) -> Result<i64, RelayError> {
        let source = message.source_chat_id;
        if let Some(destination) = self.cached_destination(source) {
            return Ok(destination);
        }

        let lock = self.creation_locks.entry(source).or_default().clone();
        let _guard = lock.lock().await;

        // Another worker may have resolved it while we waited.
        let resolved = match self.cached_destination(source) {
            Some(destination) => Ok(destination),
            None => self.lookup_or_create(message).await,
        };

        // Only the map and this call hold the lock when nobody else is waiting on it.
        self.creation_locks
            .remove_if(&source, |_, held| Arc::strong_count(held) <= 2);

        resolved
    }

    async fn lookup_or_create(&self, message: &RelayMessage) -> Result<i64, RelayError> {
        let group = match self.group_repo.find_by_source(message.source_chat_id).await? {
            Some(group) => group,
            None => self.create_group(message).await?,
        };

        self.cache
            .insert(group.source_group_id, group.destination_chat_id);
        Ok(group.destination_chat_id)
    }

    async fn create_group(&self, message: &RelayMessage) -> Result<Group, RelayError> {
        let source = message.source_chat_id;
        let title = message.fellow_title();

        let destination = self
            .gateway
            .create_chat(&title, &self.members)
            .await
            .map_err(|e| match e {
                RelayError::Creation(_) => e,
                other => RelayError::Creation(other.to_string()),
            })?;
        metrics::record_group_created();
        info!(
            source_group_id = source,
            destination_chat_id = destination,
            title = %title,
            "Fellow chat created"
        );

        match self.group_repo.insert(source, destination).await {
            Ok(group) => Ok(group),
            Err(RelayError::Conflict { .. }) => {
                // Another relay instance persisted a mapping first; theirs wins.
                warn!(
                    source_group_id = source,
                    orphaned_chat_id = destination,
                    "Group already mapped, using existing fellow chat"
                );
                self.group_repo.find_by_source(source).await?.ok_or_else(|| {
                    RelayError::Store(format!("mapping for group {} vanished after conflict", source))
                })
            }
            Err(e) => {
                warn!(
                    source_group_id = source,
                    orphaned_chat_id = destination,
                    "Fellow chat created but mapping not persisted"
                );
                Err(e)
            }
        }
    }
}

#[async_trait]
impl<R, G> RelayService for RelayController<R, G>
where
    R: GroupRepository + 'static,
    G: DestinationGateway + 'static,
{
    async fn forward(&self, message: RelayMessage) -> Result<(), RelayError> {
        let span = tracing::debug_span!(
            parent: &self.span,
            "forward",
            source_chat_id = message.source_chat_id
        );

        async {
            let destination = self.resolve_destination(&message).await?;
            self.gateway
                .send(destination, &message)
                .await
                .map_err(|e| match e {
                    RelayError::Delivery(_) => e,
                    other => RelayError::Delivery(other.to_string()),
                })?;
            debug!(destination_chat_id = destination, "Message relayed");
            Ok(())
        }
        .instrument(span)
        .await
    }

    async fn list_groups(&self) -> Result<Vec<Group>, RelayError> {
        self.group_repo.get_all().await
    }
}
