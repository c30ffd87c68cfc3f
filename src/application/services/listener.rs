//! Group Listener
//!
//! Ingestion loop: pulls platform events, keeps only messages from the
//! watched group, and hands them to the dispatch pool.

use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn, Instrument, Span};

use super::dispatch_pool::{DispatchPool, SubmitOutcome};
use crate::domain::{ChatKind, EventTransport, PlatformEvent, RelayMessage};
use crate::infrastructure::metrics;
use crate::shared::error::RelayError;

/// Sender name used when the platform does not report an author
const UNKNOWN_SENDER: &str = "unknown";

/// Build a relay message from an event, or `None` if the event is not a
/// message with text in the watched group.
pub fn relay_message_from(event: &PlatformEvent, source_group_id: i64) -> Option<RelayMessage> {
    let message = event.message.as_ref()?;
    if message.chat.kind != ChatKind::Group || message.chat.id != source_group_id {
        return None;
    }

    // Service messages and stickers carry no text to relay.
    let text = message.text.clone().filter(|text| !text.is_empty())?;
    let sender = message
        .from
        .as_ref()
        .map(|from| from.display_name())
        .unwrap_or_else(|| UNKNOWN_SENDER.to_string());

    let relay_message = RelayMessage::new(sender, text, message.chat.id);
    Some(match &message.chat.title {
        Some(title) => relay_message.with_source_title(title.clone()),
        None => relay_message,
    })
}

/// Ingestion loop over one event transport.
pub struct Listener<T>
where
    T: EventTransport,
{
    transport: Arc<T>,
    pool: Arc<DispatchPool>,
    source_group_id: i64,
    span: Span,
}

impl<T> Listener<T>
where
    T: EventTransport,
{
    pub fn new(transport: Arc<T>, pool: Arc<DispatchPool>, source_group_id: i64) -> Self {
        Self {
            transport,
            pool,
            source_group_id,
            span: tracing::info_span!("listener", component = "listener", source_group_id),
        }
    }

    /// Consume events until `cancel` fires or the transport ends the stream.
    ///
    /// Both are a clean stop. The subscription is released exactly once
    /// before returning. Only a failed subscribe is an error.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), RelayError> {
        self.consume(cancel).instrument(self.span.clone()).await
    }

    async fn consume(&self, cancel: CancellationToken) -> Result<(), RelayError> {
        let mut events = self.transport.subscribe().await?;
        info!("Listening for group messages");

        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Shutting down listener");
                    break;
                }
                event = events.next() => match event {
                    Some(event) => event,
                    None => {
                        info!("Event stream ended");
                        break;
                    }
                },
            };

            let Some(message) = relay_message_from(&event, self.source_group_id) else {
                metrics::record_event(false);
                if let Some(filtered) = &event.message {
                    trace!(
                        update_id = event.update_id,
                        chat_id = filtered.chat.id,
                        chat_kind = filtered.chat.kind.as_str(),
                        "Event filtered"
                    );
                }
                continue;
            };
            metrics::record_event(true);

            debug!(
                group_title = message.source_title.as_deref().unwrap_or_default(),
                message_sender = %message.sender,
                text_len = message.text.len(),
                "Received new message"
            );

            // A full queue parks us here; cancellation still gets through.
            tokio::select! {
                biased;
                outcome = self.pool.submit(message) => {
                    if outcome == SubmitOutcome::Dropped {
                        debug!(update_id = event.update_id, "Submission dropped by pool");
                    }
                }
                _ = cancel.cancelled() => {
                    metrics::record_dropped("cancelled");
                    warn!(update_id = event.update_id, "Cancelled while queue was full, message dropped");
                    break;
                }
            }
        }

        drop(events);
        self.transport.unsubscribe().await;
        Ok(())
    }
}
