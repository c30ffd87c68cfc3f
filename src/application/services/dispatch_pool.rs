//! Dispatch Pool
//!
//! Bounded hand-off between the listener and delivery. A fixed set of
//! workers drains the queue through the relay service; a full queue blocks
//! the submitter, which is how a slow fellow chat throttles ingestion.
//!
//! Shutdown is one-shot. After it fires new submissions are dropped, while
//! messages already in the queue are still delivered before the workers exit.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn, Instrument, Span};

use super::relay_controller::RelayService;
use crate::config::DispatchSettings;
use crate::domain::RelayMessage;
use crate::infrastructure::metrics;

/// What happened to a submitted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Queued; a worker will deliver it or log why it could not.
    Enqueued,
    /// Discarded because the pool is shutting down.
    Dropped,
}

/// Bounded-queue worker pool.
pub struct DispatchPool {
    sender: RwLock<Option<mpsc::Sender<RelayMessage>>>,
    receiver: Mutex<Option<mpsc::Receiver<RelayMessage>>>,
    shutdown: CancellationToken,
    workers: usize,
    capacity: usize,
    relay: Arc<dyn RelayService>,
    span: Span,
}

impl DispatchPool {
    /// Create a pool. Zero workers or zero capacity are treated as one.
    pub fn new(settings: &DispatchSettings, relay: Arc<dyn RelayService>) -> Self {
        let capacity = settings.queue_capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);

        Self {
            sender: RwLock::new(Some(sender)),
            receiver: Mutex::new(Some(receiver)),
            shutdown: CancellationToken::new(),
            workers: settings.workers.max(1),
            capacity,
            relay,
            span: tracing::info_span!("dispatch", component = "dispatch"),
        }
    }

    /// Queue a message for delivery.
    ///
    /// Waits while the queue is full. Returns [`SubmitOutcome::Dropped`]
    /// without waiting once shutdown has fired, and also if shutdown fires
    /// while waiting. A message is never both dropped and enqueued.
    pub async fn submit(&self, message: RelayMessage) -> SubmitOutcome {
        let sender = match self.sender.read().clone() {
            Some(sender) => sender,
            None => return self.drop_message(&message),
        };

        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => self.drop_message(&message),
            permit = sender.reserve() => match permit {
                Ok(permit) => {
                    permit.send(message);
                    metrics::set_queue_depth(self.capacity - sender.capacity());
                    SubmitOutcome::Enqueued
                }
                Err(_) => self.drop_message(&message),
            },
        }
    }

    fn drop_message(&self, message: &RelayMessage) -> SubmitOutcome {
        metrics::record_dropped("shutdown");
        warn!(
            parent: &self.span,
            source_chat_id = message.source_chat_id,
            sender = %message.sender,
            summary = %message.summary(),
            "Dispatch pool shut down, message dropped"
        );
        SubmitOutcome::Dropped
    }

    /// Run the workers until shutdown has fired and the queue is drained.
    ///
    /// Only the first call runs the pool; later calls return immediately.
    pub async fn run(&self) {
        let Some(receiver) = self.receiver.lock().take() else {
            warn!(parent: &self.span, "Dispatch pool is already running");
            return;
        };
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));

        info!(
            parent: &self.span,
            workers = self.workers,
            capacity = self.capacity,
            "Dispatch pool started"
        );

        let mut workers = JoinSet::new();
        for id in 0..self.workers {
            let worker = Worker {
                id,
                receiver: receiver.clone(),
                relay: self.relay.clone(),
            };
            let span = tracing::debug_span!(parent: &self.span, "worker", worker = id);
            workers.spawn(worker.run().instrument(span));
        }

        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                error!(parent: &self.span, "Dispatch worker failed: {}", e);
            }
        }

        metrics::set_queue_depth(0);
        info!(parent: &self.span, "Dispatch pool drained");
    }

    /// Fire the shutdown signal. Idempotent.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        if self.sender.write().take().is_some() {
            info!(parent: &self.span, "Dispatch pool shutting down");
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

struct Worker {
    id: usize,
    receiver: Arc<tokio::sync::Mutex<mpsc::Receiver<RelayMessage>>>,
    relay: Arc<dyn RelayService>,
}

impl Worker {
    async fn run(self) {
        loop {
            let next = {
                let mut receiver = self.receiver.lock().await;
                let next = receiver.recv().await;
                metrics::set_queue_depth(receiver.len());
                next
            };

            // None: every sender is gone and the queue is empty.
            let Some(message) = next else {
                debug!(worker = self.id, "Dispatch worker exiting");
                return;
            };

            self.process(message).await;
        }
    }

    async fn process(&self, message: RelayMessage) {
        let source_chat_id = message.source_chat_id;
        let sender = message.sender.clone();
        let summary = message.summary();
        let started = Instant::now();

        let result = AssertUnwindSafe(self.relay.forward(message))
            .catch_unwind()
            .await;
        let elapsed = started.elapsed().as_secs_f64();

        match result {
            Ok(Ok(())) => metrics::record_relayed(elapsed),
            Ok(Err(e)) => {
                metrics::record_forward_failure(e.kind(), elapsed);
                error!(
                    worker = self.id,
                    source_chat_id,
                    sender = %sender,
                    summary = %summary,
                    kind = e.kind(),
                    "Message dropped: {}",
                    e
                );
            }
            Err(_) => {
                metrics::record_forward_failure("panic", elapsed);
                error!(
                    worker = self.id,
                    source_chat_id,
                    summary = %summary,
                    "Message dropped: relay panicked"
                );
            }
        }
    }
}
