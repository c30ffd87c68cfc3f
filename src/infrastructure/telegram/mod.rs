//! Telegram Event Transport
//!
//! Receives updates from the Telegram Bot API via `getUpdates` long polling
//! and exposes them as a stream of [`PlatformEvent`]s.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::TelegramSettings;
use crate::domain::{
    Chat, ChatKind, EventStream, EventTransport, PlatformEvent, PlatformMessage, Sender,
};
use crate::shared::error::RelayError;

/// Buffer between the poller task and the subscriber
const EVENT_BUFFER: usize = 64;

/// Upper bound for the reconnect backoff, in seconds
const MAX_BACKOFF_SECS: u64 = 32;

// ── Telegram API response types ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct TelegramUpdate {
    update_id: i64,
    message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
struct TelegramMessage {
    chat: TelegramChat,
    from: Option<TelegramUser>,
    text: Option<String>,
    caption: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramChat {
    id: i64,
    #[serde(rename = "type")]
    kind: String,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramUser {
    id: i64,
    first_name: String,
    last_name: Option<String>,
    username: Option<String>,
}

impl From<TelegramUpdate> for PlatformEvent {
    fn from(update: TelegramUpdate) -> Self {
        let message = update.message.map(|m| PlatformMessage {
            chat: Chat {
                id: m.chat.id,
                kind: ChatKind::parse(&m.chat.kind),
                title: m.chat.title,
            },
            from: m.from.map(|u| Sender {
                id: u.id,
                username: u.username,
                first_name: u.first_name,
                last_name: u.last_name,
            }),
            text: m.text.or(m.caption),
        });

        PlatformEvent {
            update_id: update.update_id,
            message,
        }
    }
}

// ── Implementation ──────────────────────────────────────────────────────────

/// Bot API long-polling transport.
pub struct TelegramTransport {
    client: reqwest::Client,
    api_base: String,
    poll_timeout_secs: u64,
    subscription: Mutex<Option<CancellationToken>>,
}

impl TelegramTransport {
    pub fn new(settings: &TelegramSettings) -> Result<Self, RelayError> {
        // The HTTP timeout must outlast the long-poll window.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.poll_timeout_secs + 10))
            .build()
            .map_err(|e| RelayError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: format!(
                "{}/bot{}",
                settings.api_url.trim_end_matches('/'),
                settings.token
            ),
            poll_timeout_secs: settings.poll_timeout_secs,
            subscription: Mutex::new(None),
        })
    }

    /// Username of the bot, used as a connectivity check at startup.
    pub async fn get_me(&self) -> Result<String, RelayError> {
        let body: TelegramResponse<TelegramUser> = self
            .client
            .get(format!("{}/getMe", self.api_base))
            .send()
            .await
            .map_err(|e| RelayError::Transport(format!("Telegram getMe error: {e}")))?
            .json()
            .await
            .map_err(|e| RelayError::Transport(format!("Telegram parse error: {e}")))?;

        match (body.ok, body.result) {
            (true, Some(user)) => Ok(user.username.unwrap_or(user.first_name)),
            _ => Err(RelayError::Transport(format!(
                "Telegram getMe failed: {}",
                body.description.unwrap_or_default()
            ))),
        }
    }
}

#[async_trait]
impl EventTransport for TelegramTransport {
    async fn subscribe(&self) -> Result<EventStream, RelayError> {
        let token = CancellationToken::new();
        if let Some(previous) = self.subscription.lock().replace(token.clone()) {
            previous.cancel();
        }

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let poller = Poller {
            client: self.client.clone(),
            url: format!("{}/getUpdates", self.api_base),
            poll_timeout_secs: self.poll_timeout_secs,
        };
        tokio::spawn(poller.run(token, tx));

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        });
        Ok(stream.boxed())
    }

    async fn unsubscribe(&self) {
        if let Some(token) = self.subscription.lock().take() {
            token.cancel();
            info!("Telegram long polling stopped");
        }
    }
}

struct Poller {
    client: reqwest::Client,
    url: String,
    poll_timeout_secs: u64,
}

impl Poller {
    async fn run(self, cancel: CancellationToken, tx: mpsc::Sender<PlatformEvent>) {
        let mut offset: Option<i64> = None;
        let mut backoff_secs = 1;

        loop {
            let batch = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Telegram poller cancelled");
                    return;
                }
                batch = self.fetch(offset) => batch,
            };

            let updates = match batch {
                Ok(updates) => {
                    backoff_secs = 1;
                    updates
                }
                Err(e) => {
                    warn!(backoff_secs, "Telegram poll failed: {}", e);
                    tokio::select! {
                        _ = cancel.cancelled() => return,
                        _ = tokio::time::sleep(Duration::from_secs(backoff_secs)) => {}
                    }
                    backoff_secs = (backoff_secs * 2).min(MAX_BACKOFF_SECS);
                    continue;
                }
            };

            for update in updates {
                // Advance the offset so we do not receive this update again.
                offset = Some(update.update_id + 1);
                if tx.send(PlatformEvent::from(update)).await.is_err() {
                    debug!("Event subscriber dropped, stopping poller");
                    return;
                }
            }
        }
    }

    async fn fetch(&self, offset: Option<i64>) -> Result<Vec<TelegramUpdate>, RelayError> {
        let mut params: Vec<(&str, String)> = vec![
            ("timeout", self.poll_timeout_secs.to_string()),
            ("allowed_updates", r#"["message"]"#.to_string()),
        ];
        if let Some(off) = offset {
            params.push(("offset", off.to_string()));
        }

        let body: TelegramResponse<Vec<TelegramUpdate>> = self
            .client
            .get(&self.url)
            .query(&params)
            .send()
            .await
            .map_err(|e| RelayError::Transport(format!("Telegram poll error: {e}")))?
            .json()
            .await
            .map_err(|e| RelayError::Transport(format!("Telegram parse error: {e}")))?;

        if !body.ok {
            return Err(RelayError::Transport(format!(
                "Telegram API error: {}",
                body.description.unwrap_or_default()
            )));
        }

        Ok(body.result.unwrap_or_default())
    }
}
