//! Relay message value.
//!
//! Built from one accepted platform event and consumed once by the
//! dispatch pool. Never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message observed in the source group, ready to be relayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayMessage {
    /// Display name or handle of the author
    pub sender: String,

    /// UTF-8 message body
    pub text: String,

    /// Identity of the source chat the message was seen in
    pub source_chat_id: i64,

    /// Title of the source chat, when the platform reported one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_title: Option<String>,

    /// When the message was received
    pub occurred_at: DateTime<Utc>,
}

impl RelayMessage {
    pub fn new(sender: impl Into<String>, text: impl Into<String>, source_chat_id: i64) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
            source_chat_id,
            source_title: None,
            occurred_at: Utc::now(),
        }
    }

    pub fn with_source_title(mut self, title: impl Into<String>) -> Self {
        self.source_title = Some(title.into());
        self
    }

    /// Title for a fellow chat created on behalf of this message's source.
    pub fn fellow_title(&self) -> String {
        match self.source_title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => format!("{} (fellow)", title),
            _ => format!("Fellow of {}", self.source_chat_id),
        }
    }

    /// Short preview of the body for log records.
    pub fn summary(&self) -> String {
        const MAX_CHARS: usize = 48;
        let mut preview: String = self.text.chars().take(MAX_CHARS).collect();
        if self.text.chars().count() > MAX_CHARS {
            preview.push('…');
        }
        preview
    }
}
