//! Fellow Chat Gateway
//!
//! HTTP client for the fellow chat service:
//! - `POST {base}/chats` with `{title, members}` returns `{id}`
//! - `POST {base}/chats/{id}/messages` with the relayed message

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::FellowSettings;
use crate::domain::{DestinationGateway, RelayMessage};
use crate::shared::error::RelayError;

#[derive(Debug, Serialize)]
struct CreateChatRequest<'a> {
    title: &'a str,
    members: &'a [String],
}

#[derive(Debug, Deserialize)]
struct CreateChatResponse {
    id: i64,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    sender: &'a str,
    text: &'a str,
    source_chat_id: i64,
    created_at: DateTime<Utc>,
}

impl<'a> From<&'a RelayMessage> for SendMessageRequest<'a> {
    fn from(message: &'a RelayMessage) -> Self {
        Self {
            sender: &message.sender,
            text: &message.text,
            source_chat_id: message.source_chat_id,
            created_at: message.occurred_at,
        }
    }
}

/// JSON-over-HTTP destination gateway.
#[derive(Clone)]
pub struct HttpFellowGateway {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpFellowGateway {
    pub fn new(settings: &FellowSettings) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| RelayError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_token: settings.api_token.clone(),
        })
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self.client.post(format!("{}{}", self.base_url, path));
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl DestinationGateway for HttpFellowGateway {
    async fn create_chat(&self, title: &str, members: &[String]) -> Result<i64, RelayError> {
        let response = self
            .post("/chats")
            .json(&CreateChatRequest { title, members })
            .send()
            .await
            .map_err(|e| RelayError::Creation(format!("Fellow chat request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Creation(format!(
                "Fellow chat service returned {status}"
            )));
        }

        let body: CreateChatResponse = response
            .json()
            .await
            .map_err(|e| RelayError::Creation(format!("Fellow chat parse error: {e}")))?;

        Ok(body.id)
    }

    async fn send(
        &self,
        destination_chat_id: i64,
        message: &RelayMessage,
    ) -> Result<(), RelayError> {
        let response = self
            .post(&format!("/chats/{}/messages", destination_chat_id))
            .json(&SendMessageRequest::from(message))
            .send()
            .await
            .map_err(|e| RelayError::Delivery(format!("Fellow send failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Delivery(format!(
                "Fellow chat service returned {status} for chat {destination_chat_id}"
            )));
        }

        Ok(())
    }
}
