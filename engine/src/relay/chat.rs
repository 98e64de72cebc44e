//! Chat resource channel
//!
//! A room is a remote list of messages keyed by room identifier. The resource
//! has no delta query: every fetch returns the full, ordered snapshot.
//! Failures are logged and reported as `None` / `false`, never as errors.

use async_trait::async_trait;
use reqwest::Client;
use sdk::types::{ChatMessage, ChatPost};

use crate::secrets::scrub;

/// Room resource seam
#[async_trait]
pub trait ChatChannel: Send + Sync {
    /// Fetch the full message list of `room`
    async fn fetch(&self, room: &str) -> Option<Vec<ChatMessage>>;

    /// Append a message to `room`; `true` on acknowledgement
    async fn post(&self, room: &str, message: &ChatPost) -> bool;
}

/// HTTP room resource client
#[derive(Debug, Clone)]
pub struct HttpChatChannel {
    base_url: String,
    client: Client,
}

impl HttpChatChannel {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn room_url(&self, room: &str) -> String {
        format!(
            "{}/rooms/{}/messages",
            self.base_url,
            urlencoding::encode(room)
        )
    }
}

#[async_trait]
impl ChatChannel for HttpChatChannel {
    async fn fetch(&self, room: &str) -> Option<Vec<ChatMessage>> {
        let response = match self.client.get(self.room_url(room)).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Chat fetch for '{}' failed: {}", room, scrub(&e.to_string()));
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!("Chat fetch for '{}' returned {}", room, response.status());
            return None;
        }

        match response.json::<Vec<ChatMessage>>().await {
            Ok(messages) => Some(messages),
            Err(e) => {
                tracing::warn!("Chat fetch for '{}' returned malformed data: {}", room, e);
                None
            }
        }
    }

    async fn post(&self, room: &str, message: &ChatPost) -> bool {
        match self
            .client
            .post(self.room_url(room))
            .json(message)
            .send()
            .await
        {
            Ok(r) if r.status().is_success() => true,
            Ok(r) => {
                tracing::warn!("Chat post to '{}' returned {}", room, r.status());
                false
            }
            Err(e) => {
                tracing::warn!("Chat post to '{}' failed: {}", room, scrub(&e.to_string()));
                false
            }
        }
    }
}
