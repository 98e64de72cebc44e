//! Channel request/response and chat types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a remote model (e.g. "gpt-4o-mini")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    /// Create a new model identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Request sent over the AI request channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiRequest {
    pub prompt: String,
    pub model: ModelId,
}

impl AiRequest {
    /// Create a new request
    pub fn new(prompt: impl Into<String>, model: ModelId) -> Self {
        Self {
            prompt: prompt.into(),
            model,
        }
    }
}

/// Reply received from the AI request channel
///
/// `answer` is only meaningful when `success` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl AiReply {
    /// A successful reply carrying an answer
    pub fn answered(answer: impl Into<String>) -> Self {
        Self {
            success: true,
            answer: Some(answer.into()),
        }
    }

    /// An explicit non-success reply
    pub fn failed() -> Self {
        Self {
            success: false,
            answer: None,
        }
    }

    /// The answer, if the relay reported success and supplied one
    pub fn into_answer(self) -> Option<String> {
        if self.success {
            self.answer
        } else {
            None
        }
    }
}

/// A single chat message as stored by the remote room resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub author: String,
    pub body: String,
    #[serde(default)]
    pub timestamp: String,
}

impl ChatMessage {
    /// Create a new message snapshot
    pub fn new(
        author: impl Into<String>,
        body: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            body: body.into(),
            timestamp: timestamp.into(),
        }
    }
}

/// Body of a chat `POST`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPost {
    pub author: String,
    pub body: String,
}

/// Structured chat payload carrying the notebook's text
///
/// Serialized as `{"type": "notebook", "content": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "notebook")]
pub struct NotebookPayload {
    pub content: String,
}

impl NotebookPayload {
    /// Create a payload from the notebook text
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Parse a message body as a notebook payload
    ///
    /// Returns `None` for anything that is not a JSON object tagged
    /// `"type": "notebook"` with a string `content`.
    pub fn parse(body: &str) -> Option<Self> {
        let trimmed = body.trim();
        if !trimmed.starts_with('{') {
            return None;
        }
        serde_json::from_str(trimmed).ok()
    }

    /// Serialize to a chat message body
    pub fn to_body(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
