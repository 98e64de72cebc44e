//! AI request channel
//!
//! Quill never talks to a model provider directly. Prompts go to a relay that
//! holds the provider credentials, performs the HTTP call and answers with
//! `{ success, answer? }`. `RequestChannel` is that seam; `HttpRelay` is the
//! reqwest implementation.
//!
//! Transport failures and explicit non-success replies are both failures of
//! the channel. Callers treat them identically and never retry automatically.

pub mod chat;

use async_trait::async_trait;
use reqwest::Client;
use sdk::errors::EngineError;
use sdk::types::{AiReply, AiRequest};
use serde::Deserialize;
use std::time::Duration;

use crate::secrets::{scrub, SecretString};

/// Request/response channel to the AI relay
#[async_trait]
pub trait RequestChannel: Send + Sync {
    /// Send one request and wait for exactly one reply
    async fn send(&self, request: &AiRequest) -> Result<AiReply, EngineError>;

    /// Whether the channel holds the credentials it needs to send
    fn has_credentials(&self) -> bool {
        true
    }
}

/// Reply of the relay's token validation endpoint
#[derive(Debug, Deserialize)]
struct ValidateResponse {
    valid: bool,
}

/// HTTP relay client
#[derive(Debug, Clone)]
pub struct HttpRelay {
    /// Base URL of the relay (e.g. "http://localhost:8787")
    base_url: String,

    /// Token presented to the relay; `None` blocks all requests
    token: Option<SecretString>,

    /// HTTP client for relay calls
    client: Client,
}

impl HttpRelay {
    /// Create a new relay client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the relay
    /// * `token` - Relay token from the keychain, if one is stored
    pub fn new(base_url: impl Into<String>, token: Option<SecretString>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            client: Client::new(),
        }
    }

    fn bearer(&self) -> Result<String, EngineError> {
        self.token
            .as_ref()
            .filter(|t| !t.is_empty())
            .map(|t| format!("Bearer {}", t.unsecure()))
            .ok_or_else(|| EngineError::CredentialMissing("relay token".to_string()))
    }

    /// Ask the relay whether the stored token is accepted
    ///
    /// # Errors
    /// - `EngineError::CredentialMissing` when no token is stored
    /// - `EngineError::Network` when the relay cannot be reached or answers
    ///   with a malformed body
    /// - `EngineError::TokenValidationTimeout` when no answer arrives within `wait`
    pub async fn check_token(&self, wait: Duration) -> Result<bool, EngineError> {
        let bearer = self.bearer()?;
        let url = format!("{}/validate", self.base_url);

        let check = async {
            let response = self
                .client
                .get(&url)
                .header("Authorization", bearer)
                .send()
                .await
                .map_err(|e| EngineError::Network(scrub(&e.to_string())))?;
            if !response.status().is_success() {
                return Ok::<bool, EngineError>(false);
            }
            let body: ValidateResponse = response
                .json()
                .await
                .map_err(|e| EngineError::Network(format!("Malformed validation reply: {}", e)))?;
            Ok::<bool, EngineError>(body.valid)
        };

        tokio::time::timeout(wait, check)
            .await
            .map_err(|_| EngineError::TokenValidationTimeout)?
    }

    /// Like `check_token`, but every failure counts as an invalid token
    pub async fn validate_token(&self, wait: Duration) -> bool {
        match self.check_token(wait).await {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!("Token validation failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl RequestChannel for HttpRelay {
    fn has_credentials(&self) -> bool {
        self.bearer().is_ok()
    }

    async fn send(&self, request: &AiRequest) -> Result<AiReply, EngineError> {
        let bearer = self.bearer()?;
        let url = format!("{}/ask", self.base_url);

        tracing::debug!(
            "Relay request: model={}, prompt_chars={}",
            request.model,
            request.prompt.len()
        );

        let start = std::time::Instant::now();
        let response = self
            .client
            .post(&url)
            .header("Authorization", bearer)
            .json(request)
            .send()
            .await
            .map_err(|e| EngineError::ChannelFailure(scrub(&e.to_string())))?;

        tracing::info!(
            "Relay response received in {:.1}s",
            start.elapsed().as_secs_f64()
        );

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(EngineError::CredentialMissing(format!(
                    "relay rejected the token ({})",
                    status
                )));
            }
            return Err(EngineError::ChannelFailure(format!(
                "Relay error ({}): {}",
                status,
                scrub(&text)
            )));
        }

        response
            .json::<AiReply>()
            .await
            .map_err(|e| EngineError::ChannelFailure(format!("Malformed relay reply: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_token_means_no_credentials() {
        let relay = HttpRelay::new("http://localhost:8787", None);
        assert!(!relay.has_credentials());

        let blank = HttpRelay::new("http://localhost:8787", Some(SecretString::new("  ")));
        assert!(!blank.has_credentials());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let relay = HttpRelay::new("http://localhost:8787/", Some("t".into()));
        assert_eq!(relay.base_url, "http://localhost:8787");
    }

    #[tokio::test]
    async fn test_send_without_token_is_credential_missing() {
        let relay = HttpRelay::new("http://localhost:8787", None);
        let request = AiRequest::new("hi", "gpt-4o-mini".into());
        assert!(matches!(
            relay.send(&request).await,
            Err(EngineError::CredentialMissing(_))
        ));
    }

    #[tokio::test]
    async fn test_check_without_token_is_credential_missing() {
        let relay = HttpRelay::new("http://localhost:8787", None);
        assert!(matches!(
            relay.check_token(Duration::from_millis(10)).await,
            Err(EngineError::CredentialMissing(_))
        ));
    }

    #[tokio::test]
    async fn test_validate_without_token_is_invalid() {
        let relay = HttpRelay::new("http://localhost:8787", None);
        assert!(!relay.validate_token(Duration::from_millis(10)).await);
    }
}
