pub mod string;

pub use string::SecretString;

use keyring::Entry;
use regex::Regex;
use sdk::errors::EngineError;
use std::sync::OnceLock;

/// Keychain key under which the relay token is stored
pub const RELAY_TOKEN_KEY: &str = "relay_token";

/// SecretManager handles secure storage and retrieval of the relay token
/// using the OS keychain.
///
/// Secrets are stored in:
/// - macOS: Keychain
/// - Windows: Credential Manager
/// - Linux: Secret Service (libsecret)
///
/// Unlike an interactive prompt, a missing secret is reported as
/// `EngineError::CredentialMissing` so that callers can show a notice
/// pointing at configuration.
pub struct SecretManager {
    service_name: String,
}

/// Regex patterns for detecting tokens in log output and error messages.
static SECRET_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

/// Initializes and returns the secret detection patterns.
///
/// Patterns match:
/// - Bearer tokens: Bearer\s+[^\s]{20,}
/// - OpenAI-style keys: sk-[a-zA-Z0-9]{20,}
/// - `token=` query parameters
fn get_secret_patterns() -> &'static Vec<Regex> {
    SECRET_PATTERNS.get_or_init(|| {
        [
            r"Bearer\s+[^\s]{20,}",
            r"sk-[a-zA-Z0-9\-_]{20,}",
            r"token=[^&\s]+",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

/// Scrubs tokens from text by replacing them with [REDACTED].
///
/// # Examples
/// ```
/// use quill_engine::secrets::scrub;
///
/// let scrubbed = scrub("GET /validate?token=abc123 failed");
/// assert_eq!(scrubbed, "GET /validate?[REDACTED] failed");
/// ```
pub fn scrub(text: &str) -> String {
    let mut result = text.to_string();

    for pattern in get_secret_patterns() {
        result = pattern.replace_all(&result, "[REDACTED]").to_string();
    }

    result
}

impl SecretManager {
    /// Creates a new SecretManager with the given service name.
    ///
    /// The service name is used to namespace secrets in the OS keychain.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry, EngineError> {
        Entry::new(&self.service_name, key).map_err(|e| {
            EngineError::KeyringError(format!("Failed to create keyring entry: {}", e))
        })
    }

    /// Retrieves a secret from the OS keychain.
    ///
    /// # Errors
    /// Returns `EngineError::CredentialMissing` if no (or an empty) value is
    /// stored, and `EngineError::KeyringError` if keychain access fails.
    pub fn get_secret(&self, key: &str) -> Result<SecretString, EngineError> {
        match self.entry(key)?.get_password() {
            Ok(secret) if !secret.trim().is_empty() => {
                tracing::debug!("Retrieved secret '{}' from keychain", key);
                Ok(SecretString::new(secret))
            }
            Ok(_) | Err(keyring::Error::NoEntry) => {
                Err(EngineError::CredentialMissing(key.to_string()))
            }
            Err(e) => Err(EngineError::KeyringError(format!(
                "Failed to retrieve secret '{}': {}",
                key, e
            ))),
        }
    }

    /// Stores a secret in the OS keychain.
    ///
    /// # Errors
    /// Returns `EngineError::CredentialMissing` for blank values and
    /// `EngineError::KeyringError` if keychain access fails.
    pub fn set_secret(&self, key: &str, value: &str) -> Result<(), EngineError> {
        if value.trim().is_empty() {
            return Err(EngineError::CredentialMissing(key.to_string()));
        }

        self.entry(key)?.set_password(value).map_err(|e| {
            EngineError::KeyringError(format!("Failed to store secret '{}': {}", key, e))
        })?;

        tracing::info!("Stored secret '{}' in keychain", key);
        Ok(())
    }

    /// Deletes a secret from the OS keychain.
    pub fn delete_secret(&self, key: &str) -> Result<(), EngineError> {
        self.entry(key)?.delete_password().map_err(|e| {
            EngineError::KeyringError(format!("Failed to delete secret '{}': {}", key, e))
        })?;

        tracing::info!("Deleted secret '{}' from keychain", key);
        Ok(())
    }

    /// Checks if a secret exists in the OS keychain.
    pub fn has_secret(&self, key: &str) -> bool {
        self.get_secret(key).is_ok()
    }

    /// The relay token, if one has been stored
    pub fn relay_token(&self) -> Option<SecretString> {
        match self.get_secret(RELAY_TOKEN_KEY) {
            Ok(token) => Some(token),
            Err(EngineError::CredentialMissing(_)) => None,
            Err(e) => {
                tracing::warn!("Relay token unavailable: {}", e);
                None
            }
        }
    }
}
