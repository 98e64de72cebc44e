//! Error types and handling
//!
//! This module provides the error types used throughout the Quill engine.
//! All errors implement the `QuillErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! Two conditions from the failure taxonomy are deliberately *not* error
//! values: an empty directive scan is an informational outcome, and a math or
//! JSON fragment that fails to render falls back to literal text inside the
//! renderer.
//!
//! # Security
//!
//! Error messages never carry the relay token. Callers scrub transport error
//! text before wrapping it (see `quill_engine::secrets::scrub`).

use thiserror::Error;

/// Trait for Quill error extensions
///
/// This trait provides additional context for errors, including user-friendly
/// hints and recoverability information. All engine errors implement this trait.
pub trait QuillErrorExt {
    /// Returns a user-friendly hint for the error
    ///
    /// The hint is safe to display in a notice and does not contain secrets
    /// or internal implementation details.
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors leave the host document untouched and can be
    /// retried by the user.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Error Categories
///
/// - **ChannelFailure**: relay/network failure or explicit non-success status
/// - **FormatError**: the model returned output that does not match the
///   requested structure
/// - **CredentialMissing**: chat identity or relay token absent
/// - **TokenValidationTimeout / Network**: token validation could not complete
/// - **Configuration / Settings**: invalid or unreadable configuration
///
/// # Examples
///
/// ```
/// use sdk::errors::{EngineError, QuillErrorExt};
///
/// let error = EngineError::CredentialMissing("chat identity".to_string());
/// println!("Hint: {}", error.user_hint());
/// assert!(error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Channel errors
    #[error("Channel failure: {0}")]
    ChannelFailure(String),

    // Model output errors
    #[error("Format error: {0}")]
    FormatError(String),

    // Credential errors
    #[error("Credential missing: {0}")]
    CredentialMissing(String),

    #[error("Token validation timed out")]
    TokenValidationTimeout,

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    // Keyring errors
    #[error("Keyring error: {0}")]
    KeyringError(String),

    // Network errors
    #[error("Network error: {0}")]
    Network(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuillErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            // Channel errors
            Self::ChannelFailure(_) => "The AI service could not be reached. Try again",

            // Model output errors
            Self::FormatError(_) => "The model answered in an unexpected format. Try again",

            // Credential errors
            Self::CredentialMissing(_) => {
                "Missing credentials. Set them with 'quill config' or 'quill token set'"
            }
            Self::TokenValidationTimeout => "Token could not be validated in time",

            // Configuration errors
            Self::Config(_) => "Check your config.toml file for errors",
            Self::Settings(_) => "Saved settings could not be read or written",
            Self::UnknownModel(_) => "Pick one of the models listed by 'quill config show'",

            // Keyring errors
            Self::KeyringError(_) => "Failed to access secure storage. Check system keychain",

            // Network errors
            Self::Network(_) => "Network operation failed. Check your connection",

            // Generic IO error
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        // Every failure is local to one action; the host page keeps running.
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = EngineError::ChannelFailure("connection refused".to_string());
        assert_eq!(err.to_string(), "Channel failure: connection refused");
    }

    #[test]
    fn test_all_variants_recoverable() {
        let errs = vec![
            EngineError::ChannelFailure("x".into()),
            EngineError::FormatError("x".into()),
            EngineError::CredentialMissing("x".into()),
            EngineError::TokenValidationTimeout,
            EngineError::Config("x".into()),
        ];
        for err in errs {
            assert!(err.is_recoverable(), "{err} should be recoverable");
        }
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: EngineError = io.into();
        assert!(matches!(err, EngineError::Io(_)));
        assert_eq!(err.user_hint(), "File system operation failed");
    }
}
