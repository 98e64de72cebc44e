//! Quill SDK
//!
//! Shared wire types and the error taxonomy used by the Quill engine and
//! by the external channel adapters.

/// Error types and handling
pub mod errors;

/// Channel request/response and chat types
pub mod types;

// Re-export commonly used types
pub use errors::{EngineError, QuillErrorExt};
pub use types::{AiReply, AiRequest, ChatMessage, ChatPost, ModelId, NotebookPayload};
