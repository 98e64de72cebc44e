//! Snapshot signatures
//!
//! Two snapshots have the same signature exactly when they hold the same
//! `(author, timestamp, body)` tuples in the same order. Fields are length
//! prefixed so that no two different snapshots can concatenate to the same
//! input.

use sdk::types::ChatMessage;
use sha2::{Digest, Sha256};

/// Hex SHA-256 over every message of a snapshot, in order
pub fn snapshot_signature(messages: &[ChatMessage]) -> String {
    let mut hasher = Sha256::new();
    for message in messages {
        for field in [&message.author, &message.timestamp, &message.body] {
            hasher.update((field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }
    }
    hex::encode(hasher.finalize())
}
