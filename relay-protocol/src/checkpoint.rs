//! Checkpoint snapshots of a message sequence.

use crate::message::ContextMessage;
use serde::Deserialize;
use serde::Serialize;
use std::sync::Arc;

/// An in-memory, immutable snapshot of a message array used for rollback.
/// `messages` is reference-counted so taking a snapshot never copies the
/// underlying block data — only the outer `Vec` is cloned structurally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub created_at: i64,
    pub messages: Arc<Vec<ContextMessage>>,
}
