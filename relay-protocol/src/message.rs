//! Conversation messages and their content blocks.

use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;

/// The role a [`ContextMessage`] was authored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// `priority` is monotonic under truncation choice: lower value is dropped
/// first. Values match the fixed point scale from the spec exactly so they
/// can be compared numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessagePriority(pub i32);

impl MessagePriority {
    pub const SYSTEM: MessagePriority = MessagePriority(100);
    pub const ANCHOR: MessagePriority = MessagePriority(90);
    pub const RECENT: MessagePriority = MessagePriority(80);
    pub const TOOL_PAIR: MessagePriority = MessagePriority(70);
    pub const NORMAL: MessagePriority = MessagePriority(30);
}

/// One block of content inside a message. Messages with plain string content
/// are represented as a single `Text` block by convention at the API
/// boundary; `ContextMessage::content` keeps the distinction explicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Image {
        source: String,
        media_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        width: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        height: Option<u32>,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        compacted_at: Option<i64>,
    },
}

/// Either a plain string or an ordered sequence of content blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl MessageContent {
    /// Normalizes to a block sequence, wrapping plain text in a single
    /// [`ContentBlock::Text`].
    pub fn as_blocks(&self) -> Vec<ContentBlock> {
        match self {
            MessageContent::Text(text) => vec![ContentBlock::Text { text: text.clone() }],
            MessageContent::Blocks(blocks) => blocks.clone(),
        }
    }
}

/// One message in a conversation's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextMessage {
    pub id: String,
    pub role: Role,
    pub content: MessageContent,
    pub priority: MessagePriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condense_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ContextMessage {
    pub fn new(id: impl Into<String>, role: Role, content: MessageContent) -> Self {
        Self {
            id: id.into(),
            role,
            content,
            priority: MessagePriority::NORMAL,
            condense_id: None,
            parent_id: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_priority(mut self, priority: MessagePriority) -> Self {
        self.priority = priority;
        self
    }
}
