//! Matched `tool_use`/`tool_result` block pairs.

use serde::Deserialize;
use serde::Serialize;

/// A matched `tool_use` block and its `tool_result` block; atomic under
/// truncation (see the Sliding-Window Truncator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolPair {
    pub tool_id: String,
    pub use_message_index: usize,
    pub use_block_index: usize,
    pub result_message_index: usize,
    pub result_block_index: usize,
    pub tool_name: String,
    pub is_complete: bool,
}
