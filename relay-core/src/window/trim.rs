//! Tool-Output Trimmer (C17): replaces oversized `tool_result` content with
//! a head/marker/tail, stamping `compacted_at` so trimming is idempotent.

use relay_protocol::ContentBlock;
use relay_protocol::ContextMessage;
use relay_protocol::MessageContent;
use std::collections::HashSet;

const TRUNCATION_MARKER: &str = "\n... [output truncated] ...\n";

/// Trimming knobs; defaults match §4.15 exactly.
#[derive(Debug, Clone)]
pub struct TrimPolicy {
    pub max_output_chars: usize,
    pub protected_tools: HashSet<String>,
}

impl Default for TrimPolicy {
    fn default() -> Self {
        Self {
            max_output_chars: 10_000,
            protected_tools: HashSet::from(["skill".to_string(), "memory_search".to_string()]),
        }
    }
}

/// Trims every eligible `tool_result` block in place. A block is eligible
/// when its content exceeds `policy.max_output_chars`, its owning
/// `tool_name` (resolved via the matching `tool_use`, when known) is not
/// protected, and it is not already compacted to within the current cap.
/// Returns the number of blocks trimmed.
pub fn trim_tool_outputs(messages: &mut [ContextMessage], policy: &TrimPolicy, tool_names: &std::collections::HashMap<String, String>, now_ms: i64) -> usize {
    let mut trimmed = 0;

    for message in messages.iter_mut() {
        let MessageContent::Blocks(blocks) = &mut message.content else {
            continue;
        };

        for block in blocks.iter_mut() {
            let ContentBlock::ToolResult {
                tool_use_id,
                content,
                compacted_at,
                ..
            } = block
            else {
                continue;
            };

            let tool_name = tool_names.get(tool_use_id).map(String::as_str).unwrap_or("");
            if policy.protected_tools.contains(tool_name) {
                continue;
            }
            if content.len() <= policy.max_output_chars {
                continue;
            }
            if compacted_at.is_some() && content.len() <= policy.max_output_chars {
                continue;
            }

            *content = apply_marker(content, policy.max_output_chars);
            *compacted_at = Some(now_ms);
            trimmed += 1;
        }
    }

    trimmed
}

fn apply_marker(content: &str, max_output_chars: usize) -> String {
    let marker_len = TRUNCATION_MARKER.len();
    let budget = max_output_chars.saturating_sub(marker_len);
    let head_len = budget.div_ceil(2);
    let tail_len = budget - head_len;

    let chars: Vec<char> = content.chars().collect();
    let head: String = chars.iter().take(head_len).collect();
    let tail: String = chars.iter().rev().take(tail_len).collect::<Vec<_>>().into_iter().rev().collect();

    format!("{head}{TRUNCATION_MARKER}{tail}")
}
