//! Tool-Pair Analyzer (C15): two-pass matching of `tool_use` blocks to
//! their `tool_result` blocks across a message sequence.

use relay_protocol::ContentBlock;
use relay_protocol::ContextMessage;
use relay_protocol::ToolPair;
use std::collections::BTreeSet;
use std::collections::HashMap;

struct UseSite {
    msg_idx: usize,
    block_idx: usize,
    name: String,
}

struct ResultSite {
    msg_idx: usize,
    block_idx: usize,
}

/// The outcome of analyzing a message sequence for tool_use/tool_result
/// pairs: matched pairs plus whatever didn't match on either side.
pub struct ToolPairAnalysis {
    pub pairs: Vec<ToolPair>,
    pub orphaned_uses: Vec<(usize, usize, String)>,
    pub orphaned_results: Vec<(usize, usize)>,
}

impl ToolPairAnalysis {
    /// The sorted set of message indices linked to message `i` through a
    /// tool pair (both the `tool_use` and `tool_result` side); empty if `i`
    /// is not part of any pair.
    pub fn linked_indices(&self, i: usize) -> BTreeSet<usize> {
        let mut out = BTreeSet::new();
        for pair in &self.pairs {
            if pair.use_message_index == i || pair.result_message_index == i {
                out.insert(pair.use_message_index);
                out.insert(pair.result_message_index);
            }
        }
        out
    }
}

/// Builds `use_map`/`result_map` in one O(n) pass, then emits a [`ToolPair`]
/// for every `tool_id` present on both sides.
pub fn analyze(messages: &[ContextMessage]) -> ToolPairAnalysis {
    let mut use_map: HashMap<String, UseSite> = HashMap::new();
    let mut result_map: HashMap<String, ResultSite> = HashMap::new();

    for (msg_idx, message) in messages.iter().enumerate() {
        for (block_idx, block) in message.content.as_blocks().iter().enumerate() {
            match block {
                ContentBlock::ToolUse { id, name, .. } => {
                    use_map.insert(
                        id.clone(),
                        UseSite {
                            msg_idx,
                            block_idx,
                            name: name.clone(),
                        },
                    );
                }
                ContentBlock::ToolResult { tool_use_id, .. } => {
                    result_map.insert(tool_use_id.clone(), ResultSite { msg_idx, block_idx });
                }
                _ => {}
            }
        }
    }

    let mut pairs = Vec::new();
    let mut orphaned_uses = Vec::new();
    let mut matched_results = BTreeSet::new();

    for (tool_id, use_site) in &use_map {
        if let Some(result_site) = result_map.get(tool_id) {
            matched_results.insert(tool_id.clone());
            pairs.push(ToolPair {
                tool_id: tool_id.clone(),
                use_message_index: use_site.msg_idx,
                use_block_index: use_site.block_idx,
                result_message_index: result_site.msg_idx,
                result_block_index: result_site.block_idx,
                tool_name: use_site.name.clone(),
                is_complete: true,
            });
        } else {
            orphaned_uses.push((use_site.msg_idx, use_site.block_idx, use_site.name.clone()));
        }
    }

    let orphaned_results = result_map
        .iter()
        .filter(|(tool_id, _)| !matched_results.contains(*tool_id))
        .map(|(_, site)| (site.msg_idx, site.block_idx))
        .collect();

    pairs.sort_by_key(|p| (p.use_message_index, p.use_block_index));
    ToolPairAnalysis {
        pairs,
        orphaned_uses,
        orphaned_results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_protocol::MessageContent;
    use relay_protocol::Role;

    fn use_msg(id: &str) -> ContextMessage {
        ContextMessage::new(
            format!("use-{id}"),
            Role::Assistant,
            MessageContent::Blocks(vec![ContentBlock::ToolUse {
                id: id.to_string(),
                name: "read_file".to_string(),
                input: serde_json::json!({}),
            }]),
        )
    }

    fn result_msg(id: &str) -> ContextMessage {
        ContextMessage::new(
            format!("result-{id}"),
            Role::Tool,
            MessageContent::Blocks(vec![ContentBlock::ToolResult {
                tool_use_id: id.to_string(),
                content: "ok".to_string(),
                is_error: None,
                compacted_at: None,
            }]),
        )
    }

    #[test]
    fn matches_use_and_result_across_messages() {
        let messages = vec![use_msg("t1"), result_msg("t1")];
        let analysis = analyze(&messages);
        assert_eq!(analysis.pairs.len(), 1);
        assert_eq!(analysis.pairs[0].use_message_index, 0);
        assert_eq!(analysis.pairs[0].result_message_index, 1);
        assert!(analysis.orphaned_uses.is_empty());
        assert!(analysis.orphaned_results.is_empty());
    }

    #[test]
    fn unmatched_use_is_orphaned() {
        let messages = vec![use_msg("t1")];
        let analysis = analyze(&messages);
        assert!(analysis.pairs.is_empty());
        assert_eq!(analysis.orphaned_uses.len(), 1);
    }

    #[test]
    fn unmatched_result_is_orphaned() {
        let messages = vec![result_msg("t1")];
        let analysis = analyze(&messages);
        assert!(analysis.pairs.is_empty());
        assert_eq!(analysis.orphaned_results.len(), 1);
    }

    #[test]
    fn linked_indices_cover_both_sides_of_a_pair() {
        let messages = vec![use_msg("t1"), result_msg("t1")];
        let analysis = analyze(&messages);
        assert_eq!(analysis.linked_indices(0), BTreeSet::from([0, 1]));
        assert_eq!(analysis.linked_indices(1), BTreeSet::from([0, 1]));
        assert!(analysis.linked_indices(5).is_empty());
    }
}
