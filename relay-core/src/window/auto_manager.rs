//! Auto-Manager (C20): the context-window control loop tying budget
//! classification, trimming, truncation, and summarization together.

use super::budget::derive_state;
use super::checkpoint::CheckpointStore;
use super::summarize::summarize;
use super::summarize::FallbackEntry;
use super::summarize::SummarizeRequest;
use super::trim::trim_tool_outputs;
use super::trim::TrimPolicy;
use super::truncate::truncate;
use crate::capability::ModelClientFactory;
use crate::error::CompactionError;
use crate::error::TruncateError;
use relay_protocol::ContextMessage;
use relay_protocol::ContextStateKind;
use relay_protocol::ThresholdConfig;
use relay_protocol::TokenBudget;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use uuid::Uuid;

/// Feature flags gating optional escalation behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureFlags {
    /// At `overflow`, allow dropping tool pairs in reverse chronological
    /// order down to SYSTEM + ANCHOR + last N, beyond what C16 alone would
    /// remove while preserving pair atomicity.
    pub aggressive_truncation: bool,
}

/// One `manage()` call's full report: state transition, the actions taken,
/// and the (possibly unchanged) resulting message set.
#[derive(Debug)]
pub struct ManageResult {
    pub state_before: ContextStateKind,
    pub state_after: ContextStateKind,
    pub actions: Vec<String>,
    pub messages: Vec<ContextMessage>,
    pub token_count_before: usize,
    pub token_count_after: usize,
    pub checkpoint_id: Option<String>,
}

/// Minimum message-range length the summarizer is allowed to condense.
const MIN_SUMMARIZE_RANGE: usize = 6;

pub struct AutoManager {
    pub checkpoints: CheckpointStore,
    pub trim_policy: TrimPolicy,
    pub fallback_chain: Vec<FallbackEntry>,
    pub recent_n: usize,
}

impl AutoManager {
    pub fn new(checkpoint_capacity: usize, trim_policy: TrimPolicy, fallback_chain: Vec<FallbackEntry>) -> Self {
        Self {
            checkpoints: CheckpointStore::new(checkpoint_capacity),
            trim_policy,
            fallback_chain,
            recent_n: 3,
        }
    }

    /// Runs one control-loop pass over `messages` per §4.18.
    #[allow(clippy::too_many_arguments)]
    pub async fn manage(
        &mut self,
        messages: Vec<ContextMessage>,
        model: &str,
        factory: Option<Arc<dyn ModelClientFactory>>,
        budget: &TokenBudget,
        thresholds: &ThresholdConfig,
        flags: FeatureFlags,
        count_tokens: &dyn Fn(&[ContextMessage]) -> usize,
        tool_names: &HashMap<String, String>,
        now_ms: i64,
        cancel: CancellationToken,
    ) -> ManageResult {
        let mut messages = messages;
        let mut actions = Vec::new();
        let token_count_before = count_tokens(&messages);
        let state_before = derive_state(token_count_before, budget, thresholds).state;
        let mut checkpoint_id = None;

        if state_before == ContextStateKind::Healthy {
            return ManageResult {
                state_before,
                state_after: state_before,
                actions,
                token_count_after: token_count_before,
                messages,
                token_count_before,
                checkpoint_id,
            };
        }

        if state_before >= ContextStateKind::Warning {
            let trimmed = trim_tool_outputs(&mut messages, &self.trim_policy, tool_names, now_ms);
            if trimmed > 0 {
                actions.push(format!("trimmed {trimmed} tool output(s)"));
            }
        }

        let mut state_after = derive_state(count_tokens(&messages), budget, thresholds).state;

        if state_before >= ContextStateKind::Critical {
            let id = self.checkpoints.create(Arc::new(messages.clone()), Some(format!("pre-compaction-{model}")), now_ms);
            checkpoint_id = Some(id.clone());
            actions.push(format!("checkpoint {id} created before compaction"));

            match truncate(&messages, budget.usable(), self.recent_n, count_tokens) {
                Ok(truncated) => {
                    actions.push("sliding-window truncation applied".to_string());
                    messages = truncated;
                }
                Err(TruncateError::OverflowUnrecoverable) => {
                    actions.push("truncation could not meet budget without breaking invariants".to_string());
                }
            }

            state_after = derive_state(count_tokens(&messages), budget, thresholds).state;

            if state_after != ContextStateKind::Healthy && messages.len() > MIN_SUMMARIZE_RANGE {
                if let Some(factory) = factory.clone() {
                    let range = summarizable_range(&messages, self.recent_n);
                    if range.len() >= MIN_SUMMARIZE_RANGE {
                        let condense_id = Uuid::new_v4().to_string();
                        let request = SummarizeRequest {
                            messages: &messages,
                            range: range.clone(),
                            factory,
                            fallback_chain: &self.fallback_chain,
                            max_ratio: 1.0,
                            count_tokens,
                        };
                        match summarize(request, condense_id.clone(), cancel.clone()).await {
                            Ok(result) => {
                                for message in messages[range.clone()].iter_mut() {
                                    message.condense_id = Some(condense_id.clone());
                                }
                                messages.splice(range.clone(), result.new_messages);
                                actions.push(format!(
                                    "summarized {} message(s) ({} -> {} tokens)",
                                    range.len(),
                                    result.original_tokens,
                                    result.summary_tokens
                                ));
                            }
                            Err(err @ CompactionError::ContextGrowth { .. }) | Err(err @ CompactionError::AllModelsFailed { .. }) => {
                                warn!(error = %err, "compaction failed, rolling back to pre-compaction checkpoint");
                                if let Some(restored) = self.checkpoints.rollback(&id) {
                                    messages = (*restored).clone();
                                }
                                actions.push(format!("compaction failed: {err}"));
                                state_after = ContextStateKind::Overflow;
                            }
                            Err(err) => {
                                actions.push(format!("compaction skipped: {err}"));
                            }
                        }
                    }
                }
            }

            state_after = derive_state(count_tokens(&messages), budget, thresholds).state;
        }

        if state_before == ContextStateKind::Overflow && flags.aggressive_truncation && state_after != ContextStateKind::Healthy {
            messages = aggressive_drop(&messages, budget.usable(), self.recent_n, count_tokens);
            actions.push("aggressive truncation dropped tool pairs to meet budget".to_string());
            state_after = derive_state(count_tokens(&messages), budget, thresholds).state;
        }

        let token_count_after = count_tokens(&messages);
        ManageResult {
            state_before,
            state_after,
            actions,
            messages,
            token_count_before,
            token_count_after,
            checkpoint_id,
        }
    }

    /// The messages an LLM request should actually see: originals whose
    /// `condense_id` has a matching summary are excluded; the summary
    /// itself is kept.
    pub fn effective_api_history(messages: &[ContextMessage]) -> Vec<ContextMessage> {
        let summarized_ids: std::collections::HashSet<&str> = messages
            .iter()
            .filter(|m| m.condense_id.is_some() && m.id.starts_with("summary-"))
            .filter_map(|m| m.condense_id.as_deref())
            .collect();

        messages
            .iter()
            .filter(|m| match &m.condense_id {
                Some(id) if !m.id.starts_with("summary-") => !summarized_ids.contains(id.as_str()),
                _ => true,
            })
            .cloned()
            .collect()
    }
}

/// Picks the oldest contiguous window of non-SYSTEM, non-RECENT messages
/// as the summarization candidate range.
fn summarizable_range(messages: &[ContextMessage], recent_n: usize) -> std::ops::Range<usize> {
    use relay_protocol::MessagePriority;

    let recent_start = messages.len().saturating_sub(recent_n);
    let start = messages
        .iter()
        .position(|m| m.priority < MessagePriority::ANCHOR)
        .unwrap_or(messages.len());
    let end = messages[start..recent_start.max(start)]
        .iter()
        .position(|m| m.priority >= MessagePriority::ANCHOR)
        .map(|offset| start + offset)
        .unwrap_or(recent_start.max(start));
    start..end
}

fn aggressive_drop(
    messages: &[ContextMessage],
    budget: usize,
    recent_n: usize,
    count_tokens: &dyn Fn(&[ContextMessage]) -> usize,
) -> Vec<ContextMessage> {
    use relay_protocol::MessagePriority;

    let recent_start = messages.len().saturating_sub(recent_n);
    let mut kept: Vec<ContextMessage> = messages.to_vec();

    for i in (0..messages.len()).rev() {
        if count_tokens(&kept) <= budget {
            break;
        }
        if i >= recent_start {
            continue;
        }
        if messages[i].priority >= MessagePriority::ANCHOR {
            continue;
        }
        kept.retain(|m| m.id != messages[i].id);
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_protocol::MessageContent;
    use relay_protocol::Role;

    fn message(id: &str, role: Role, len: usize) -> ContextMessage {
        ContextMessage::new(id, role, MessageContent::Text("x".repeat(len)))
    }

    fn char_count(messages: &[ContextMessage]) -> usize {
        messages
            .iter()
            .map(|m| match &m.content {
                MessageContent::Text(t) => t.len(),
                _ => 0,
            })
            .sum()
    }

    #[tokio::test]
    async fn healthy_state_takes_no_action() {
        let mut manager = AutoManager::new(5, TrimPolicy::default(), Vec::new());
        let messages = vec![message("sys", Role::System, 10), message("u1", Role::User, 10)];
        let budget = TokenBudget {
            context_window: 1000,
            output_reserve: 0,
            system_reserve: 0,
        };
        let thresholds = relay_protocol::ThresholdProfile::Balanced.thresholds();
        let result = manager
            .manage(
                messages,
                "claude-opus-4",
                None,
                &budget,
                &thresholds,
                FeatureFlags::default(),
                &char_count,
                &HashMap::new(),
                0,
                CancellationToken::new(),
            )
            .await;
        assert_eq!(result.state_before, ContextStateKind::Healthy);
        assert!(result.actions.is_empty());
        assert_eq!(result.checkpoint_id, None);
    }

    #[tokio::test]
    async fn critical_state_creates_checkpoint_and_truncates() {
        let mut manager = AutoManager::new(5, TrimPolicy::default(), Vec::new());
        let mut messages = vec![message("sys", Role::System, 10), message("anchor", Role::User, 10)];
        for i in 0..20 {
            messages.push(message(&format!("mid{i}"), Role::Assistant, 100));
        }
        let budget = TokenBudget {
            context_window: 900,
            output_reserve: 0,
            system_reserve: 0,
        };
        let thresholds = relay_protocol::ThresholdProfile::Balanced.thresholds();
        let result = manager
            .manage(
                messages,
                "claude-opus-4",
                None,
                &budget,
                &thresholds,
                FeatureFlags::default(),
                &char_count,
                &HashMap::new(),
                0,
                CancellationToken::new(),
            )
            .await;
        assert_eq!(result.state_before, ContextStateKind::Critical);
        assert!(result.checkpoint_id.is_some());
        assert!(result.token_count_after <= result.token_count_before);
    }

    #[test]
    fn effective_history_excludes_originals_with_a_matching_summary() {
        let mut original = message("m1", Role::Assistant, 10);
        original.condense_id = Some("cid-1".to_string());
        let mut summary = message("summary-cid-1", Role::Assistant, 10);
        summary.condense_id = Some("cid-1".to_string());
        let kept = message("m2", Role::User, 10);

        let messages = vec![original, summary, kept];
        let effective = AutoManager::effective_api_history(&messages);
        assert_eq!(effective.len(), 2);
        assert!(effective.iter().any(|m| m.id == "summary-cid-1"));
        assert!(effective.iter().any(|m| m.id == "m2"));
    }
}
