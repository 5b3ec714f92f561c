//! Summarizer (C18): condenses a contiguous message range via an LLM,
//! retrying across a Fallback Chain, validated against a growth ratio.

use crate::capability::LlmClient;
use crate::capability::ModelClientFactory;
use crate::error::CompactionError;
use relay_protocol::ContentBlock;
use relay_protocol::ContextMessage;
use relay_protocol::MessageContent;
use relay_protocol::MessagePriority;
use relay_protocol::Role;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::warn;

/// One model/timeout/retry policy in the Fallback Chain, tried in order.
#[derive(Debug, Clone)]
pub struct FallbackEntry {
    pub model: String,
    pub timeout: Duration,
    pub max_retries: usize,
    pub retry_delay: Duration,
}

/// One attempt's outcome, recorded regardless of success so a caller can
/// diagnose an `ALL_MODELS_FAILED` signal.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    pub model: String,
    pub attempt: usize,
    pub success: bool,
    pub latency_ms: u64,
    pub error: Option<String>,
    pub timed_out: bool,
}

/// Inputs to a single summarization pass over `messages[range]`.
pub struct SummarizeRequest<'a> {
    pub messages: &'a [ContextMessage],
    pub range: std::ops::Range<usize>,
    pub factory: Arc<dyn ModelClientFactory>,
    pub fallback_chain: &'a [FallbackEntry],
    pub max_ratio: f64,
    pub count_tokens: &'a dyn Fn(&[ContextMessage]) -> usize,
}

/// The result of a successful summarization: the replacement synthetic
/// message plus the condense_id stamped onto the originals.
pub struct SummarizeResult {
    pub new_messages: Vec<ContextMessage>,
    pub condense_id: String,
    pub original_tokens: usize,
    pub summary_tokens: usize,
}

/// `true` when `model` requires a synthetic chain-of-thought preamble
/// ahead of its summary content, per the spec's literal predicate.
pub fn requires_chain_of_thought_preamble(model: &str) -> bool {
    model.to_lowercase().contains("deepseek")
}

fn build_prompt(messages: &[ContextMessage]) -> String {
    let mut prompt = String::from(
        "Summarize the following conversation range across six sections: \
         intent, constraints, decisions, tool results, pending work, open questions.\n\n",
    );
    for message in messages {
        for block in message.content.as_blocks() {
            if let ContentBlock::Text { text } = block {
                prompt.push_str(&text);
                prompt.push('\n');
            }
        }
    }
    prompt
}

/// Runs the Fallback Chain against `messages[request.range]`, honoring
/// `cancel` between attempts and per-attempt timeouts via `tokio::select!`.
pub async fn summarize(
    request: SummarizeRequest<'_>,
    condense_id: impl Into<String>,
    cancel: CancellationToken,
) -> Result<SummarizeResult, CompactionError> {
    let condense_id = condense_id.into();
    let range_messages = &request.messages[request.range.clone()];
    if range_messages.is_empty() {
        return Err(CompactionError::MinMessagesNotMet);
    }

    let original_tokens = (request.count_tokens)(range_messages);
    if original_tokens == 0 {
        return Err(CompactionError::NoTokenBudget);
    }

    let prompt = build_prompt(range_messages);
    let mut attempt_history = Vec::new();

    for entry in request.fallback_chain {
        if cancel.is_cancelled() {
            return Err(CompactionError::Aborted);
        }

        let client = request.factory.client_for(&entry.model);
        let mut last_error = None;

        for attempt in 1..=entry.max_retries.max(1) {
            if cancel.is_cancelled() {
                return Err(CompactionError::Aborted);
            }

            let started = Instant::now();
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err((true, "cancelled".to_string())),
                result = tokio::time::timeout(entry.timeout, client.summarize(range_messages, &prompt)) => {
                    match result {
                        Ok(Ok(text)) => Ok(text),
                        Ok(Err(err)) => Err((false, err.to_string())),
                        Err(_) => Err((true, "timed out".to_string())),
                    }
                }
            };
            let latency_ms = started.elapsed().as_millis() as u64;

            match outcome {
                Ok(text) => {
                    attempt_history.push(AttemptRecord {
                        model: entry.model.clone(),
                        attempt,
                        success: true,
                        latency_ms,
                        error: None,
                        timed_out: false,
                    });
                    return finalize(text, original_tokens, &request, &condense_id, attempt_history, &entry.model);
                }
                Err((timed_out, message)) => {
                    debug!(model = %entry.model, attempt, %message, "summarizer attempt failed");
                    attempt_history.push(AttemptRecord {
                        model: entry.model.clone(),
                        attempt,
                        success: false,
                        latency_ms,
                        error: Some(message.clone()),
                        timed_out,
                    });
                    last_error = Some(message);
                    if attempt < entry.max_retries {
                        tokio::time::sleep(entry.retry_delay * attempt as u32).await;
                    }
                }
            }
        }

        let _ = last_error;
    }

    warn!(attempts = attempt_history.len(), "all fallback-chain models failed");
    Err(CompactionError::AllModelsFailed {
        attempted_models: request.fallback_chain.len(),
        total_attempts: attempt_history.len(),
        attempt_history,
    })
}

fn finalize(
    summary_text: String,
    original_tokens: usize,
    request: &SummarizeRequest<'_>,
    condense_id: &str,
    _attempt_history: Vec<AttemptRecord>,
    winning_model: &str,
) -> Result<SummarizeResult, CompactionError> {
    let mut blocks = Vec::new();
    if requires_chain_of_thought_preamble(winning_model) {
        blocks.push(ContentBlock::Text {
            text: "[condensed context: reasoning preamble omitted]".to_string(),
        });
    }
    blocks.push(ContentBlock::Text { text: summary_text.clone() });

    let summary_tokens = (request.count_tokens)(&[ContextMessage::new(
        "tmp-summary-measure",
        Role::Assistant,
        MessageContent::Blocks(blocks.clone()),
    )]);

    if original_tokens > 0 && summary_tokens as f64 > original_tokens as f64 * request.max_ratio {
        return Err(CompactionError::ContextGrowth {
            original_tokens,
            resulting_tokens: summary_tokens,
            ratio: summary_tokens as f64 / original_tokens as f64,
        });
    }

    let parent_id = request.messages[request.range.clone()].first().map(|m| m.id.clone());
    let summary_message = ContextMessage {
        id: format!("summary-{condense_id}"),
        role: Role::Assistant,
        content: MessageContent::Blocks(blocks),
        priority: MessagePriority::NORMAL,
        condense_id: Some(condense_id.to_string()),
        parent_id,
        metadata: Default::default(),
    };

    Ok(SummarizeResult {
        new_messages: vec![summary_message],
        condense_id: condense_id.to_string(),
        original_tokens,
        summary_tokens,
    })
}
