//! Capability interfaces consumed by the core (spec §6).
//!
//! Every trait here is a narrow seam onto an external collaborator that is
//! explicitly out of scope for this crate (terminal rendering, credential
//! storage, concrete LLM HTTP clients, git plumbing, file I/O, MCP
//! transport). The core only ever holds `Arc<dyn Trait>` handles to these.

use async_trait::async_trait;
use relay_protocol::ContextMessage;
use std::path::Path;
use std::sync::Arc;

/// Counts tokens for a given model and message set. May call out to a real
/// tokenizer or use a heuristic; the core does not care which.
pub trait Tokenizer: Send + Sync {
    fn count_tokens(&self, model: &str, messages: &[ContextMessage]) -> usize;
}

/// A conservative, dependency-free heuristic (characters / 4, plus a small
/// per-message overhead) usable when no real tokenizer is wired up.
///
/// Grounded on `neuron-context`'s `SlidingWindow::estimate_message_tokens`
/// chars-per-token heuristic.
pub struct HeuristicTokenizer {
    chars_per_token: usize,
}

impl HeuristicTokenizer {
    pub fn new() -> Self {
        Self { chars_per_token: 4 }
    }

    pub fn with_ratio(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
        }
    }
}

impl Default for HeuristicTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for HeuristicTokenizer {
    fn count_tokens(&self, _model: &str, messages: &[ContextMessage]) -> usize {
        use relay_protocol::ContentBlock;

        messages
            .iter()
            .map(|msg| {
                let body: usize = msg
                    .content
                    .as_blocks()
                    .iter()
                    .map(|block| match block {
                        ContentBlock::Text { text } => text.len() / self.chars_per_token,
                        ContentBlock::ToolUse { input, .. } => {
                            input.to_string().len() / self.chars_per_token
                        }
                        ContentBlock::ToolResult { content, .. } => {
                            content.len() / self.chars_per_token
                        }
                        ContentBlock::Image { .. } => 1000,
                    })
                    .sum();
                body + 4
            })
            .sum()
    }
}

/// Errors an [`LLMClient`] call may fail with.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("model call failed: {0}")]
    Other(String),
}

/// Summarizes a message range via an LLM. One instance per model, obtained
/// through a [`ModelClientFactory`].
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn summarize(&self, messages: &[ContextMessage], prompt: &str) -> Result<String, LlmError>;
}

/// Resolves a model name to an [`LlmClient`] instance.
pub trait ModelClientFactory: Send + Sync {
    fn client_for(&self, model: &str) -> Arc<dyn LlmClient>;
}

/// Opaque credential-store handle passed through to handlers. Not used by
/// the core subsystems themselves.
pub trait CredentialManager: Send + Sync {}

/// Opaque tool-registry handle passed through to handlers.
pub trait ToolRegistryHandle: Send + Sync {}

/// Opaque skill-manager handle passed through to handlers.
pub trait SkillManager: Send + Sync {}

/// Write mode for [`FileSink::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Overwrite,
    Append,
}

/// The `>` / `>>` terminal redirect target (C11).
pub trait FileSink: Send + Sync {
    fn write(&self, path: &Path, content: &str, mode: WriteMode) -> std::io::Result<()>;
}

/// Injectable monotonic clock for checkpoints and compaction timestamps.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall-clock [`Clock`] backed by `chrono::Utc::now`.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Fire-and-forget event sink.
pub trait EventEmitter: Send + Sync {
    fn emit(&self, name: &str, payload: serde_json::Value);
}

/// An [`EventEmitter`] that drops every event; useful as a default/test
/// double.
pub struct NullEventEmitter;

impl EventEmitter for NullEventEmitter {
    fn emit(&self, _name: &str, _payload: serde_json::Value) {}
}
