//! Concrete capability implementations wired up by [`crate::app::App`].
//!
//! The credential store, tool registry, skill manager, and concrete LLM
//! HTTP clients are all explicitly out of scope for `relay-core` (spec §1).
//! This module supplies the narrow stand-ins a one-shot CLI process needs
//! so the rest of the engine can actually run: opaque no-op capability
//! handles, a real (if minimal) file sink, a tracing-backed event emitter,
//! and a deterministic summarizer double that never makes a network call.

use async_trait::async_trait;
use relay_core::capability::CredentialManager;
use relay_core::capability::EventEmitter;
use relay_core::capability::FileSink;
use relay_core::capability::LlmClient;
use relay_core::capability::LlmError;
use relay_core::capability::ModelClientFactory;
use relay_core::capability::SkillManager;
use relay_core::capability::ToolRegistryHandle;
use relay_core::capability::WriteMode;
use relay_protocol::ContextMessage;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// No credential store is wired up; `relay-core` never reads this handle
/// itself, only passes it through to handlers.
pub struct NoCredentials;
impl CredentialManager for NoCredentials {}

/// No MCP/plugin tool registry is wired up for this one-shot process.
pub struct NoTools;
impl ToolRegistryHandle for NoTools {}

/// No skill manager is wired up for this one-shot process.
pub struct NoSkills;
impl SkillManager for NoSkills {}

/// Logs every emitted event at `debug` level via `tracing` rather than
/// dropping it, so `--debug` runs can see what a handler reported without
/// needing a real UI event bus wired up.
pub struct TracingEventEmitter;

impl EventEmitter for TracingEventEmitter {
    fn emit(&self, name: &str, payload: serde_json::Value) {
        debug!(event = name, %payload, "command event");
    }
}

/// Writes `>`/`>>` redirect targets straight to the filesystem, the one
/// piece of real file I/O a one-shot CLI cannot avoid owning itself.
pub struct StdFileSink;

impl FileSink for StdFileSink {
    fn write(&self, path: &Path, content: &str, mode: WriteMode) -> std::io::Result<()> {
        use std::fs::OpenOptions;
        use std::io::Write;

        let mut options = OpenOptions::new();
        options.write(true).create(true);
        match mode {
            WriteMode::Overwrite => {
                options.truncate(true);
            }
            WriteMode::Append => {
                options.append(true);
            }
        }
        let mut file = options.open(path)?;
        file.write_all(content.as_bytes())
    }
}

/// A deterministic, network-free stand-in for a real LLM summarizer.
///
/// Concrete LLM HTTP clients are out of scope (spec §1); this double still
/// exercises the full Fallback Chain/growth-validator machinery in C18 by
/// producing a condensed (but not network-backed) rendering of the
/// message range's text content. `fail_models` lets a caller simulate a
/// model that always errors, to exercise the Fallback Chain's retry path
/// without any real transport.
pub struct EchoSummaryClient;

#[async_trait]
impl LlmClient for EchoSummaryClient {
    async fn summarize(&self, messages: &[ContextMessage], _prompt: &str) -> Result<String, LlmError> {
        let text: String = messages
            .iter()
            .flat_map(|m| m.content.as_blocks())
            .filter_map(|block| match block {
                relay_protocol::ContentBlock::Text { text } => Some(text),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" ");
        let condensed: String = text.split_whitespace().take(40).collect::<Vec<_>>().join(" ");
        Ok(format!("[condensed] {condensed}"))
    }
}

/// Resolves every model name to an [`EchoSummaryClient`]; `fail_models`
/// entries produce a client whose `summarize` always errors, letting a
/// caller exercise the Fallback Chain's multi-model retry path.
pub struct EchoModelClientFactory {
    fail_models: Vec<String>,
}

impl EchoModelClientFactory {
    pub fn new(fail_models: Vec<String>) -> Self {
        Self { fail_models }
    }
}

struct AlwaysFailClient;

#[async_trait]
impl LlmClient for AlwaysFailClient {
    async fn summarize(&self, _messages: &[ContextMessage], _prompt: &str) -> Result<String, LlmError> {
        Err(LlmError::Other("model unavailable (demo fallback client)".to_string()))
    }
}

impl ModelClientFactory for EchoModelClientFactory {
    fn client_for(&self, model: &str) -> Arc<dyn LlmClient> {
        if self.fail_models.iter().any(|m| m == model) {
            debug!(%model, "demo factory: serving an always-failing client");
            Arc::new(AlwaysFailClient)
        } else {
            Arc::new(EchoSummaryClient)
        }
    }
}
