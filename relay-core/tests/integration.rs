//! Cross-component scenarios that exercise the public API stack end to
//! end, rather than one module in isolation: a chain short-circuiting
//! across real registered commands, a pipeline redirecting to a file
//! sink, the Auto-Manager driving a 100-message history through
//! checkpoint+truncation, and a rejected oversized summary rolling back
//! to the pre-compaction checkpoint.

use async_trait::async_trait;
use relay_core::capability::CredentialManager;
use relay_core::capability::EventEmitter;
use relay_core::capability::FileSink;
use relay_core::capability::HeuristicTokenizer;
use relay_core::capability::LlmClient;
use relay_core::capability::LlmError;
use relay_core::capability::ModelClientFactory;
use relay_core::capability::NullEventEmitter;
use relay_core::capability::SkillManager;
use relay_core::capability::Tokenizer;
use relay_core::capability::ToolRegistryHandle;
use relay_core::capability::WriteMode;
use relay_core::commands::execute_chain;
use relay_core::commands::execute_pipe;
use relay_core::commands::CommandContext;
use relay_core::commands::CommandRegistry;
use relay_core::commands::CommandResult;
use relay_core::commands::ContextProvider;
use relay_core::commands::Session;
use relay_core::window::AutoManager;
use relay_core::window::FallbackEntry;
use relay_core::window::FeatureFlags;
use relay_protocol::CommandKind;
use relay_protocol::CommandSignature;
use relay_protocol::ContextMessage;
use relay_protocol::ContextStateKind;
use relay_protocol::MessageContent;
use relay_protocol::MessagePriority;
use relay_protocol::Role;
use relay_protocol::ThresholdProfile;
use relay_protocol::TokenBudget;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

struct NullCredentials;
impl CredentialManager for NullCredentials {}
struct NullTools;
impl ToolRegistryHandle for NullTools {}
struct NullSkills;
impl SkillManager for NullSkills {}

#[derive(Default)]
struct RecordingSink {
    calls: Mutex<Vec<(PathBuf, String, WriteMode)>>,
}

impl FileSink for RecordingSink {
    fn write(&self, path: &Path, content: &str, mode: WriteMode) -> std::io::Result<()> {
        self.calls.lock().unwrap().push((path.to_path_buf(), content.to_string(), mode));
        Ok(())
    }
}

struct TestProvider {
    file_sink: Option<Arc<dyn FileSink>>,
}

impl Default for TestProvider {
    fn default() -> Self {
        Self { file_sink: None }
    }
}

impl ContextProvider for TestProvider {
    fn credentials(&self) -> Arc<dyn CredentialManager> {
        Arc::new(NullCredentials)
    }
    fn tools(&self) -> Arc<dyn ToolRegistryHandle> {
        Arc::new(NullTools)
    }
    fn skills(&self) -> Arc<dyn SkillManager> {
        Arc::new(NullSkills)
    }
    fn events(&self) -> Arc<dyn EventEmitter> {
        Arc::new(NullEventEmitter)
    }
    fn file_sink(&self) -> Option<Arc<dyn FileSink>> {
        self.file_sink.clone()
    }
}

fn session() -> Session {
    Session {
        id: "integration-session".to_string(),
        provider: "anthropic".to_string(),
        cwd: PathBuf::from("/tmp"),
    }
}

fn register_success(registry: &mut CommandRegistry, name: &str, message: &'static str) {
    registry
        .register(
            CommandSignature::new(name, CommandKind::Builtin, "test"),
            Arc::new(move |_ctx: CommandContext| Box::pin(async move { CommandResult::success(message) }) as _),
        )
        .unwrap();
}

fn register_error(registry: &mut CommandRegistry, name: &str, message: &'static str) {
    registry
        .register(
            CommandSignature::new(name, CommandKind::Builtin, "test"),
            Arc::new(move |_ctx: CommandContext| {
                Box::pin(async move { CommandResult::error(relay_protocol::ErrorCode::InternalError, message) }) as _
            }),
        )
        .unwrap();
}

#[tokio::test]
async fn chain_short_circuits_across_real_registered_commands() {
    let mut registry = CommandRegistry::new();
    register_success(&mut registry, "ok", "ok ran");
    register_error(&mut registry, "boom", "boom");
    register_success(&mut registry, "unreachable", "should not run");

    let provider = TestProvider::default();

    // `&&` after a failure must not run the right-hand side.
    let outcome = execute_chain("/boom && /unreachable", &registry, &provider, session(), CancellationToken::new()).await;
    assert!(!outcome.result.is_success());
    assert_eq!(outcome.ran_indices, vec![0]);

    // `||` after a failure must run the right-hand side.
    let outcome = execute_chain("/boom || /ok", &registry, &provider, session(), CancellationToken::new()).await;
    assert_eq!(outcome.ran_indices, vec![0, 1]);
    match outcome.result {
        CommandResult::Success(payload) => assert_eq!(payload.message.as_deref(), Some("ok ran")),
        other => panic!("expected success, got {other:?}"),
    }

    // `;` always runs both sides regardless of the left-hand outcome.
    let outcome = execute_chain("/boom ; /ok", &registry, &provider, session(), CancellationToken::new()).await;
    assert!(outcome.result.is_success());
}

#[tokio::test]
async fn pipeline_threads_stdout_and_redirects_to_a_file_sink() {
    let mut registry = CommandRegistry::new();
    register_success(&mut registry, "produce", "alpha\nbeta\ngamma");
    register_success(&mut registry, "grep-beta", "beta");

    let sink = Arc::new(RecordingSink::default());
    let provider = TestProvider { file_sink: Some(sink.clone()) };

    let result = execute_pipe("/produce | /grep-beta > matches.txt", &registry, &provider, session(), CancellationToken::new()).await;

    assert!(result.is_success());
    let calls = sink.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, PathBuf::from("matches.txt"));
    assert_eq!(calls[0].1, "beta");
    assert_eq!(calls[0].2, WriteMode::Overwrite);
}

fn long_message(id: &str, role: Role, priority: MessagePriority, chars: usize) -> ContextMessage {
    ContextMessage::new(id, role, MessageContent::Text("x".repeat(chars))).with_priority(priority)
}

fn history_of(n: usize) -> Vec<ContextMessage> {
    let mut messages = vec![
        long_message("system", Role::System, MessagePriority::SYSTEM, 40),
        long_message("anchor", Role::User, MessagePriority::ANCHOR, 40),
    ];
    for i in 0..n {
        messages.push(long_message(&format!("turn-{i}"), Role::Assistant, MessagePriority::NORMAL, 3000));
    }
    messages
}

struct EchoClient;

#[async_trait]
impl LlmClient for EchoClient {
    async fn summarize(&self, messages: &[ContextMessage], _prompt: &str) -> Result<String, LlmError> {
        Ok(format!("condensed {} message(s)", messages.len()))
    }
}

struct GrowthClient;

#[async_trait]
impl LlmClient for GrowthClient {
    async fn summarize(&self, _messages: &[ContextMessage], _prompt: &str) -> Result<String, LlmError> {
        Ok("x".repeat(50_000))
    }
}

struct SingleClientFactory(Arc<dyn LlmClient>);

impl ModelClientFactory for SingleClientFactory {
    fn client_for(&self, _model: &str) -> Arc<dyn LlmClient> {
        self.0.clone()
    }
}

fn balanced_budget() -> TokenBudget {
    relay_core::window::resolve_budget("claude-sonnet-4", &[], 20_000, 0)
}

fn tokenizer_counter() -> impl Fn(&[ContextMessage]) -> usize {
    let tokenizer = HeuristicTokenizer::new();
    move |messages: &[ContextMessage]| tokenizer.count_tokens("claude-sonnet-4", messages)
}

#[tokio::test]
async fn auto_manager_checkpoints_and_truncates_a_100_message_critical_history() {
    let mut manager = AutoManager::new(5, relay_core::window::TrimPolicy::default(), Vec::new());
    let messages = history_of(100);
    let budget = balanced_budget();
    let thresholds = ThresholdProfile::Balanced.thresholds();
    let count_tokens = tokenizer_counter();

    let report = manager
        .manage(
            messages,
            "claude-sonnet-4",
            None,
            &budget,
            &thresholds,
            FeatureFlags::default(),
            &count_tokens,
            &HashMap::new(),
            0,
            CancellationToken::new(),
        )
        .await;

    assert!(report.state_before >= ContextStateKind::Critical, "expected a critical/overflow starting state, got {:?}", report.state_before);
    assert!(report.checkpoint_id.is_some(), "a checkpoint must be created before compaction at critical+");
    assert!(report.token_count_after < report.token_count_before, "the pass must reduce token count");
    assert!(report.messages.len() < 102, "truncation/summarization must shrink the message list");
}

#[tokio::test]
async fn auto_manager_rolls_back_to_checkpoint_when_the_summary_fails_growth_validation() {
    let factory: Arc<dyn ModelClientFactory> = Arc::new(SingleClientFactory(Arc::new(GrowthClient)));
    let mut manager = AutoManager::new(5, relay_core::window::TrimPolicy::default(), vec![FallbackEntry {
        model: "claude-sonnet-4".to_string(),
        timeout: Duration::from_secs(1),
        max_retries: 1,
        retry_delay: Duration::from_millis(1),
    }]);
    let messages = history_of(100);
    let budget = balanced_budget();
    let thresholds = ThresholdProfile::Balanced.thresholds();
    let count_tokens = tokenizer_counter();

    let report = manager
        .manage(
            messages.clone(),
            "claude-sonnet-4",
            Some(factory),
            &budget,
            &thresholds,
            FeatureFlags::default(),
            &count_tokens,
            &HashMap::new(),
            0,
            CancellationToken::new(),
        )
        .await;

    assert!(report.checkpoint_id.is_some());
    assert!(
        report.actions.iter().any(|a| a.contains("compaction failed")),
        "expected a rollback action after the oversized summary was rejected, got {:?}",
        report.actions
    );
    // Truncation still ran before the rejected summarization attempt, so
    // the rolled-back history is the post-truncation state, not the raw
    // 102-message original.
    assert!(report.messages.len() <= messages.len());
}

#[tokio::test]
async fn auto_manager_succeeds_with_a_well_behaved_summarizer() {
    let factory: Arc<dyn ModelClientFactory> = Arc::new(SingleClientFactory(Arc::new(EchoClient)));
    let mut manager = AutoManager::new(5, relay_core::window::TrimPolicy::default(), vec![FallbackEntry {
        model: "claude-sonnet-4".to_string(),
        timeout: Duration::from_secs(1),
        max_retries: 1,
        retry_delay: Duration::from_millis(1),
    }]);
    let messages = history_of(100);
    let budget = balanced_budget();
    let thresholds = ThresholdProfile::Balanced.thresholds();
    let count_tokens = tokenizer_counter();
    let calls = AtomicUsize::new(0);
    let _ = &calls;

    let report = manager
        .manage(
            messages,
            "claude-sonnet-4",
            Some(factory),
            &budget,
            &thresholds,
            FeatureFlags { aggressive_truncation: true },
            &count_tokens,
            &HashMap::new(),
            0,
            CancellationToken::new(),
        )
        .await;

    assert!(report.state_after <= ContextStateKind::Critical || report.token_count_after < report.token_count_before);
    let effective = AutoManager::effective_api_history(&report.messages);
    assert!(effective.len() <= report.messages.len());
}
