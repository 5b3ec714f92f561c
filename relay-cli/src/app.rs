//! Wires the concrete capability implementations, the builtin command
//! set, and loaded configuration into the handles `relay-core`'s
//! executors and Auto-Manager need.

use crate::capability_impls::EchoModelClientFactory;
use crate::capability_impls::NoCredentials;
use crate::capability_impls::NoSkills;
use crate::capability_impls::NoTools;
use crate::capability_impls::StdFileSink;
use crate::capability_impls::TracingEventEmitter;
use crate::handlers;
use relay_core::capability::Clock;
use relay_core::capability::CredentialManager;
use relay_core::capability::EventEmitter;
use relay_core::capability::FileSink;
use relay_core::capability::HeuristicTokenizer;
use relay_core::capability::ModelClientFactory;
use relay_core::capability::SkillManager;
use relay_core::capability::SystemClock;
use relay_core::capability::Tokenizer;
use relay_core::capability::ToolRegistryHandle;
use relay_core::commands::CommandRegistry;
use relay_core::commands::ContextProvider;
use relay_core::commands::Session;
use relay_core::window::resolve_budget;
use relay_core::window::AutoManager;
use relay_core::window::FallbackEntry;
use relay_core::window::FeatureFlags;
use relay_core::window::ManageResult;
use relay_core::RelayConfig;
use relay_protocol::ContextMessage;
use relay_protocol::TokenBudget;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// The [`ContextProvider`] this binary hands every command: no credential
/// store, no plugin/MCP tool registry, no skill manager (all out of scope
/// per spec §1), a real file sink for `>`/`>>` redirects, and a
/// tracing-backed event emitter.
pub struct AppProvider {
    credentials: Arc<dyn CredentialManager>,
    tools: Arc<dyn ToolRegistryHandle>,
    skills: Arc<dyn SkillManager>,
    events: Arc<dyn EventEmitter>,
    file_sink: Arc<dyn FileSink>,
}

impl Default for AppProvider {
    fn default() -> Self {
        Self {
            credentials: Arc::new(NoCredentials),
            tools: Arc::new(NoTools),
            skills: Arc::new(NoSkills),
            events: Arc::new(TracingEventEmitter),
            file_sink: Arc::new(StdFileSink),
        }
    }
}

impl ContextProvider for AppProvider {
    fn credentials(&self) -> Arc<dyn CredentialManager> {
        self.credentials.clone()
    }

    fn tools(&self) -> Arc<dyn ToolRegistryHandle> {
        self.tools.clone()
    }

    fn skills(&self) -> Arc<dyn SkillManager> {
        self.skills.clone()
    }

    fn events(&self) -> Arc<dyn EventEmitter> {
        self.events.clone()
    }

    fn file_sink(&self) -> Option<Arc<dyn FileSink>> {
        Some(self.file_sink.clone())
    }
}

/// Everything a one-shot `relay` invocation needs: a populated command
/// registry, the capability provider handed to every command, loaded
/// configuration, and the context-window manager's long-lived state
/// (`AutoManager` owns the checkpoint store across `manage()` calls).
pub struct App {
    pub registry: CommandRegistry,
    pub provider: AppProvider,
    pub config: RelayConfig,
    pub tokenizer: Arc<dyn Tokenizer>,
    pub clock: Arc<dyn Clock>,
    pub auto_manager: AutoManager,
}

/// The default Fallback Chain when none is configured: a single attempt
/// against the requested model with a generous timeout, then give up. A
/// production deployment would read this from `RelayConfig`; SPEC_FULL's
/// config layer does not (yet) expose fallback-chain knobs, so this is the
/// one deliberately hardcoded policy (see `DESIGN.md`).
fn default_fallback_chain(model: &str) -> Vec<FallbackEntry> {
    vec![FallbackEntry {
        model: model.to_string(),
        timeout: Duration::from_secs(30),
        max_retries: 1,
        retry_delay: Duration::from_millis(500),
    }]
}

impl App {
    pub fn new(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let config = RelayConfig::load(config_path)?;

        let mut registry = CommandRegistry::new();
        handlers::register_builtins(&mut registry)?;

        let auto_manager = AutoManager::new(config.checkpoint_capacity, config.trim.to_policy(), Vec::new());

        Ok(Self {
            registry,
            provider: AppProvider::default(),
            config,
            tokenizer: Arc::new(HeuristicTokenizer::new()),
            clock: Arc::new(SystemClock),
            auto_manager,
        })
    }

    /// A fresh session rooted at `cwd`, carrying a random session id and
    /// `"local"` as a stand-in provider name (no real credential-backed
    /// provider is wired up; see [`AppProvider`]).
    pub fn session(&self, cwd: PathBuf) -> Session {
        Session {
            id: Uuid::new_v4().to_string(),
            provider: "local".to_string(),
            cwd,
        }
    }

    /// Resolves `model`'s [`TokenBudget`] from the loaded config's
    /// per-model overrides, defaulting to a 128k context window when no
    /// override matches.
    pub fn budget_for(&self, model: &str) -> TokenBudget {
        resolve_budget(model, &self.config.budget_overrides(), 128_000, 0)
    }

    /// Runs one Auto-Manager pass over `messages`, using `fail_models` to
    /// let a caller demonstrate the Fallback Chain's retry path against
    /// [`EchoModelClientFactory`] without a real LLM backend.
    pub async fn manage(
        &mut self,
        messages: Vec<ContextMessage>,
        model: &str,
        fail_models: Vec<String>,
        cancel: CancellationToken,
    ) -> ManageResult {
        let budget = self.budget_for(model);
        let thresholds = self.config.profile_for(model).thresholds();
        let factory: Arc<dyn ModelClientFactory> = Arc::new(EchoModelClientFactory::new(fail_models));
        let tokenizer = self.tokenizer.clone();
        let model_owned = model.to_string();
        let count_tokens = move |msgs: &[ContextMessage]| tokenizer.count_tokens(&model_owned, msgs);
        let tool_names: HashMap<String, String> = HashMap::new();
        let now_ms = self.clock.now_ms();
        self.auto_manager.fallback_chain = default_fallback_chain(model);

        self.auto_manager
            .manage(
                messages,
                model,
                Some(factory),
                &budget,
                &thresholds,
                FeatureFlags { aggressive_truncation: true },
                &count_tokens,
                &tool_names,
                now_ms,
                cancel,
            )
            .await
    }
}
