//! Command Executor (C9): parse → resolve → validate → construct context →
//! invoke handler → classify result.

use super::context::CommandContext;
use super::context::ContextProvider;
use super::context::Session;
use super::parser::parse_command;
use super::registry::CommandRegistry;
use super::result::CommandResult;
use super::suggest::suggest;
use super::validate::validate;
use futures::FutureExt;
use relay_protocol::ErrorCode;
use std::panic::AssertUnwindSafe;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing::warn;

/// Executes a single command input string. `piped_input` is the previous
/// pipe segment's stdout, threaded in as the `input` named argument (see
/// the Piped Executor, C11); pass `None` outside of a pipe.
pub async fn execute(
    input: &str,
    registry: &CommandRegistry,
    provider: &dyn ContextProvider,
    session: Session,
    cancel: CancellationToken,
    piped_input: Option<String>,
) -> CommandResult {
    let mut parsed = match parse_command(input) {
        Ok(parsed) => parsed,
        Err(err) => {
            return CommandResult::Error(
                crate::error::CoreError::Parse(err).into_payload(),
            );
        }
    };
    if let Some(piped_input) = piped_input {
        parsed
            .named
            .insert("input".to_string(), relay_protocol::NamedValue::Str(piped_input));
    }

    let Some(signature) = registry.get(&parsed.name) else {
        let suggestions = suggest(&parsed.name, registry)
            .into_iter()
            .map(|name| format!("/{name}"))
            .collect::<Vec<_>>();
        let help_command = suggestions.first().cloned();
        return CommandResult::Error(relay_protocol::ErrorPayload {
            code: ErrorCode::CommandNotFound,
            message: format!("command '/{}' was not found", parsed.name),
            suggestions,
            help_command,
        });
    };

    let args = match validate(&parsed, signature) {
        Ok(args) => args,
        Err(err) => {
            let mut payload = err.into_payload();
            payload.help_command = Some(format!("/help {}", parsed.name));
            return CommandResult::Error(payload);
        }
    };

    if cancel.is_cancelled() {
        return CommandResult::Error(aborted_payload());
    }

    let Some(handler) = registry.get_handler(&parsed.name) else {
        error!(command = %parsed.name, "registry has a signature but no handler");
        return CommandResult::Error(relay_protocol::ErrorPayload {
            code: ErrorCode::InternalError,
            message: format!("no handler registered for '/{}'", parsed.name),
            suggestions: Vec::new(),
            help_command: None,
        });
    };

    let ctx = CommandContext {
        session,
        args,
        cancel: cancel.clone(),
        events: provider.events(),
        credentials: provider.credentials(),
        tools: provider.tools(),
        skills: provider.skills(),
    };

    let command_name = parsed.name.clone();
    match AssertUnwindSafe(handler.invoke(ctx)).catch_unwind().await {
        Ok(result) => result,
        Err(_) => {
            error!(command = %command_name, "handler panicked");
            CommandResult::Error(relay_protocol::ErrorPayload {
                code: ErrorCode::InternalError,
                message: format!("handler for '/{command_name}' panicked"),
                suggestions: Vec::new(),
                help_command: None,
            })
        }
    }
}

fn aborted_payload() -> relay_protocol::ErrorPayload {
    warn!("command execution aborted before dispatch");
    relay_protocol::ErrorPayload {
        code: ErrorCode::CommandAborted,
        message: "command aborted".to_string(),
        suggestions: Vec::new(),
        help_command: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CredentialManager;
    use crate::capability::EventEmitter;
    use crate::capability::NullEventEmitter;
    use crate::capability::SkillManager;
    use crate::capability::ToolRegistryHandle;
    use relay_protocol::ArgSpec;
    use relay_protocol::ArgType;
    use relay_protocol::CommandKind;
    use relay_protocol::CommandSignature;
    use std::path::PathBuf;
    use std::sync::Arc;

    struct NullCredentials;
    impl CredentialManager for NullCredentials {}
    struct NullTools;
    impl ToolRegistryHandle for NullTools {}
    struct NullSkills;
    impl SkillManager for NullSkills {}

    struct TestProvider;
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
    }

    fn session() -> Session {
        Session {
            id: "s1".to_string(),
            provider: "anthropic".to_string(),
            cwd: PathBuf::from("/tmp"),
        }
    }

    #[tokio::test]
    async fn unknown_command_returns_not_found_with_suggestion() {
        let mut registry = CommandRegistry::new();
        registry
            .register(
                CommandSignature::new("help", CommandKind::Builtin, "system"),
                Arc::new(|_ctx| Box::pin(async { CommandResult::success("ok") }) as _),
            )
            .unwrap();
        let provider = TestProvider;
        let result = execute("/hel", &registry, &provider, session(), CancellationToken::new(), None).await;
        match result {
            CommandResult::Error(payload) => {
                assert_eq!(payload.code, ErrorCode::CommandNotFound);
                assert_eq!(payload.suggestions, vec!["/help".to_string()]);
            }
            _ => panic!("expected error result"),
        }
    }

    #[tokio::test]
    async fn validation_failure_carries_help_command() {
        let mut registry = CommandRegistry::new();
        registry
            .register(
                CommandSignature::new("login", CommandKind::Builtin, "auth")
                    .with_positional(ArgSpec::required("provider", ArgType::String)),
                Arc::new(|_ctx| Box::pin(async { CommandResult::success("ok") }) as _),
            )
            .unwrap();
        let provider = TestProvider;
        let result = execute("/login", &registry, &provider, session(), CancellationToken::new(), None).await;
        match result {
            CommandResult::Error(payload) => {
                assert_eq!(payload.code, ErrorCode::MissingArgument);
                assert_eq!(payload.help_command.as_deref(), Some("/help login"));
            }
            _ => panic!("expected error result"),
        }
    }

    #[tokio::test]
    async fn handler_panic_is_trapped_as_internal_error() {
        let mut registry = CommandRegistry::new();
        registry
            .register(
                CommandSignature::new("boom", CommandKind::Builtin, "debug"),
                Arc::new(|_ctx| Box::pin(async { panic!("boom") }) as _),
            )
            .unwrap();
        let provider = TestProvider;
        let result = execute("/boom", &registry, &provider, session(), CancellationToken::new(), None).await;
        match result {
            CommandResult::Error(payload) => assert_eq!(payload.code, ErrorCode::InternalError),
            _ => panic!("expected error result"),
        }
    }

    #[tokio::test]
    async fn successful_dispatch_reaches_handler() {
        let mut registry = CommandRegistry::new();
        registry
            .register(
                CommandSignature::new("ping", CommandKind::Builtin, "debug"),
                Arc::new(|_ctx| Box::pin(async { CommandResult::success("pong") }) as _),
            )
            .unwrap();
        let provider = TestProvider;
        let result = execute("/ping", &registry, &provider, session(), CancellationToken::new(), None).await;
        assert!(result.is_success());
    }
}
