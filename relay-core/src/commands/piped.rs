//! Piped Executor (C11): threads stdout of one pipe segment as stdin of the
//! next; terminal `>`/`>>` redirect to a file.

use super::context::ContextProvider;
use super::context::Session;
use super::executor::execute;
use super::pipe::parse_pipe;
use super::pipe::PipeSegmentKind;
use super::pipe::RedirectMode;
use super::registry::CommandRegistry;
use super::result::CommandResult;
use crate::capability::WriteMode;
use relay_protocol::ErrorCode;
use relay_protocol::ErrorPayload;
use relay_protocol::SuccessPayload;
use tokio_util::sync::CancellationToken;

/// Runs `input` as a pipeline: `|`-joined command segments with an
/// optional trailing `>`/`>>` redirect. Inputs with no pipe operator simply
/// delegate to a single [`execute`] call.
pub async fn execute_pipe(
    input: &str,
    registry: &CommandRegistry,
    provider: &dyn ContextProvider,
    session: Session,
    cancel: CancellationToken,
) -> CommandResult {
    let piped = parse_pipe(input);

    let command_segments: Vec<_> = piped
        .segments
        .iter()
        .filter(|s| s.kind == PipeSegmentKind::Command)
        .collect();

    if command_segments.is_empty() {
        return CommandResult::Error(ErrorPayload {
            code: ErrorCode::InvalidArgument,
            message: "pipeline has no command segments".to_string(),
            suggestions: Vec::new(),
            help_command: None,
        });
    }

    let mut stdout = String::new();
    let mut last_result = None;

    for (i, segment) in command_segments.iter().enumerate() {
        if cancel.is_cancelled() {
            return CommandResult::Error(ErrorPayload {
                code: ErrorCode::CommandAborted,
                message: "command aborted".to_string(),
                suggestions: Vec::new(),
                help_command: None,
            });
        }

        let piped_input = if i == 0 { None } else { Some(stdout.clone()) };
        let result = execute(
            &segment.text,
            registry,
            provider,
            session.clone(),
            cancel.clone(),
            piped_input,
        )
        .await;

        if !result.is_success() {
            return result;
        }

        stdout = match &result {
            CommandResult::Success(SuccessPayload { message, .. }) => message.clone().unwrap_or_default(),
            _ => String::new(),
        };
        last_result = Some(result);
    }

    if piped.has_redirect {
        let Some(target) = piped.redirect_target.as_deref() else {
            return CommandResult::Error(internal_error("redirect target missing after parse"));
        };
        let Some(sink) = provider.file_sink() else {
            return CommandResult::Error(internal_error("no file sink configured for redirect"));
        };
        let mode = match piped.redirect_mode {
            Some(RedirectMode::Append) => WriteMode::Append,
            _ => WriteMode::Overwrite,
        };
        if let Err(err) = sink.write(std::path::Path::new(target), &stdout, mode) {
            return CommandResult::Error(internal_error(&err.to_string()));
        }
    }

    last_result.unwrap_or_else(|| CommandResult::success(""))
}

fn internal_error(message: &str) -> ErrorPayload {
    ErrorPayload {
        code: ErrorCode::InternalError,
        message: message.to_string(),
        suggestions: Vec::new(),
        help_command: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CredentialManager;
    use crate::capability::EventEmitter;
    use crate::capability::FileSink;
    use crate::capability::NullEventEmitter;
    use crate::capability::SkillManager;
    use crate::capability::ToolRegistryHandle;
    use crate::commands::context::CommandContext;
    use relay_protocol::CommandKind;
    use relay_protocol::CommandSignature;
    use std::path::Path;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::Mutex;

    struct NullCredentials;
    impl CredentialManager for NullCredentials {}
    struct NullTools;
    impl ToolRegistryHandle for NullTools {}
    struct NullSkills;
    impl SkillManager for NullSkills {}

    #[derive(Default)]
    struct RecordingSink {
        calls: Mutex<Vec<(String, String, WriteMode)>>,
    }
    impl FileSink for RecordingSink {
        fn write(&self, path: &Path, content: &str, mode: WriteMode) -> std::io::Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push((path.display().to_string(), content.to_string(), mode));
            Ok(())
        }
    }

    struct TestProvider {
        sink: Arc<RecordingSink>,
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
            Some(self.sink.clone())
        }
    }

    fn session() -> Session {
        Session {
            id: "s1".to_string(),
            provider: "anthropic".to_string(),
            cwd: PathBuf::from("/tmp"),
        }
    }

    fn register_emitting(registry: &mut CommandRegistry, name: &str, output: &'static str) {
        registry
            .register(
                CommandSignature::new(name, CommandKind::Builtin, "tools"),
                Arc::new(move |_ctx: CommandContext| {
                    Box::pin(async move { CommandResult::success(output) }) as _
                }),
            )
            .unwrap();
    }

    #[tokio::test]
    async fn pipe_with_redirect_calls_file_sink_once() {
        let mut registry = CommandRegistry::new();
        register_emitting(&mut registry, "list", "a\nb\nfoo\nc");
        register_emitting(&mut registry, "filter", "foo");
        let sink = Arc::new(RecordingSink::default());
        let provider = TestProvider { sink: sink.clone() };

        let result = execute_pipe(
            "/list | /filter foo > out.txt",
            &registry,
            &provider,
            session(),
            CancellationToken::new(),
        )
        .await;

        assert!(result.is_success());
        let calls = sink.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "out.txt");
        assert_eq!(calls[0].1, "foo");
        assert_eq!(calls[0].2, WriteMode::Overwrite);
    }

    #[tokio::test]
    async fn missing_file_sink_is_internal_error() {
        let mut registry = CommandRegistry::new();
        register_emitting(&mut registry, "list", "a");

        struct NoSinkProvider;
        impl ContextProvider for NoSinkProvider {
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

        let result = execute_pipe("/list > out.txt", &registry, &NoSinkProvider, session(), CancellationToken::new()).await;
        match result {
            CommandResult::Error(payload) => assert_eq!(payload.code, ErrorCode::InternalError),
            _ => panic!("expected error"),
        }
    }

    #[tokio::test]
    async fn first_failure_terminates_pipeline() {
        let mut registry = CommandRegistry::new();
        registry
            .register(
                CommandSignature::new("fail", CommandKind::Builtin, "tools"),
                Arc::new(|_ctx| {
                    Box::pin(async { CommandResult::error(ErrorCode::InternalError, "boom") }) as _
                }),
            )
            .unwrap();
        register_emitting(&mut registry, "next", "unreachable");

        let sink = Arc::new(RecordingSink::default());
        let provider = TestProvider { sink };
        let result = execute_pipe("/fail | /next", &registry, &provider, session(), CancellationToken::new()).await;
        assert!(!result.is_success());
    }
}
