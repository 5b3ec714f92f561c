//! The full `CommandResult` discriminated union (§3, §9): unlike
//! [`relay_protocol::result`]'s serializable projections, the `interactive`
//! and `pending` variants here carry live continuations/futures that a
//! handler actually returns.

use futures::future::BoxFuture;
use relay_protocol::ErrorCode;
use relay_protocol::ErrorPayload;
use relay_protocol::InputType;
use relay_protocol::ResultKind;
use relay_protocol::ResultProjection;
use relay_protocol::SuccessPayload;
use serde_json::Value;
use std::sync::Arc;

/// The continuation invoked once the UI collects the user's answer to an
/// [`InteractivePrompt`]. The core never blocks a thread on user input: the
/// UI's job is to collect input and invoke this handler.
pub type PromptHandler = Arc<dyn Fn(String) -> BoxFuture<'static, CommandResult> + Send + Sync>;
pub type CancelHandler = Arc<dyn Fn() -> BoxFuture<'static, CommandResult> + Send + Sync>;
pub type CancelFn = Arc<dyn Fn() + Send + Sync>;

pub struct InteractivePrompt {
    pub input_type: InputType,
    pub message: String,
    pub options: Option<Vec<String>>,
    pub default: Option<String>,
    pub handler: PromptHandler,
    pub on_cancel: Option<CancelHandler>,
}

/// An in-flight async operation. The executor awaits at most one `pending`
/// result per command; cascading interactivity is modeled by the future
/// resolving to another `interactive` or `pending`.
pub struct PendingOperation {
    pub message: String,
    pub future: BoxFuture<'static, CommandResult>,
    pub show_progress: bool,
    pub cancel: Option<CancelFn>,
}

/// The sum type a command handler returns. Pattern-matching replaces a
/// runtime `kind` string check.
pub enum CommandResult {
    Success(SuccessPayload),
    Error(ErrorPayload),
    Interactive(InteractivePrompt),
    Pending(PendingOperation),
}

impl CommandResult {
    pub fn success(message: impl Into<String>) -> Self {
        CommandResult::Success(SuccessPayload {
            message: Some(message.into()),
            data: None,
            clear_screen: None,
            refresh: None,
        })
    }

    pub fn success_with_data(message: impl Into<String>, data: Value) -> Self {
        CommandResult::Success(SuccessPayload {
            message: Some(message.into()),
            data: Some(data),
            clear_screen: None,
            refresh: None,
        })
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        CommandResult::Error(ErrorPayload {
            code,
            message: message.into(),
            suggestions: Vec::new(),
            help_command: None,
        })
    }

    pub fn kind(&self) -> ResultKind {
        match self {
            CommandResult::Success(_) => ResultKind::Success,
            CommandResult::Error(_) => ResultKind::Error,
            CommandResult::Interactive(_) => ResultKind::Interactive,
            CommandResult::Pending(_) => ResultKind::Pending,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CommandResult::Success(_))
    }

    /// A lossy, serializable snapshot suitable for the NDJSON `result`
    /// event: the live continuation/future of `interactive`/`pending` is
    /// necessarily dropped in favor of their user-facing fields.
    pub fn to_projection(&self) -> ResultProjection {
        match self {
            CommandResult::Success(payload) => ResultProjection::Success(payload.clone()),
            CommandResult::Error(payload) => ResultProjection::Error(payload.clone()),
            CommandResult::Interactive(prompt) => {
                ResultProjection::Interactive(relay_protocol::InteractivePayload {
                    input_type: prompt.input_type,
                    message: prompt.message.clone(),
                    options: prompt.options.clone(),
                    default: prompt.default.clone(),
                })
            }
            CommandResult::Pending(op) => ResultProjection::Pending(relay_protocol::PendingPayload {
                message: op.message.clone(),
                show_progress: op.show_progress,
            }),
        }
    }
}

impl std::fmt::Debug for CommandResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandResult::Success(p) => f.debug_tuple("Success").field(p).finish(),
            CommandResult::Error(p) => f.debug_tuple("Error").field(p).finish(),
            CommandResult::Interactive(p) => f.debug_struct("Interactive").field("message", &p.message).finish(),
            CommandResult::Pending(p) => f.debug_struct("Pending").field("message", &p.message).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_kind_is_success() {
        let result = CommandResult::success("done");
        assert_eq!(result.kind(), ResultKind::Success);
        assert!(result.is_success());
    }

    #[test]
    fn error_projection_round_trips_code() {
        let result = CommandResult::error(ErrorCode::CommandNotFound, "nope");
        match result.to_projection() {
            ResultProjection::Error(p) => assert_eq!(p.code, ErrorCode::CommandNotFound),
            _ => panic!("expected error projection"),
        }
    }
}
