//! Internal error types.
//!
//! Component boundaries return results, never unwind: these types exist to
//! carry enough structure to build an [`relay_protocol::ErrorPayload`] at
//! the executor boundary, not to propagate panics.

use relay_protocol::CommandKind;
use relay_protocol::ErrorCode;
use relay_protocol::ErrorPayload;

/// A parse/tokenize-level failure from the tokenizer, command parser, chain
/// parser, or pipe parser (C2-C5). Always local: never thrown, only
/// returned.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub code: ErrorCode,
    pub message: String,
    pub position: Option<usize>,
}

impl ParseError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            position: None,
        }
    }

    pub fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}

/// Errors surfaced by command execution (C9-C12): lookup, validation, or a
/// trapped handler panic.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CoreError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("{message}")]
    Lookup {
        code: ErrorCode,
        message: String,
        suggestions: Vec<String>,
        help_command: Option<String>,
    },

    #[error("{message}")]
    Validation {
        code: ErrorCode,
        message: String,
        help_command: Option<String>,
    },

    #[error("command aborted")]
    Aborted,

    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn into_payload(self) -> ErrorPayload {
        match self {
            CoreError::Parse(e) => ErrorPayload {
                code: e.code,
                message: e.message,
                suggestions: Vec::new(),
                help_command: None,
            },
            CoreError::Lookup {
                code,
                message,
                suggestions,
                help_command,
            } => ErrorPayload {
                code,
                message,
                suggestions,
                help_command,
            },
            CoreError::Validation {
                code,
                message,
                help_command,
            } => ErrorPayload {
                code,
                message,
                suggestions: Vec::new(),
                help_command,
            },
            CoreError::Aborted => ErrorPayload {
                code: ErrorCode::CommandAborted,
                message: "command aborted".to_string(),
                suggestions: Vec::new(),
                help_command: None,
            },
            CoreError::Internal(message) => ErrorPayload {
                code: ErrorCode::InternalError,
                message,
                suggestions: Vec::new(),
                help_command: None,
            },
        }
    }
}

/// Failures from the Command Registry (C6): only raised when two signatures
/// of equal kind-priority claim the same name.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    #[error("command '{name}' is already registered at priority {priority:?}; incoming registration has the same priority")]
    Conflict { name: String, priority: CommandKind },
}

/// Raised by the Sliding-Window Truncator (C16) when the budget cannot be
/// met without removing a SYSTEM or ANCHOR message, or splitting a tool
/// pair — the Auto-Manager escalates to summarization on this signal.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TruncateError {
    #[error("cannot meet token budget while preserving tool-pair/system/anchor invariants")]
    OverflowUnrecoverable,
}

/// Failures specific to the Summarizer (C18). All cause the Auto-Manager to
/// roll back to the pre-compression checkpoint.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompactionError {
    #[error("summary grew to {resulting_tokens} tokens from {original_tokens} (ratio {ratio:.2})")]
    ContextGrowth {
        original_tokens: usize,
        resulting_tokens: usize,
        ratio: f64,
    },

    #[error("all {attempted_models} model(s) failed after {total_attempts} attempt(s)")]
    AllModelsFailed {
        attempted_models: usize,
        total_attempts: usize,
        attempt_history: Vec<crate::window::summarize::AttemptRecord>,
    },

    #[error("invalid summary: {0}")]
    InvalidSummary(String),

    #[error("no token budget available for summarization")]
    NoTokenBudget,

    #[error("range has fewer than the minimum required messages")]
    MinMessagesNotMet,

    #[error("summarization aborted")]
    Aborted,
}
