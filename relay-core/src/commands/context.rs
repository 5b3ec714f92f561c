//! `CommandContext` (C9): the read-only record handed to a command handler.

use super::result::CommandResult;
use crate::capability::CredentialManager;
use crate::capability::EventEmitter;
use crate::capability::FileSink;
use crate::capability::SkillManager;
use crate::capability::ToolRegistryHandle;
use futures::future::BoxFuture;
use relay_protocol::ParsedArgs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The session identity a command runs under.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub provider: String,
    pub cwd: PathBuf,
}

/// Read-only context given to a handler: session identity, validated args,
/// a cooperative cancellation token, an event emitter, and the three
/// opaque capability handles named in §6.
#[derive(Clone)]
pub struct CommandContext {
    pub session: Session,
    pub args: ParsedArgs,
    pub cancel: CancellationToken,
    pub events: Arc<dyn EventEmitter>,
    pub credentials: Arc<dyn CredentialManager>,
    pub tools: Arc<dyn ToolRegistryHandle>,
    pub skills: Arc<dyn SkillManager>,
}

impl CommandContext {
    /// `true` once cancellation has been requested; handlers performing
    /// long work must observe this.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Resolves the capability handles a [`CommandContext`] is built from.
/// Implemented once by `relay-cli`'s app-construction code; the executor
/// only ever holds `Arc<dyn ContextProvider>`.
pub trait ContextProvider: Send + Sync {
    fn credentials(&self) -> Arc<dyn CredentialManager>;
    fn tools(&self) -> Arc<dyn ToolRegistryHandle>;
    fn skills(&self) -> Arc<dyn SkillManager>;
    fn events(&self) -> Arc<dyn EventEmitter>;
    /// `None` when no redirect target backend is wired up; the Piped
    /// Executor turns that into `INTERNAL_ERROR` only if a command in the
    /// pipeline actually requests a `>`/`>>` redirect.
    fn file_sink(&self) -> Option<Arc<dyn FileSink>> {
        None
    }
}

/// A registered command's implementation. Returns a boxed future rather
/// than being an `async_trait` method so a handler can be built from a
/// plain closure by callers that don't want to define a type.
pub trait CommandHandler: Send + Sync {
    fn invoke(&self, ctx: CommandContext) -> BoxFuture<'static, CommandResult>;
}

impl<F> CommandHandler for F
where
    F: Fn(CommandContext) -> BoxFuture<'static, CommandResult> + Send + Sync,
{
    fn invoke(&self, ctx: CommandContext) -> BoxFuture<'static, CommandResult> {
        self(ctx)
    }
}
