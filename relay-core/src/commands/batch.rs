//! Batch Runner (C12): executes a newline-delimited script of commands,
//! one per line, optionally skipping comment/blank lines.

use super::chained::execute_chain;
use super::context::ContextProvider;
use super::context::Session;
use super::result::CommandResult;
use relay_protocol::ErrorCode;
use relay_protocol::ErrorPayload;
use tokio_util::sync::CancellationToken;

/// One line's outcome in a batch run.
pub struct BatchCommandResult {
    pub command: String,
    pub index: usize,
    pub result: Option<CommandResult>,
    pub skipped: bool,
}

/// Batch-wide execution policy.
pub struct BatchOptions {
    /// Blank lines and lines starting with `#` are recorded as `skipped`
    /// rather than executed. Default `true`.
    pub skip_comments: bool,
    /// When `false` (the default), the first failing line stops the batch;
    /// subsequent lines are not run.
    pub continue_on_error: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            skip_comments: true,
            continue_on_error: false,
        }
    }
}

/// Splits `script` on `\r?\n` and runs each non-skipped line through the
/// Chained Executor in order. Stops early on cancellation or, unless
/// `continue_on_error`, on the first failing line.
pub async fn execute_batch(
    script: &str,
    options: &BatchOptions,
    registry: &super::registry::CommandRegistry,
    provider: &dyn ContextProvider,
    session: Session,
    cancel: CancellationToken,
) -> Vec<BatchCommandResult> {
    let mut out = Vec::new();

    for (index, raw_line) in script.lines().enumerate() {
        let trimmed = raw_line.trim();

        if options.skip_comments && (trimmed.is_empty() || trimmed.starts_with('#')) {
            out.push(BatchCommandResult {
                command: raw_line.to_string(),
                index,
                result: None,
                skipped: true,
            });
            continue;
        }

        if cancel.is_cancelled() {
            out.push(BatchCommandResult {
                command: raw_line.to_string(),
                index,
                result: Some(CommandResult::Error(ErrorPayload {
                    code: ErrorCode::CommandAborted,
                    message: "batch aborted".to_string(),
                    suggestions: Vec::new(),
                    help_command: None,
                })),
                skipped: false,
            });
            break;
        }

        let outcome = execute_chain(trimmed, registry, provider, session.clone(), cancel.clone()).await;
        let result = outcome.result;
        let failed = !result.is_success();
        out.push(BatchCommandResult {
            command: raw_line.to_string(),
            index,
            result: Some(result),
            skipped: false,
        });

        if failed && !options.continue_on_error {
            break;
        }
    }

    out
}
