//! Chained Executor (C10): runs `&&`/`||`/`;`-joined segments with
//! short-circuit semantics, delegating each segment to the Piped Executor
//! so a chain link may itself be a pipeline.

use super::chain::parse_chain;
use super::chain::ChainOperator;
use super::context::ContextProvider;
use super::context::Session;
use super::piped::execute_pipe;
use super::registry::CommandRegistry;
use super::result::CommandResult;
use relay_protocol::ErrorCode;
use relay_protocol::ErrorPayload;
use tokio_util::sync::CancellationToken;

/// A chain run's outcome: the last executed segment's result, plus which
/// segment indices actually ran (segments skipped by `||`/`&&`
/// short-circuiting are omitted), per §4.8.
#[derive(Debug)]
pub struct ChainOutcome {
    pub result: CommandResult,
    pub ran_indices: Vec<usize>,
}

/// Runs `input` as a chain of `&&`/`||`/`;`-joined segments, per §4.8:
/// `&&` runs only if the previous segment succeeded, `||` only if it
/// failed, and `;` always runs. Returns the last segment actually
/// executed plus the set of indices that ran.
pub async fn execute_chain(
    input: &str,
    registry: &CommandRegistry,
    provider: &dyn ContextProvider,
    session: Session,
    cancel: CancellationToken,
) -> ChainOutcome {
    let chained = parse_chain(input);

    let mut last_result: Option<CommandResult> = None;
    let mut ran_indices = Vec::new();
    // The operator gating segment `i` is carried by segment `i - 1` (it
    // describes the link from the previous segment to this one).
    let mut gating_operator: Option<ChainOperator> = None;

    for (index, segment) in chained.segments.iter().enumerate() {
        if cancel.is_cancelled() {
            return ChainOutcome {
                result: CommandResult::Error(ErrorPayload {
                    code: ErrorCode::CommandAborted,
                    message: "command aborted".to_string(),
                    suggestions: Vec::new(),
                    help_command: None,
                }),
                ran_indices,
            };
        }

        let should_run = match (&last_result, gating_operator) {
            (None, _) => true,
            (Some(prev), Some(ChainOperator::And)) => prev.is_success(),
            (Some(prev), Some(ChainOperator::Or)) => !prev.is_success(),
            (Some(_), Some(ChainOperator::Then)) | (Some(_), None) => true,
        };

        gating_operator = segment.operator;

        if !should_run {
            continue;
        }

        let result = execute_pipe(&segment.command, registry, provider, session.clone(), cancel.clone()).await;
        ran_indices.push(index);
        last_result = Some(result);
    }

    let result = last_result.unwrap_or_else(|| {
        CommandResult::Error(ErrorPayload {
            code: ErrorCode::InvalidArgument,
            message: "chain has no segments to execute".to_string(),
            suggestions: Vec::new(),
            help_command: None,
        })
    });
    ChainOutcome { result, ran_indices }
}
