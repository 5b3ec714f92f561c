//! `relay`: a thin, one-shot shell around `relay_cli`'s `App` and the
//! executors/Auto-Manager `relay-core` exposes. See spec §6's note that
//! this binary is itself a concrete exercise of every interface there.

use clap::Parser;
use relay_cli::app::App;
use relay_cli::cli::Cli;
use relay_cli::cli::Command;
use relay_cli::cli::RegistryAction;
use relay_core::commands::execute_batch;
use relay_core::commands::execute_chain;
use relay_core::commands::BatchOptions;
use relay_core::commands::CommandResult;
use relay_core::logging::LogTimezone;
use relay_core::logging::LoggingConfig;
use relay_core::stream::NdjsonWriter;
use relay_protocol::ContextMessage;
use relay_protocol::ErrorCode;
use std::time::Instant;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    relay_core::logging::init(&LoggingConfig {
        level: if cli.debug { "debug".to_string() } else { "info".to_string() },
        location: cli.debug,
        target: cli.debug,
        timezone: LogTimezone::Local,
    });

    let mut app = App::new(cli.config.as_deref())?;
    let cwd = cli.cwd.canonicalize().unwrap_or(cli.cwd.clone());
    let session = app.session(cwd);

    let cancel = CancellationToken::new();
    let cancel_on_ctrlc = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_on_ctrlc.cancel();
        }
    });

    let exit_code = match cli.command {
        Command::Exec { input } => run_exec(&mut app, &input, session, cancel, cli.stream, cli.debug).await?,
        Command::Batch {
            script,
            continue_on_error,
            no_skip_comments,
        } => {
            run_batch(&mut app, &script, continue_on_error, no_skip_comments, session, cancel).await?
        }
        Command::Registry { action } => run_registry(&mut app, action),
        Command::Manage { messages, model, fail_models } => run_manage(&mut app, &messages, &model, fail_models, cancel).await?,
    };

    std::process::exit(exit_code);
}

/// Classifies a terminal [`CommandResult`] into a process exit code per
/// §6: `0` success, `2` invalid usage (parse/lookup/validation errors the
/// caller could fix by correcting its input), `1` everything else.
fn exit_code_for(result: &CommandResult) -> i32 {
    match result {
        CommandResult::Success(_) => 0,
        CommandResult::Error(payload) => match payload.code {
            ErrorCode::InvalidArgument
            | ErrorCode::MissingArgument
            | ErrorCode::ArgumentTypeError
            | ErrorCode::CommandNotFound
            | ErrorCode::CommandDisabled => 2,
            _ => 1,
        },
        // Reaching main's exit point mid-interaction/mid-flight is a bug
        // in the drive loop below, not a real outcome to classify.
        CommandResult::Interactive(_) | CommandResult::Pending(_) => 1,
    }
}

/// Drives a [`CommandResult`] to a terminal `Success`/`Error` by prompting
/// on stdin for `Interactive` results and awaiting `Pending` futures,
/// racing each against `cancel`. The core never blocks a thread on user
/// input itself (§5); this loop is the one piece of "UI" a one-shot CLI
/// has to supply to exercise that contract end to end.
async fn drive_to_terminal(mut result: CommandResult, cancel: &CancellationToken) -> CommandResult {
    loop {
        result = match result {
            CommandResult::Interactive(prompt) => {
                eprintln!("{}", prompt.message);
                if let Some(options) = &prompt.options {
                    eprintln!("options: {}", options.join(", "));
                }
                if let Some(default) = &prompt.default {
                    eprintln!("(default: {default})");
                }
                let mut stdin = BufReader::new(tokio::io::stdin());
                let mut line = String::new();
                match stdin.read_line(&mut line).await {
                    Ok(0) => {
                        if let Some(on_cancel) = prompt.on_cancel {
                            return on_cancel().await;
                        }
                        return CommandResult::error(ErrorCode::CommandAborted, "no input (EOF)");
                    }
                    Ok(_) => {
                        let answer = line.trim().to_string();
                        (prompt.handler)(answer).await
                    }
                    Err(err) => return CommandResult::error(ErrorCode::InternalError, format!("stdin read failed: {err}")),
                }
            }
            CommandResult::Pending(op) => {
                if op.show_progress {
                    eprintln!("{}", op.message);
                }
                tokio::select! {
                    next = op.future => next,
                    _ = cancel.cancelled() => {
                        if let Some(cancel_fn) = op.cancel {
                            cancel_fn();
                        }
                        return CommandResult::error(ErrorCode::CommandAborted, "operation cancelled");
                    }
                }
            }
            terminal => return terminal,
        };
    }
}

async fn run_exec(
    app: &mut App,
    input: &str,
    session: relay_core::commands::Session,
    cancel: CancellationToken,
    stream: bool,
    debug: bool,
) -> anyhow::Result<i32> {
    let start = Instant::now();

    let mut writer = stream.then(|| NdjsonWriter::new(std::io::stdout(), debug));
    if let Some(writer) = writer.as_mut() {
        writer.start(input.to_string(), None)?;
    }

    let outcome = execute_chain(input, &app.registry, &app.provider, session, cancel.clone()).await;
    let result = drive_to_terminal(outcome.result, &cancel).await;
    let code = exit_code_for(&result);

    match writer.as_mut() {
        Some(writer) => {
            if let CommandResult::Error(payload) = &result {
                writer.error(payload.code, payload.message.clone(), None)?;
            }
            writer.result(&result)?;
            writer.complete(code, start.elapsed())?;
        }
        None => print_result(&result),
    }
    Ok(code)
}

fn print_result(result: &CommandResult) {
    match result {
        CommandResult::Success(payload) => {
            if let Some(message) = &payload.message {
                println!("{message}");
            }
            if let Some(data) = &payload.data {
                println!("{data}");
            }
        }
        CommandResult::Error(payload) => {
            eprintln!("error[{}]: {}", payload.code, payload.message);
            for suggestion in &payload.suggestions {
                eprintln!("  did you mean {suggestion}?");
            }
            if let Some(help) = &payload.help_command {
                eprintln!("  see {help}");
            }
        }
        CommandResult::Interactive(_) | CommandResult::Pending(_) => {
            eprintln!("error[{}]: command did not reach a terminal result", ErrorCode::InternalError);
        }
    }
}

async fn run_batch(
    app: &mut App,
    script_path: &std::path::Path,
    continue_on_error: bool,
    no_skip_comments: bool,
    session: relay_core::commands::Session,
    cancel: CancellationToken,
) -> anyhow::Result<i32> {
    let script = std::fs::read_to_string(script_path)?;
    let options = BatchOptions {
        skip_comments: !no_skip_comments,
        continue_on_error,
    };

    let results = execute_batch(&script, &options, &app.registry, &app.provider, session, cancel).await;

    let mut exit_code = 0;
    for entry in &results {
        if entry.skipped {
            continue;
        }
        let Some(result) = &entry.result else { continue };
        println!("[{}] {}", entry.index, entry.command);
        print_result(result);
        if !result.is_success() {
            exit_code = exit_code_for(result).max(exit_code);
        }
    }
    Ok(exit_code)
}

fn run_registry(app: &mut App, action: RegistryAction) -> i32 {
    match action {
        RegistryAction::List { category } => {
            let signatures = match &category {
                Some(category) => app.registry.get_by_category(category),
                None => app.registry.list(),
            };
            let mut names: Vec<&str> = signatures.iter().map(|s| s.name.as_str()).collect();
            names.sort_unstable();
            for name in names {
                println!("{name}");
            }
            0
        }
        RegistryAction::Search { query } => {
            let mut matches = app.registry.search(&query);
            matches.sort_by(|a, b| a.name.cmp(&b.name));
            for signature in matches {
                println!("{} ({})", signature.name, signature.category);
            }
            0
        }
        RegistryAction::Get { name } => match app.registry.get(&name) {
            Some(signature) => {
                println!("{}", serde_json::to_string_pretty(signature).unwrap_or_default());
                0
            }
            None => {
                eprintln!("error[{}]: command '{name}' was not found", ErrorCode::CommandNotFound);
                2
            }
        },
        RegistryAction::Unregister { name } => {
            if app.registry.unregister(&name) {
                println!("unregistered '{name}'");
                0
            } else {
                eprintln!("error[{}]: command '{name}' was not found", ErrorCode::CommandNotFound);
                2
            }
        }
    }
}

async fn run_manage(
    app: &mut App,
    messages_path: &std::path::Path,
    model: &str,
    fail_models: Vec<String>,
    cancel: CancellationToken,
) -> anyhow::Result<i32> {
    let raw = std::fs::read_to_string(messages_path)?;
    let messages: Vec<ContextMessage> = serde_json::from_str(&raw)?;

    let report = app.manage(messages, model, fail_models, cancel).await;

    println!("state: {:?} -> {:?}", report.state_before, report.state_after);
    println!("tokens: {} -> {}", report.token_count_before, report.token_count_after);
    for action in &report.actions {
        println!("- {action}");
    }
    if let Some(checkpoint_id) = &report.checkpoint_id {
        println!("checkpoint: {checkpoint_id}");
    }

    let effective = relay_core::window::AutoManager::effective_api_history(&report.messages);
    println!("effective history: {} message(s)", effective.len());

    Ok(0)
}
