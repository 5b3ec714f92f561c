//! Builtin command handlers: `help`, `history`, `login`, `logout`, `list`.
//!
//! This is the exact command set spec §8 scenario 2 exercises against the
//! registry (`{help, history, login, logout, list}`); registering them here
//! gives the CLI a real, if small, command surface to drive end to end
//! instead of only running against an empty registry in tests.

use futures::future::BoxFuture;
use relay_core::commands::CommandContext;
use relay_core::commands::CommandHandler;
use relay_core::commands::CommandRegistry;
use relay_core::commands::CommandResult;
use relay_core::error::RegistryError;
use relay_protocol::ArgSpec;
use relay_protocol::ArgType;
use relay_protocol::CommandKind;
use relay_protocol::CommandSignature;
use serde_json::json;
use std::sync::Arc;

fn handler(f: impl Fn(CommandContext) -> BoxFuture<'static, CommandResult> + Send + Sync + 'static) -> Arc<dyn CommandHandler> {
    Arc::new(f)
}

fn help_signature() -> CommandSignature {
    CommandSignature::new("help", CommandKind::Builtin, "system")
        .with_positional(ArgSpec::optional("command", ArgType::String, None))
        .with_alias("h")
}

fn help_handler(ctx: CommandContext) -> BoxFuture<'static, CommandResult> {
    Box::pin(async move {
        match ctx.args.positional_str(0) {
            Some(name) => CommandResult::success(format!(
                "/{name}: see its registration for positional/named argument details"
            )),
            None => CommandResult::success(
                "available commands: /help [command], /history, /login <provider> [--store <name>] [-v], \
                 /logout [provider], /list [--category <name>]",
            ),
        }
    })
}

fn history_signature() -> CommandSignature {
    CommandSignature::new("history", CommandKind::Builtin, "session").with_alias("hist")
}

fn history_handler(_ctx: CommandContext) -> BoxFuture<'static, CommandResult> {
    Box::pin(async move {
        // Session persistence is out of scope (spec §1): there is no
        // backing history store for a one-shot invocation to read from.
        CommandResult::success("this session has no persisted history")
    })
}

fn login_signature() -> CommandSignature {
    CommandSignature::new("login", CommandKind::Builtin, "auth")
        .with_positional(ArgSpec::required("provider", ArgType::String))
        .with_named(ArgSpec::optional("store", ArgType::String, None))
        .with_named(ArgSpec::optional("verbose", ArgType::Boolean, Some("false")))
}

fn login_handler(ctx: CommandContext) -> BoxFuture<'static, CommandResult> {
    Box::pin(async move {
        let Some(provider) = ctx.args.positional_str(0) else {
            return CommandResult::error(relay_protocol::ErrorCode::MissingArgument, "provider is required");
        };
        let store = ctx.args.named_str("store").unwrap_or("default");
        // Credential storage is out of scope (spec §1): `ctx.credentials`
        // is an opaque handle passed through, never read by the core.
        let _ = &ctx.credentials;
        CommandResult::success_with_data(
            format!("logged in to '{provider}' (store: {store})"),
            json!({ "provider": provider, "store": store }),
        )
    })
}

fn logout_signature() -> CommandSignature {
    CommandSignature::new("logout", CommandKind::Builtin, "auth")
        .with_positional(ArgSpec::optional("provider", ArgType::String, None))
}

fn logout_handler(ctx: CommandContext) -> BoxFuture<'static, CommandResult> {
    Box::pin(async move {
        match ctx.args.positional_str(0) {
            Some(provider) => CommandResult::success(format!("logged out of '{provider}'")),
            None => CommandResult::success("logged out of all providers"),
        }
    })
}

fn list_signature() -> CommandSignature {
    CommandSignature::new("list", CommandKind::Builtin, "system")
        .with_named(ArgSpec::optional("category", ArgType::String, None))
}

/// `list` reports the builtin command set registered ahead of it, plus
/// itself. It is a startup-time snapshot rather than a live view of the
/// registry (which would need a handle to a registry that, at the moment
/// `list` itself is registered, does not yet contain `list`): `relay`'s
/// top-level `registry` subcommand (`main.rs`) is the live, always-current
/// equivalent of this same §6 `list`/`get_by_category` interface.
fn list_handler(signatures: Vec<CommandSignature>) -> Arc<dyn CommandHandler> {
    handler(move |ctx: CommandContext| {
        let signatures = signatures.clone();
        Box::pin(async move {
            let names: Vec<String> = match ctx.args.named_str("category") {
                Some(category) => signatures.iter().filter(|s| s.category == category).map(|s| s.name.clone()).collect(),
                None => {
                    let mut names: Vec<String> = signatures.iter().map(|s| s.name.clone()).collect();
                    names.sort();
                    names
                }
            };
            CommandResult::success_with_data(format!("{} command(s) registered", names.len()), json!({ "commands": names }))
        })
    })
}

/// Registers the builtin `{help, history, login, logout, list}` command
/// set. Called once at startup, before the registry starts serving (§5).
pub fn register_builtins(registry: &mut CommandRegistry) -> Result<(), RegistryError> {
    registry.register(help_signature(), handler(help_handler))?;
    registry.register(history_signature(), handler(history_handler))?;
    registry.register(login_signature(), handler(login_handler))?;
    registry.register(logout_signature(), handler(logout_handler))?;

    let mut signatures: Vec<CommandSignature> = registry.list().into_iter().cloned().collect();
    signatures.push(list_signature());
    registry.register(list_signature(), list_handler(signatures))
}
