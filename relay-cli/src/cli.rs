//! Command-line surface: global flags shared by every subcommand, plus one
//! subcommand per `relay-core` entry point §6 asks `relay-cli`'s `main.rs`
//! to exercise.

use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "relay", about = "A slash-command engine and context-window manager, one shot at a time")]
pub struct Cli {
    /// Path to a `relay.toml` config file. Defaults applied when absent.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Working directory the session is rooted at.
    #[arg(long, global = true, default_value = ".")]
    pub cwd: PathBuf,

    /// Emit NDJSON events on stdout instead of plain text.
    #[arg(long, global = true)]
    pub stream: bool,

    /// Verbose logging, and include stack traces in NDJSON `error` events.
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run one input through the Chained Executor (`&&`, `||`, `;`, `|`).
    Exec {
        /// A command, e.g. `/login "my provider" --store keychain -v`.
        input: String,
    },
    /// Run a newline-delimited script through the Batch Runner.
    Batch {
        /// Path to a script file, one command per line.
        script: PathBuf,
        /// Keep running past a failing line instead of stopping on it.
        #[arg(long)]
        continue_on_error: bool,
        /// Execute blank/`#`-prefixed lines instead of skipping them.
        #[arg(long)]
        no_skip_comments: bool,
    },
    /// Introspect the command registry.
    Registry {
        #[command(subcommand)]
        action: RegistryAction,
    },
    /// Run one Auto-Manager pass over a JSON array of messages.
    Manage {
        /// Path to a JSON file holding a `ContextMessage[]`.
        messages: PathBuf,
        /// Model name; resolves the token budget and threshold profile.
        #[arg(long, default_value = "claude-sonnet-4")]
        model: String,
        /// Model names the demo `ModelClientFactory` should always fail,
        /// to exercise the Fallback Chain's retry path.
        #[arg(long = "fail-model")]
        fail_models: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum RegistryAction {
    /// List every registered command, optionally filtered by category.
    List {
        #[arg(long)]
        category: Option<String>,
    },
    /// Case-insensitive substring search over registered command names.
    Search { query: String },
    /// Look up one command's signature.
    Get { name: String },
    /// Remove a command (and its aliases) from the registry.
    Unregister { name: String },
}
