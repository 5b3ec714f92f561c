//! Parsed command and command-signature value types.

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

/// A named argument's value: either a string or a bare boolean flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NamedValue {
    Str(String),
    Bool(bool),
}

impl NamedValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            NamedValue::Str(s) => Some(s),
            NamedValue::Bool(_) => None,
        }
    }
}

/// The output of the Command Parser (C3): a command name, its positional and
/// named arguments, and the untouched raw input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCommand {
    /// Lowercased, with any leading `/` stripped.
    pub name: String,
    pub positionals: Vec<String>,
    /// Preserves insertion order so validation error messages and
    /// introspection stay stable.
    pub named: IndexMap<String, NamedValue>,
    pub raw: String,
}

impl ParsedCommand {
    pub fn new(name: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            positionals: Vec::new(),
            named: IndexMap::new(),
            raw: raw.into(),
        }
    }
}

/// The kind a [`CommandSignature`] was registered under. Ordering here is
/// the kind-priority used by the registry: lower values win conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Builtin = 0,
    Plugin = 1,
    Mcp = 2,
    User = 3,
}

impl CommandKind {
    pub fn priority(self) -> u8 {
        self as u8
    }
}

/// A declared argument's type. `path` existence is the command's own
/// responsibility; the validator only checks it is a non-empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgType {
    String,
    Number,
    Boolean,
    Path,
}

/// One positional or named argument slot in a [`CommandSignature`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgSpec {
    pub name: String,
    pub arg_type: ArgType,
    pub required: bool,
    pub default: Option<String>,
}

impl ArgSpec {
    pub fn required(name: impl Into<String>, arg_type: ArgType) -> Self {
        Self {
            name: name.into(),
            arg_type,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, arg_type: ArgType, default: Option<&str>) -> Self {
        Self {
            name: name.into(),
            arg_type,
            required: false,
            default: default.map(str::to_string),
        }
    }
}

/// A single subcommand descriptor (e.g. `/skill install`, `/skill remove`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubcommandSpec {
    pub name: String,
    pub positionals: Vec<ArgSpec>,
    pub named: Vec<ArgSpec>,
}

/// Registration-time metadata for a command: name, kind, category, and
/// argument shape. Lives for the process lifetime once registered.
///
/// `category` is an open enum (a plain string) rather than a closed Rust
/// `enum` so plugin/MCP/user commands can introduce new categories without a
/// core code change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSignature {
    pub name: String,
    pub kind: CommandKind,
    pub category: String,
    pub positionals: Vec<ArgSpec>,
    pub named: Vec<ArgSpec>,
    pub aliases: Vec<String>,
    pub subcommands: Vec<SubcommandSpec>,
}

impl CommandSignature {
    pub fn new(name: impl Into<String>, kind: CommandKind, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            category: category.into(),
            positionals: Vec::new(),
            named: Vec::new(),
            aliases: Vec::new(),
            subcommands: Vec::new(),
        }
    }

    pub fn with_positional(mut self, spec: ArgSpec) -> Self {
        self.positionals.push(spec);
        self
    }

    pub fn with_named(mut self, spec: ArgSpec) -> Self {
        self.named.push(spec);
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }
}

/// A coerced, validated argument value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Str(String),
    Number(f64),
    Bool(bool),
}

impl ArgValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// The post-validation view a handler receives: positionals coerced to
/// their declared types (defaults filled in), named values as a
/// name-to-typed-value map, and the raw input preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedArgs {
    pub positionals: Vec<ArgValue>,
    pub named: IndexMap<String, ArgValue>,
    pub raw: String,
}

impl ParsedArgs {
    pub fn positional_str(&self, index: usize) -> Option<&str> {
        self.positionals.get(index).and_then(ArgValue::as_str)
    }

    pub fn named_str(&self, name: &str) -> Option<&str> {
        self.named.get(name).and_then(ArgValue::as_str)
    }
}
