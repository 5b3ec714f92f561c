//! Lexical tokens produced by the command tokenizer.

use serde::Deserialize;
use serde::Serialize;

/// Classification of a lexical token in a slash-command input string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// The leading `/name` run.
    Command,
    /// A quoted or unquoted string literal.
    String,
    /// A `--long` or `-x` flag.
    Flag,
    /// An unquoted bare value.
    Value,
    /// A run of whitespace.
    Whitespace,
}

/// A single lexical token with its literal text and byte range in the
/// original input.
///
/// Tokens are immutable and only live for the duration of parsing: nothing
/// downstream of [`crate::command::ParsedCommand`] holds on to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Half-open byte range `[start, end)` into the original input.
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            start,
            end,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
