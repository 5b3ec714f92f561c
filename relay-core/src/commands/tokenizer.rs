//! Byte-level tokenizer (C2): lexes a command-input string into typed
//! tokens. Never fails; an unrecognized character flows into a `value`
//! token, and an unterminated quote simply consumes to end of input (it is
//! the parser's job to turn that into an `INVALID_ARGUMENT`).

use relay_protocol::Token;
use relay_protocol::TokenKind;

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// `input` indexed by character with byte offsets, so every token range is
/// still expressed in bytes (as the spec's data model requires) while the
/// lexer itself never splits a multi-byte character.
struct Cursor<'a> {
    input: &'a str,
    chars: Vec<(usize, char)>,
    idx: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().collect(),
            idx: 0,
        }
    }

    fn byte_pos(&self) -> usize {
        self.chars.get(self.idx).map_or(self.input.len(), |(b, _)| *b)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).map(|(_, c)| *c)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.idx + offset).map(|(_, c)| *c)
    }

    fn at_end(&self) -> bool {
        self.idx >= self.chars.len()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.idx += 1;
        }
        c
    }
}

/// Tokenizes `input` into an ordered, contiguous, non-overlapping sequence
/// of tokens covering every byte exactly once.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut cur = Cursor::new(input);
    let mut tokens = Vec::new();

    // Leading `/` is optional: if present, the first non-slash run becomes
    // a command token whose range starts at 0 (covering the slash) but
    // whose text has the slash stripped.
    if cur.peek() == Some('/') {
        let start = cur.byte_pos();
        cur.advance();
        let text_start = cur.byte_pos();
        while let Some(c) = cur.peek() {
            if is_whitespace(c) || c == '"' || c == '\'' {
                break;
            }
            cur.advance();
        }
        let end = cur.byte_pos();
        tokens.push(Token::new(
            TokenKind::Command,
            &input[text_start..end],
            start,
            end,
        ));
    }

    while !cur.at_end() {
        let c = cur.peek().expect("loop guarded by at_end");
        if is_whitespace(c) {
            let start = cur.byte_pos();
            while cur.peek().is_some_and(is_whitespace) {
                cur.advance();
            }
            let end = cur.byte_pos();
            tokens.push(Token::new(TokenKind::Whitespace, &input[start..end], start, end));
        } else if c == '"' {
            tokens.push(lex_double_quoted(&mut cur, input));
        } else if c == '\'' {
            tokens.push(lex_single_quoted(&mut cur, input));
        } else if c == '-' && cur.peek_at(1) == Some('-') {
            tokens.push(lex_long_flag(&mut cur, input));
        } else if c == '-' && is_short_flag_start(&cur) {
            tokens.push(lex_short_flag(&mut cur, input));
        } else {
            tokens.push(lex_value(&mut cur, input));
        }
    }

    tokens
}

fn is_short_flag_start(cur: &Cursor<'_>) -> bool {
    match cur.peek_at(1) {
        Some(next) => !is_whitespace(next) && next != '"' && next != '\'' && next != '-',
        None => false,
    }
}

fn lex_long_flag(cur: &mut Cursor<'_>, input: &str) -> Token {
    let start = cur.byte_pos();
    cur.advance(); // '-'
    cur.advance(); // '-'
    while let Some(c) = cur.peek() {
        if is_whitespace(c) || c == '=' || c == '"' || c == '\'' {
            break;
        }
        cur.advance();
    }
    let mut end = cur.byte_pos();
    // `=` is consumed as part of the flag token (not emitted as its own
    // token), per the tokenizer's "consume `=`" rule.
    if cur.peek() == Some('=') {
        cur.advance();
        end = cur.byte_pos();
        return Token::new(TokenKind::Flag, &input[start..end - 1], start, end);
    }
    Token::new(TokenKind::Flag, &input[start..end], start, end)
}

fn lex_short_flag(cur: &mut Cursor<'_>, input: &str) -> Token {
    let start = cur.byte_pos();
    cur.advance(); // '-'
    cur.advance(); // exactly one following character
    let end = cur.byte_pos();
    Token::new(TokenKind::Flag, &input[start..end], start, end)
}

fn lex_value(cur: &mut Cursor<'_>, input: &str) -> Token {
    let start = cur.byte_pos();
    while let Some(c) = cur.peek() {
        if is_whitespace(c) || c == '"' || c == '\'' {
            break;
        }
        cur.advance();
    }
    let end = cur.byte_pos();
    Token::new(TokenKind::Value, &input[start..end], start, end)
}

fn lex_double_quoted(cur: &mut Cursor<'_>, input: &str) -> Token {
    let start = cur.byte_pos();
    cur.advance(); // opening quote
    let mut text = String::new();
    loop {
        match cur.peek() {
            None => break,
            Some('"') => {
                cur.advance();
                break;
            }
            Some('\\') => {
                cur.advance();
                match cur.peek() {
                    Some('n') => {
                        text.push('\n');
                        cur.advance();
                    }
                    Some('t') => {
                        text.push('\t');
                        cur.advance();
                    }
                    Some('\\') => {
                        text.push('\\');
                        cur.advance();
                    }
                    Some('"') => {
                        text.push('"');
                        cur.advance();
                    }
                    Some(other) => {
                        // Unknown escape: keep the backslash literal.
                        text.push('\\');
                        text.push(other);
                        cur.advance();
                    }
                    None => text.push('\\'),
                }
            }
            Some(c) => {
                text.push(c);
                cur.advance();
            }
        }
    }
    let end = cur.byte_pos();
    let _ = input;
    Token::new(TokenKind::String, text, start, end)
}

fn lex_single_quoted(cur: &mut Cursor<'_>, input: &str) -> Token {
    let start = cur.byte_pos();
    cur.advance(); // opening quote
    let mut text = String::new();
    loop {
        match cur.peek() {
            None => break,
            Some('\'') => {
                cur.advance();
                break;
            }
            Some(c) => {
                text.push(c);
                cur.advance();
            }
        }
    }
    let end = cur.byte_pos();
    let _ = input;
    Token::new(TokenKind::String, text, start, end)
}

/// Verifies the tokenizer's core contiguity invariant for a given input:
/// tokens are contiguous, non-overlapping, and cover `[0, input.len())`
/// exactly.
pub fn covers_input_exactly(input: &str, tokens: &[Token]) -> bool {
    let mut pos = 0usize;
    for tok in tokens {
        if tok.start != pos {
            return false;
        }
        pos = tok.end;
    }
    pos == input.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contiguous_coverage_on_varied_input() {
        let cases = [
            "/login \"my provider\" --store keychain -v",
            "",
            "   ",
            "/",
            "/build && /test || /rollback",
            "/list | /filter foo > out.txt",
            "--name=value",
            "-xvalue",
        ];
        for input in cases {
            let tokens = tokenize(input);
            assert!(covers_input_exactly(input, &tokens), "input: {input:?}");
        }
    }

    #[test]
    fn leading_slash_becomes_command_token_with_slash_stripped() {
        let tokens = tokenize("/login foo");
        assert_eq!(tokens[0].kind, TokenKind::Command);
        assert_eq!(tokens[0].text, "login");
        assert_eq!(tokens[0].start, 0);
        assert_eq!(tokens[0].end, 6);
    }

    #[test]
    fn long_flag_with_equals_consumes_equals_and_splits_value() {
        let tokens = tokenize("--name=value");
        assert_eq!(tokens[0].kind, TokenKind::Flag);
        assert_eq!(tokens[0].text, "--name");
        assert_eq!(tokens[1].kind, TokenKind::Value);
        assert_eq!(tokens[1].text, "value");
    }

    #[test]
    fn short_flag_then_trailing_value() {
        let tokens = tokenize("-xvalue");
        assert_eq!(tokens[0].kind, TokenKind::Flag);
        assert_eq!(tokens[0].text, "-x");
        assert_eq!(tokens[1].kind, TokenKind::Value);
        assert_eq!(tokens[1].text, "value");
    }

    #[test]
    fn double_quote_escapes() {
        let tokens = tokenize(r#""a\nb\t\\\"c""#);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, "a\nb\t\\\"c");
    }

    #[test]
    fn double_quote_unknown_escape_keeps_backslash() {
        let tokens = tokenize(r#""a\xb""#);
        assert_eq!(tokens[0].text, "a\\xb");
    }

    #[test]
    fn single_quote_has_no_escapes() {
        let tokens = tokenize(r"'a\nb'");
        assert_eq!(tokens[0].text, r"a\nb");
    }

    #[test]
    fn unterminated_double_quote_consumes_to_end() {
        let tokens = tokenize("\"abc");
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, "abc");
        assert_eq!(tokens[0].end, 4);
    }

    #[test]
    fn whitespace_runs_coalesce() {
        let tokens = tokenize("a   b");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].kind, TokenKind::Whitespace);
        assert_eq!(tokens[1].text, "   ");
    }
}
