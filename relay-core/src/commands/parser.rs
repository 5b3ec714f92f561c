//! Command Parser (C3): turns a trimmed slash-command string into a
//! [`ParsedCommand`] or a [`ParseError`].

use super::tokenizer::tokenize;
use crate::error::ParseError;
use relay_protocol::ErrorCode;
use relay_protocol::ParsedCommand;
use relay_protocol::TokenKind;

/// Parses a single (non-chained, non-piped) command input string.
///
/// Trims the input, checks quote balance, tokenizes, drops whitespace, and
/// classifies the remaining tokens into a command name plus ordered
/// positionals and named arguments.
pub fn parse_command(input: &str) -> Result<ParsedCommand, ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.starts_with('/') {
        return Err(ParseError::new(
            ErrorCode::InvalidArgument,
            "command input must start with '/'",
        ));
    }

    check_quote_balance(trimmed)?;

    let tokens: Vec<_> = tokenize(trimmed)
        .into_iter()
        .filter(|t| t.kind != TokenKind::Whitespace)
        .collect();

    let Some(first) = tokens.first() else {
        return Err(ParseError::new(ErrorCode::InvalidArgument, "empty command"));
    };
    if first.kind != TokenKind::Command {
        return Err(ParseError::new(
            ErrorCode::InvalidArgument,
            "input must begin with a command",
        ));
    }
    if first.text.is_empty() {
        return Err(ParseError::new(ErrorCode::InvalidArgument, "command name is empty"));
    }

    let mut command = ParsedCommand::new(first.text.to_lowercase(), trimmed.to_string());

    let mut i = 1;
    while i < tokens.len() {
        let tok = &tokens[i];
        match tok.kind {
            TokenKind::Flag => {
                let name = tok.text.trim_start_matches('-').to_string();
                match tokens.get(i + 1) {
                    Some(next) if matches!(next.kind, TokenKind::Value | TokenKind::String) => {
                        command
                            .named
                            .insert(name, relay_protocol::NamedValue::Str(next.text.clone()));
                        i += 2;
                    }
                    _ => {
                        command.named.insert(name, relay_protocol::NamedValue::Bool(true));
                        i += 1;
                    }
                }
            }
            TokenKind::Value | TokenKind::String => {
                command.positionals.push(tok.text.clone());
                i += 1;
            }
            TokenKind::Command | TokenKind::Whitespace => {
                // A second `/name` run or stray whitespace token (the latter
                // already filtered out) is treated as an ordinary value.
                command.positionals.push(tok.text.clone());
                i += 1;
            }
        }
    }

    Ok(command)
}

/// Quote-balance pre-scan honoring `\` escapes inside `"` only. Reports
/// `INVALID_ARGUMENT` positioned at the opening quote on imbalance.
fn check_quote_balance(input: &str) -> Result<(), ParseError> {
    #[derive(PartialEq)]
    enum Mode {
        None,
        Double,
        Single,
    }

    let mut mode = Mode::None;
    let mut open_pos = 0usize;
    let mut chars = input.char_indices();

    while let Some((i, c)) = chars.next() {
        match mode {
            Mode::Double => {
                if c == '\\' {
                    chars.next();
                } else if c == '"' {
                    mode = Mode::None;
                }
            }
            Mode::Single => {
                if c == '\'' {
                    mode = Mode::None;
                }
            }
            Mode::None => match c {
                '"' => {
                    mode = Mode::Double;
                    open_pos = i;
                }
                '\'' => {
                    mode = Mode::Single;
                    open_pos = i;
                }
                _ => {}
            },
        }
    }

    if mode != Mode::None {
        return Err(ParseError::new(ErrorCode::InvalidArgument, "unterminated quote").at(open_pos));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_and_quotes() {
        let parsed = parse_command(r#"/login "my provider" --store keychain -v"#).unwrap();
        assert_eq!(parsed.name, "login");
        assert_eq!(parsed.positionals, vec!["my provider".to_string()]);
        assert_eq!(
            parsed.named.get("store").and_then(|v| v.as_str()),
            Some("keychain")
        );
        assert_eq!(parsed.named.get("v"), Some(&relay_protocol::NamedValue::Bool(true)));
    }

    #[test]
    fn empty_input_is_invalid() {
        assert!(parse_command("").is_err());
        assert!(parse_command("   ").is_err());
    }

    #[test]
    fn bare_slash_has_empty_command_name() {
        let err = parse_command("/").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);
    }

    #[test]
    fn missing_leading_slash_is_invalid() {
        let err = parse_command("login").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);
    }

    #[test]
    fn unterminated_double_quote_reports_opening_position() {
        let err = parse_command(r#"/login "oops"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);
        assert_eq!(err.position, Some(7));
    }

    #[test]
    fn unterminated_single_quote_reports_opening_position() {
        let err = parse_command("/login 'oops").unwrap_err();
        assert_eq!(err.position, Some(7));
    }

    #[test]
    fn command_name_is_lowercased() {
        let parsed = parse_command("/LogIn").unwrap();
        assert_eq!(parsed.name, "login");
    }

    #[test]
    fn trailing_flag_with_no_value_is_boolean() {
        let parsed = parse_command("/ship --dry-run").unwrap();
        assert_eq!(
            parsed.named.get("dry-run"),
            Some(&relay_protocol::NamedValue::Bool(true))
        );
    }
}
