//! Argument Validator (C7): type-coerces and validates a [`ParsedCommand`]
//! against a [`CommandSignature`]'s positional/named arg specs.

use crate::error::CoreError;
use indexmap::IndexMap;
use relay_protocol::ArgSpec;
use relay_protocol::ArgType;
use relay_protocol::ArgValue;
use relay_protocol::CommandSignature;
use relay_protocol::ErrorCode;
use relay_protocol::NamedValue;
use relay_protocol::ParsedArgs;
use relay_protocol::ParsedCommand;

pub fn validate(parsed: &ParsedCommand, signature: &CommandSignature) -> Result<ParsedArgs, CoreError> {
    let mut positionals = Vec::with_capacity(signature.positionals.len());

    for spec in &signature.positionals {
        let index = positionals.len();
        match parsed.positionals.get(index) {
            Some(raw) => positionals.push(coerce_str(raw, spec)?),
            None => match &spec.default {
                Some(default) => positionals.push(coerce_str(default, spec)?),
                None if spec.required => return Err(missing_argument(&spec.name)),
                None => {}
            },
        }
    }

    if parsed.positionals.len() > signature.positionals.len() {
        for raw in &parsed.positionals[signature.positionals.len()..] {
            positionals.push(ArgValue::Str(raw.clone()));
        }
    }

    let mut named = IndexMap::new();
    let mut consumed_keys: Vec<String> = Vec::new();

    for spec in &signature.named {
        let shorthand = spec.name.chars().next().map(|c| c.to_string());
        let matched_key = if parsed.named.contains_key(&spec.name) {
            Some(spec.name.clone())
        } else {
            shorthand.filter(|sh| parsed.named.contains_key(sh))
        };

        match matched_key {
            Some(key) => {
                let raw = &parsed.named[&key];
                named.insert(spec.name.clone(), coerce_named(raw, spec)?);
                consumed_keys.push(key);
            }
            None => match &spec.default {
                Some(default) => {
                    named.insert(spec.name.clone(), coerce_str(default, spec)?);
                }
                None if spec.required => return Err(missing_argument(&spec.name)),
                None => {}
            },
        }
    }

    for (key, value) in &parsed.named {
        if consumed_keys.contains(key) || named.contains_key(key) {
            continue;
        }
        let passthrough = match value {
            NamedValue::Str(s) => ArgValue::Str(s.clone()),
            NamedValue::Bool(b) => ArgValue::Bool(*b),
        };
        named.insert(key.clone(), passthrough);
    }

    Ok(ParsedArgs {
        positionals,
        named,
        raw: parsed.raw.clone(),
    })
}

fn coerce_str(raw: &str, spec: &ArgSpec) -> Result<ArgValue, CoreError> {
    match spec.arg_type {
        ArgType::String => Ok(ArgValue::Str(raw.to_string())),
        ArgType::Path => {
            if raw.is_empty() {
                Err(type_error(&spec.name))
            } else {
                Ok(ArgValue::Str(raw.to_string()))
            }
        }
        ArgType::Number => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(ArgValue::Number)
            .ok_or_else(|| type_error(&spec.name)),
        ArgType::Boolean => match raw.to_lowercase().as_str() {
            "true" | "1" => Ok(ArgValue::Bool(true)),
            "false" | "0" => Ok(ArgValue::Bool(false)),
            _ => Err(type_error(&spec.name)),
        },
    }
}

fn coerce_named(raw: &NamedValue, spec: &ArgSpec) -> Result<ArgValue, CoreError> {
    match (raw, spec.arg_type) {
        (NamedValue::Bool(b), ArgType::Boolean) => Ok(ArgValue::Bool(*b)),
        (NamedValue::Bool(_), _) => Err(type_error(&spec.name)),
        (NamedValue::Str(s), _) => coerce_str(s, spec),
    }
}

fn missing_argument(name: &str) -> CoreError {
    CoreError::Validation {
        code: ErrorCode::MissingArgument,
        message: format!("missing required argument '{name}'"),
        help_command: None,
    }
}

fn type_error(name: &str) -> CoreError {
    CoreError::Validation {
        code: ErrorCode::ArgumentTypeError,
        message: format!("argument '{name}' has an invalid value for its declared type"),
        help_command: None,
    }
}
