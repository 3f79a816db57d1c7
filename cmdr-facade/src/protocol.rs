//! Usage patterns and line tokenization.

use cmdr_common::error::{CmdrError, CmdrResult};

/// One parameter of a usage pattern such as `[target] <reason...>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageParam {
    /// Parameter name.
    pub name: String,
    /// Whether the pattern brackets it as `[name]`.
    pub optional: bool,
    /// Whether it receives the remainder of the line.
    pub rest_of_line: bool,
}

/// Parses a usage pattern into its parameters.
///
/// `<name>` is required, `[name]` is optional, and a trailing `...` inside the brackets marks the
/// final parameter as rest-of-line. An empty pattern has no parameters.
///
/// # Errors
///
/// Returns `CmdrError::Substrate` for unbracketed words, empty names, or a rest-of-line
/// parameter that is not last.
pub fn parse_usage(pattern: &str) -> CmdrResult<Vec<UsageParam>> {
    let words = pattern.split_whitespace().collect::<Vec<_>>();
    let mut params = Vec::with_capacity(words.len());
    for (index, word) in words.iter().enumerate() {
        let (inner, optional) = if let Some(inner) = word
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
        {
            (inner, false)
        } else if let Some(inner) = word
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            (inner, true)
        } else {
            return Err(CmdrError::Substrate(format!(
                "malformed usage parameter {word} in \"{pattern}\""
            )));
        };
        let (name, rest_of_line) = match inner.strip_suffix("...") {
            Some(name) => (name, true),
            None => (inner, false),
        };
        if name.is_empty() {
            return Err(CmdrError::Substrate(format!(
                "empty usage parameter in \"{pattern}\""
            )));
        }
        if rest_of_line && index + 1 != words.len() {
            return Err(CmdrError::Substrate(format!(
                "rest-of-line parameter {name} must be last in \"{pattern}\""
            )));
        }
        params.push(UsageParam {
            name: name.to_owned(),
            optional,
            rest_of_line,
        });
    }
    Ok(params)
}

/// Input line carried more tokens than the usage pattern accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooManyArguments;

/// Splits the argument part of a line into one token per parameter.
///
/// Tokens are separated by whitespace; a rest-of-line parameter takes the remaining text,
/// trimmed, as one token. Fewer tokens than parameters is accepted.
///
/// # Errors
///
/// Returns `TooManyArguments` when text is left after every parameter received a token.
pub fn split_arguments(params: &[UsageParam], text: &str) -> Result<Vec<String>, TooManyArguments> {
    let mut rest = text.trim_start();
    let mut tokens = Vec::with_capacity(params.len());
    for param in params {
        if rest.is_empty() {
            break;
        }
        if param.rest_of_line {
            tokens.push(rest.trim_end().to_owned());
            rest = "";
            break;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        tokens.push(rest[..end].to_owned());
        rest = rest[end..].trim_start();
    }
    if rest.is_empty() {
        Ok(tokens)
    } else {
        Err(TooManyArguments)
    }
}
