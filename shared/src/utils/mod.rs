//! Utility functions and helpers

pub mod time;

use crate::error::ParseError;

/// Parse a byte size string (e.g., "512", "64KB", "4MB", "1GB")
pub fn parse_size(s: &str) -> Result<usize, ParseError> {
    let trimmed = s.trim();
    let upper = trimmed.to_uppercase();

    let (num_str, multiplier) = if let Some(num) = upper.strip_suffix("GB") {
        (num, 1usize << 30)
    } else if let Some(num) = upper.strip_suffix("MB") {
        (num, 1usize << 20)
    } else if let Some(num) = upper.strip_suffix("KB") {
        (num, 1usize << 10)
    } else if let Some(num) = upper.strip_suffix('B') {
        (num, 1)
    } else {
        // Default to bytes if no suffix
        (upper.as_str(), 1)
    };

    let value: usize = num_str
        .trim()
        .parse()
        .map_err(|_| ParseError::InvalidSize(trimmed.to_string()))?;
    value
        .checked_mul(multiplier)
        .ok_or_else(|| ParseError::InvalidSize(trimmed.to_string()))
}

/// Split a `--key=value` (or bare `--flag`) command line token.
///
/// A flag yields an empty value.
pub fn parse_key_value_argument(argument: &str) -> Result<(String, String), ParseError> {
    let body = argument
        .strip_prefix("--")
        .filter(|rest| !rest.is_empty())
        .ok_or_else(|| ParseError::MalformedArgument(argument.to_string()))?;

    match body.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        Some(_) => Err(ParseError::MalformedArgument(argument.to_string())),
        None => Ok((body.to_string(), String::new())),
    }
}

/// Strip a leading `!` from a filter, reporting whether it was negated
pub fn split_filter_negation(filter: &str) -> (&str, bool) {
    match filter.strip_prefix('!') {
        Some(rest) => (rest, true),
        None => (filter, false),
    }
}
