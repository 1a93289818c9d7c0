//! Parse errors for the shared enums and helpers

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown api: {0}")]
    UnknownApi(String),

    #[error("unknown device selection: {0}")]
    UnknownDeviceSelection(String),

    #[error("invalid blitter index: {0}")]
    InvalidBlitterIndex(usize),

    #[error("invalid bitmask: {0} (expected binary digits, at most {1} of them)")]
    InvalidBitmask(String, usize),

    #[error("invalid size: {0}")]
    InvalidSize(String),

    #[error("malformed argument: {0} (expected --key or --key=value)")]
    MalformedArgument(String),
}
