//! Recoverable framework errors

use std::path::PathBuf;
use thiserror::Error;

/// A test argument could not be applied
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("unknown argument --{0}")]
    Unknown(String),

    #[error("argument --{name} has invalid value \"{value}\": {reason}")]
    Invalid {
        name: String,
        value: String,
        reason: String,
    },

    #[error("argument --{name} is out of range: {reason}")]
    OutOfRange { name: String, reason: String },

    #[error("malformed argument \"{0}\", expected --key=value")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {name}: {value}")]
    Environment { name: String, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
