//! Run configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `CBENCH_*` environment variables. Command-line flags are applied last by
//! the binary.

use crate::error::ConfigError;
use cbench_backend::BackendConfig;
use cbench_shared::ApiSelection;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

pub const ENV_PREFIX: &str = "CBENCH_";

/// How results are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintType {
    #[default]
    Default,
    /// Default table followed by every individual sample
    DefaultWithVerbose,
    Csv,
    /// Measurement shape only, nothing is executed
    Noop,
    /// One JSON object per line
    Json,
}

impl PrintType {
    /// Resolve the output mode from the command-line switches.
    pub fn from_flags(csv: bool, verbose: bool, noop: bool, json: bool) -> Result<Self, ConfigError> {
        if verbose && (csv || json) {
            return Err(ConfigError::Invalid(
                "verbose output cannot be combined with csv or json".to_string(),
            ));
        }
        if [csv, noop, json].iter().filter(|flag| **flag).count() > 1 {
            return Err(ConfigError::Invalid(
                "only one of csv, noop and json output may be selected".to_string(),
            ));
        }

        Ok(if noop {
            PrintType::Noop
        } else if csv {
            PrintType::Csv
        } else if json {
            PrintType::Json
        } else if verbose {
            PrintType::DefaultWithVerbose
        } else {
            PrintType::Default
        })
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, PrintType::Noop)
    }
}

impl FromStr for PrintType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(PrintType::Default),
            "verbose" | "default_with_verbose" => Ok(PrintType::DefaultWithVerbose),
            "csv" => Ok(PrintType::Csv),
            "noop" => Ok(PrintType::Noop),
            "json" => Ok(PrintType::Json),
            _ => Err(ConfigError::Invalid(format!("unknown print type: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Timed iterations per test
    pub iterations: usize,

    /// Leading samples excluded from the metrics
    pub iterations_to_skip: usize,

    pub api: ApiSelection,

    pub print_type: PrintType,

    /// Suppress the column header
    pub no_column_names: bool,

    /// Report bandwidth tests as elapsed time
    pub do_not_print_bandwidth: bool,

    /// Print test names as command lines that reproduce them
    pub dump_command_lines: bool,

    /// Print a status line for every result, skipped ones included
    pub print_all_results: bool,

    /// Test names to run; a leading `!` excludes the name instead
    pub test_filter: Vec<String>,

    /// `key=value` pairs a test case must have; a leading `!` negates
    pub arg_filter: Vec<String>,

    /// Pause after each successful test, in milliseconds
    pub sleep_between_tests: u64,

    pub backend: BackendConfig,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            iterations: 10,
            iterations_to_skip: 0,
            api: ApiSelection::All,
            print_type: PrintType::Default,
            no_column_names: false,
            do_not_print_bandwidth: false,
            dump_command_lines: false,
            print_all_results: false,
            test_filter: Vec::new(),
            arg_filter: Vec::new(),
            sleep_between_tests: 0,
            backend: BackendConfig::default(),
        }
    }
}

impl Configuration {
    /// Defaults overlaid with the optional file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(std::env::vars())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply `CBENCH_*` overrides from `vars`. Unrelated variables are ignored.
    pub fn apply_env<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            let Some(key) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match key {
                "ITERATIONS" => self.iterations = parse_env(&name, &value)?,
                "ITERATIONS_TO_SKIP" => self.iterations_to_skip = parse_env(&name, &value)?,
                "API" => self.api = parse_env(&name, &value)?,
                "PRINT_TYPE" => self.print_type = parse_env(&name, &value)?,
                "NO_COLUMN_NAMES" => self.no_column_names = parse_env_flag(&name, &value)?,
                "DO_NOT_PRINT_BANDWIDTH" => {
                    self.do_not_print_bandwidth = parse_env_flag(&name, &value)?
                }
                "DUMP_COMMAND_LINES" => self.dump_command_lines = parse_env_flag(&name, &value)?,
                "PRINT_ALL_RESULTS" => self.print_all_results = parse_env_flag(&name, &value)?,
                "SLEEP_BETWEEN_TESTS" => self.sleep_between_tests = parse_env(&name, &value)?,
                "DRIVER_INDEX" => self.backend.driver_index = parse_env(&name, &value)?,
                "DEVICE_INDEX" => self.backend.device_index = parse_env(&name, &value)?,
                "DEVICE_SELECTION" => self.backend.device_selection = parse_env(&name, &value)?,
                "LINK_COPY_ENGINES" => self.backend.link_copy_engines = parse_env(&name, &value)?,
                _ => debug!("Ignoring unknown environment variable {}", name),
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::Invalid(
                "iterations must be greater than 0".to_string(),
            ));
        }
        if self.iterations_to_skip >= self.iterations {
            return Err(ConfigError::Invalid(format!(
                "cannot skip {} out of {} iterations",
                self.iterations_to_skip, self.iterations
            )));
        }
        if self.backend.device_selection.is_empty() {
            return Err(ConfigError::Invalid("device selection is empty".to_string()));
        }
        if self.sleep_between_tests > 60_000 {
            warn!(
                "Sleeping {} ms between tests, a full run will take a long time",
                self.sleep_between_tests
            );
        }
        Ok(())
    }

    pub fn sleep_between_tests(&self) -> Duration {
        Duration::from_millis(self.sleep_between_tests)
    }
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Environment {
        name: name.to_string(),
        value: value.to_string(),
    })
}

fn parse_env_flag(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Environment {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}
