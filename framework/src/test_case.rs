//! Benchmark definitions
//!
//! A benchmark is a type implementing [`Benchmark`]: a name, the arguments it
//! accepts, the APIs it has a body for, and a `run` procedure reporting into
//! [`Statistics`]. The runner only sees the object-safe [`TestCase`] view so
//! differently configured benchmarks can live in one registry.

use crate::error::ArgumentError;
use crate::statistics::Statistics;
use cbench_backend::{Backend, ContextProperties, ExtensionProperties};
use cbench_shared::utils::{parse_key_value_argument, parse_size, split_filter_negation};
use cbench_shared::{Api, TestResult, TypeSelector};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;

/// One argument a benchmark accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// Value used when the command line leaves the argument out
    pub default: &'static str,
}

impl ArgumentSpec {
    pub const fn new(name: &'static str, description: &'static str, default: &'static str) -> Self {
        Self {
            name,
            description,
            default,
        }
    }
}

/// Argument values for one test case, in declaration order
#[derive(Debug, Clone)]
pub struct TestArguments {
    values: Vec<(&'static str, String)>,
    read: RefCell<BTreeSet<&'static str>>,
}

impl TestArguments {
    /// Start from the declared defaults and apply `--key=value` tokens.
    pub fn parse<S: AsRef<str>>(specs: &'static [ArgumentSpec], tokens: &[S]) -> Result<Self, ArgumentError> {
        let mut values: Vec<(&'static str, String)> = specs
            .iter()
            .map(|spec| (spec.name, spec.default.to_string()))
            .collect();

        for token in tokens {
            let token = token.as_ref();
            let (key, value) = parse_key_value_argument(token)
                .map_err(|_| ArgumentError::Malformed(token.to_string()))?;
            let slot = values
                .iter_mut()
                .find(|(name, _)| name.eq_ignore_ascii_case(&key))
                .ok_or(ArgumentError::Unknown(key))?;
            // A bare `--flag` switches the flag on
            slot.1 = if value.is_empty() { "1".to_string() } else { value };
        }

        Ok(Self {
            values,
            read: RefCell::new(BTreeSet::new()),
        })
    }

    /// Raw value of a declared argument.
    pub fn raw(&self, name: &str) -> Result<&str, ArgumentError> {
        let (declared, value) = self
            .values
            .iter()
            .find(|(declared, _)| *declared == name)
            .ok_or_else(|| ArgumentError::Unknown(name.to_string()))?;
        self.read.borrow_mut().insert(*declared);
        Ok(value)
    }

    pub fn get<T>(&self, name: &str) -> Result<T, ArgumentError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let value = self.raw(name)?;
        value.parse().map_err(|e: T::Err| invalid(name, value, e))
    }

    /// Byte count, accepting `KB`/`MB`/`GB` suffixes
    pub fn size(&self, name: &str) -> Result<usize, ArgumentError> {
        let value = self.raw(name)?;
        parse_size(value).map_err(|e| invalid(name, value, e))
    }

    pub fn flag(&self, name: &str) -> Result<bool, ArgumentError> {
        let value = self.raw(name)?;
        match value.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(invalid(name, value, "expected 0 or 1")),
        }
    }

    /// Declared arguments nothing has read yet
    pub fn unparsed(&self) -> Vec<&'static str> {
        let read = self.read.borrow();
        self.values
            .iter()
            .map(|(name, _)| *name)
            .filter(|name| !read.contains(name))
            .collect()
    }

    /// `key=value` pairs in declaration order
    pub fn pairs(&self) -> impl Iterator<Item = String> + '_ {
        self.values
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
    }

    pub fn config_string(&self) -> String {
        self.pairs().collect::<Vec<_>>().join(" ")
    }

    /// The arguments as command-line tokens
    pub fn command_line(&self) -> String {
        self.values
            .iter()
            .map(|(name, value)| format!("--{}={}", name, value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn invalid(name: &str, value: &str, reason: impl Display) -> ArgumentError {
    ArgumentError::Invalid {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Check a value that parsed but is not usable.
pub fn ensure(condition: bool, name: &str, reason: &str) -> Result<(), ArgumentError> {
    if condition {
        Ok(())
    } else {
        Err(ArgumentError::OutOfRange {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    }
}

/// A benchmark procedure with typed configuration
pub trait Benchmark: Send + Sync + 'static {
    type Config: Send + Sync + 'static;

    const NAME: &'static str;
    const DESCRIPTION: &'static str;
    const ARGUMENTS: &'static [ArgumentSpec];
    /// APIs this benchmark has a body for
    const APIS: &'static [Api];
    /// Argument sets run when the whole suite is executed
    const CASES: &'static [&'static str] = &[""];

    fn configure(&self, args: &TestArguments) -> Result<Self::Config, ArgumentError>;

    fn type_selector(&self, config: &Self::Config) -> TypeSelector;

    fn context_properties(&self, _config: &Self::Config) -> ContextProperties {
        ContextProperties::create()
    }

    fn extension_properties(&self, _config: &Self::Config) -> ExtensionProperties {
        ExtensionProperties::create()
    }

    /// Run the timed loop, pushing one sample per series per iteration.
    fn run(
        &self,
        backend: &dyn Backend,
        config: &Self::Config,
        iterations: usize,
        statistics: &dyn Statistics,
    ) -> cbench_backend::Result<TestResult>;
}

/// Type-erased benchmark as seen by the registry and runner
pub trait TestCase: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn arguments(&self) -> &'static [ArgumentSpec];

    fn apis(&self) -> &'static [Api];

    fn cases(&self) -> &'static [&'static str];

    fn has_implementation(&self, api: Api) -> bool {
        self.apis().contains(&api)
    }

    fn configure(&self, args: &TestArguments) -> Result<Box<dyn ConfiguredTest + '_>, ArgumentError>;
}

/// A test case with its arguments applied
pub trait ConfiguredTest {
    fn type_selector(&self) -> TypeSelector;

    fn context_properties(&self) -> ContextProperties;

    fn extension_properties(&self) -> ExtensionProperties;

    fn run(
        &self,
        backend: &dyn Backend,
        iterations: usize,
        statistics: &dyn Statistics,
    ) -> cbench_backend::Result<TestResult>;
}

struct Configured<'a, B: Benchmark> {
    benchmark: &'a B,
    config: B::Config,
}

impl<B: Benchmark> ConfiguredTest for Configured<'_, B> {
    fn type_selector(&self) -> TypeSelector {
        self.benchmark.type_selector(&self.config)
    }

    fn context_properties(&self) -> ContextProperties {
        self.benchmark.context_properties(&self.config)
    }

    fn extension_properties(&self) -> ExtensionProperties {
        self.benchmark.extension_properties(&self.config)
    }

    fn run(
        &self,
        backend: &dyn Backend,
        iterations: usize,
        statistics: &dyn Statistics,
    ) -> cbench_backend::Result<TestResult> {
        self.benchmark.run(backend, &self.config, iterations, statistics)
    }
}

impl<B: Benchmark> TestCase for B {
    fn name(&self) -> &'static str {
        B::NAME
    }

    fn description(&self) -> &'static str {
        B::DESCRIPTION
    }

    fn arguments(&self) -> &'static [ArgumentSpec] {
        B::ARGUMENTS
    }

    fn apis(&self) -> &'static [Api] {
        B::APIS
    }

    fn cases(&self) -> &'static [&'static str] {
        B::CASES
    }

    fn configure(&self, args: &TestArguments) -> Result<Box<dyn ConfiguredTest + '_>, ArgumentError> {
        let config = Benchmark::configure(self, args)?;
        Ok(Box::new(Configured {
            benchmark: self,
            config,
        }))
    }
}

/// `Name(api=host size=1024)`, or the command line reproducing the test.
pub fn test_name_with_config(name: &str, api: Api, args: &TestArguments, as_command_line: bool) -> String {
    if as_command_line {
        let arguments = args.command_line();
        if arguments.is_empty() {
            format!("--test={} --api={}", name, api)
        } else {
            format!("--test={} --api={} {}", name, api, arguments)
        }
    } else {
        let config = args.config_string();
        if config.is_empty() {
            format!("{}(api={})", name, api)
        } else {
            format!("{}(api={} {})", name, api, config)
        }
    }
}

/// Every filter must hold: plain filters name the test, `!` filters exclude it.
pub fn matches_test_filter(name: &str, filters: &[String]) -> bool {
    filters.iter().all(|filter| {
        let (filter, negated) = split_filter_negation(filter);
        (name == filter) != negated
    })
}

/// Every filter must hold: a plain `key=value` filter must match one of the
/// arguments, a negated one must match none.
pub fn matches_arg_filter(args: &TestArguments, filters: &[String]) -> bool {
    filters.iter().all(|filter| {
        let (filter, negated) = split_filter_negation(filter);
        let any_match = args.pairs().any(|pair| pair == filter);
        any_match != negated
    })
}
