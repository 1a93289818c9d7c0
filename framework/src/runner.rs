//! Test execution
//!
//! For every API a test case is attempted in a fixed order of checks: filters,
//! API selection, backend availability, implementation presence. Only then are
//! the arguments applied and the benchmark run against a freshly opened
//! backend. Every attempt ends in a [`TestResult`]; statistics or a status line
//! are printed depending on that result and the print mode.

use crate::config::Configuration;
use crate::report::ReportPrinter;
use crate::registry::Registry;
use crate::statistics::{Statistics, TestCaseStatistics};
use crate::test_case::{
    matches_arg_filter, matches_test_filter, test_name_with_config, TestArguments, TestCase,
};
use cbench_backend::{is_api_supported, open_backend, BackendError};
use cbench_shared::{Api, TestResult};
use std::io::{self, Write};
use tracing::{debug, warn};

/// Outcome of one test case on one API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    pub name: String,
    pub api: Api,
    pub result: TestResult,
}

/// Map a backend failure to the result reported for the test.
pub fn result_for_backend_error(error: &BackendError) -> TestResult {
    match error {
        BackendError::UnsupportedApi(_) => TestResult::UnsupportedApi,
        BackendError::ExtensionUnavailable(_) => TestResult::DriverFunctionNotFound,
        BackendError::DriverNotFound(_)
        | BackendError::DeviceNotFound(_)
        | BackendError::DeviceSelectionUnavailable(_)
        | BackendError::EngineUnavailable(_) => TestResult::DeviceNotCapable,
        _ => TestResult::Error,
    }
}

/// Worst result of a run, used for the process exit code
pub fn worst_result<'a>(results: impl IntoIterator<Item = &'a TestResult>) -> TestResult {
    results
        .into_iter()
        .copied()
        .filter(TestResult::is_failure)
        .max_by_key(TestResult::severity)
        .unwrap_or(TestResult::Success)
}

pub struct Runner<'a, W: Write> {
    config: &'a Configuration,
    printer: ReportPrinter<W>,
}

impl<'a, W: Write> Runner<'a, W> {
    pub fn new(config: &'a Configuration, writer: W) -> Self {
        Self {
            config,
            printer: ReportPrinter::new(writer, config.print_type),
        }
    }

    pub fn with_name_width(mut self, name_width: usize) -> Self {
        self.printer = self.printer.with_name_width(name_width);
        self
    }

    pub fn into_inner(self) -> W {
        self.printer.into_inner()
    }

    pub fn print_header(&mut self) -> io::Result<()> {
        if self.config.no_column_names {
            return Ok(());
        }
        self.printer.print_header()
    }

    /// Run one test with arguments given on the command line.
    pub fn run_single(&mut self, test: &dyn TestCase, tokens: &[String]) -> io::Result<Vec<TestOutcome>> {
        self.print_header()?;
        self.run_test(test, tokens, true)
    }

    /// Run every registered test with each of its predefined argument sets.
    pub fn run_all(&mut self, registry: &Registry) -> io::Result<Vec<TestOutcome>> {
        self.print_header()?;
        let mut outcomes = Vec::new();
        for test in registry.iter() {
            for case in test.cases() {
                let tokens: Vec<String> = case.split_whitespace().map(str::to_string).collect();
                outcomes.extend(self.run_test(test, &tokens, false)?);
            }
        }
        Ok(outcomes)
    }

    /// Attempt `test` on every API.
    pub fn run_test(
        &mut self,
        test: &dyn TestCase,
        tokens: &[String],
        single_test_mode: bool,
    ) -> io::Result<Vec<TestOutcome>> {
        let mut outcomes = Vec::with_capacity(Api::ALL.len());
        for api in Api::ALL {
            outcomes.push(self.run_on_api(test, api, tokens, single_test_mode)?);
        }
        Ok(outcomes)
    }

    fn run_on_api(
        &mut self,
        test: &dyn TestCase,
        api: Api,
        tokens: &[String],
        single_test_mode: bool,
    ) -> io::Result<TestOutcome> {
        let statistics =
            TestCaseStatistics::new(self.config.iterations, self.config.do_not_print_bandwidth);

        let (name, result) = match TestArguments::parse(test.arguments(), tokens) {
            Ok(args) => {
                let name = test_name_with_config(test.name(), api, &args, self.config.dump_command_lines);
                let result = self.execute(test, api, &args, &name, &statistics);
                (name, result)
            }
            Err(e) => {
                warn!("Invalid arguments for {}: {}", test.name(), e);
                (format!("{}(api={})", test.name(), api), TestResult::InvalidArgs)
            }
        };

        self.report(&name, result, &statistics, single_test_mode)?;
        Ok(TestOutcome { name, api, result })
    }

    fn execute(
        &self,
        test: &dyn TestCase,
        api: Api,
        args: &TestArguments,
        name: &str,
        statistics: &TestCaseStatistics,
    ) -> TestResult {
        if !matches_test_filter(test.name(), &self.config.test_filter)
            || !matches_arg_filter(args, &self.config.arg_filter)
        {
            return TestResult::FilteredOut;
        }
        if !self.config.api.allows(api) {
            return TestResult::SkippedApi;
        }
        if !is_api_supported(api) {
            return TestResult::UnsupportedApi;
        }
        if !test.has_implementation(api) {
            return TestResult::NoImplementation;
        }

        let configured = match test.configure(args) {
            Ok(configured) => configured,
            Err(e) => {
                warn!("{}: {}", name, e);
                return TestResult::InvalidArgs;
            }
        };
        let unparsed = args.unparsed();
        if !unparsed.is_empty() {
            warn!(
                "{} declares arguments it never reads: {}",
                test.name(),
                unparsed.join(", ")
            );
        }
        if !self.config.dump_command_lines && name.len() > self.printer.name_width() {
            debug!(
                "TestCase column width of {} is too small for {} characters",
                self.printer.name_width(),
                name.len()
            );
        }

        if self.config.print_type.is_noop() {
            let selector = configured.type_selector();
            statistics.push_unit_and_type(selector.unit, selector.measurement_type);
            return TestResult::Nooped;
        }

        let backend = match open_backend(
            api,
            &self.config.backend,
            &configured.context_properties(),
            &configured.extension_properties(),
        ) {
            Ok(backend) => backend,
            Err(e) => {
                debug!("{}: cannot open backend: {}", name, e);
                return result_for_backend_error(&e);
            }
        };

        debug!("Running {}", name);
        match configured.run(backend.as_ref(), self.config.iterations, statistics) {
            Ok(result) => result,
            Err(e) => {
                warn!("{} failed: {}", name, e);
                result_for_backend_error(&e)
            }
        }
    }

    fn report(
        &mut self,
        name: &str,
        result: TestResult,
        statistics: &TestCaseStatistics,
        single_test_mode: bool,
    ) -> io::Result<()> {
        match result {
            TestResult::Success => {
                if !statistics.is_full() {
                    warn!("{} did not generate as many values as expected", name);
                }
                self.printer
                    .print_statistics(name, &statistics.report(self.config.iterations_to_skip))?;
                let pause = self.config.sleep_between_tests();
                if !pause.is_zero() {
                    std::thread::sleep(pause);
                }
            }
            TestResult::Nooped => {
                self.printer
                    .print_statistics(name, &statistics.report(self.config.iterations_to_skip))?;
            }
            other => {
                let info = other.info();
                if info.was_skipped && !statistics.is_empty() {
                    warn!("{} was skipped but generated some values", name);
                }

                let print_message = (self.config.print_all_results
                    && info.print_in_print_all_results_mode)
                    || if single_test_mode {
                        info.print_in_single_test_mode
                    } else {
                        info.print_in_all_tests_mode
                    };
                if print_message {
                    self.printer.print_status(name, info.message)?;
                }
            }
        }
        Ok(())
    }
}
