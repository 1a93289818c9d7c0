//! Run command implementation

use anyhow::{bail, Context, Result};
use cbench_framework::report::DEFAULT_NAME_COLUMN_WIDTH;
use cbench_framework::runner::worst_result;
use cbench_framework::{Configuration, PrintType, Runner};
use cbench_shared::{ApiSelection, DeviceSelection, TestResult};
use clap::Args;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Test to run; every registered test runs when omitted
    #[arg(short, long)]
    pub test: Option<String>,

    /// TOML configuration file, overridden by CBENCH_* variables and flags
    #[arg(short, long, env = "CBENCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Timed iterations per test
    #[arg(short, long)]
    pub iterations: Option<usize>,

    /// Leading iterations left out of the statistics
    #[arg(long)]
    pub iterations_to_skip: Option<usize>,

    /// API to run on: all, ocl, l0 or host
    #[arg(short, long)]
    pub api: Option<ApiSelection>,

    /// Print results as CSV
    #[arg(long)]
    pub csv: bool,

    /// Also print every individual sample
    #[arg(long)]
    pub verbose: bool,

    /// Print test names and measurement shapes without running anything
    #[arg(long)]
    pub noop: bool,

    /// Print one JSON object per result
    #[arg(long)]
    pub json: bool,

    /// Do not print the column header
    #[arg(long)]
    pub no_column_names: bool,

    /// Report bandwidth tests as elapsed time
    #[arg(long)]
    pub do_not_print_bandwidth: bool,

    /// Print test names as command lines that reproduce them
    #[arg(long)]
    pub dump_command_lines: bool,

    /// Print a status line for every result
    #[arg(long)]
    pub print_all_results: bool,

    /// Test names to run, comma separated; prefix with ! to exclude
    #[arg(long, value_delimiter = ',')]
    pub test_filter: Vec<String>,

    /// key=value pairs a test case must have; prefix with ! to negate
    #[arg(long, value_delimiter = ',')]
    pub arg_filter: Vec<String>,

    /// Pause after each successful test, in milliseconds
    #[arg(long)]
    pub sleep_between_tests: Option<u64>,

    #[arg(long)]
    pub driver_index: Option<usize>,

    #[arg(long)]
    pub device_index: Option<usize>,

    /// Device or sub-device to run on, e.g. root or tile0
    #[arg(long)]
    pub device_selection: Option<DeviceSelection>,

    /// Link copy engines exposed by the host device
    #[arg(long)]
    pub link_copy_engines: Option<usize>,

    /// Test arguments after `--`, e.g. `-- --size=64KB --useEvents=0`
    #[arg(last = true)]
    pub test_args: Vec<String>,
}

impl RunArgs {
    /// Layer the command line over the file and environment configuration.
    pub fn configuration(&self) -> Result<Configuration> {
        let mut config =
            Configuration::load(self.config.as_deref()).context("Failed to load configuration")?;

        if let Some(iterations) = self.iterations {
            config.iterations = iterations;
        }
        if let Some(skip) = self.iterations_to_skip {
            config.iterations_to_skip = skip;
        }
        if let Some(api) = self.api {
            config.api = api;
        }
        if self.csv || self.verbose || self.noop || self.json {
            config.print_type = PrintType::from_flags(self.csv, self.verbose, self.noop, self.json)?;
        }
        config.no_column_names |= self.no_column_names;
        config.do_not_print_bandwidth |= self.do_not_print_bandwidth;
        config.dump_command_lines |= self.dump_command_lines;
        config.print_all_results |= self.print_all_results;
        config.test_filter.extend(self.test_filter.iter().cloned());
        config.arg_filter.extend(self.arg_filter.iter().cloned());
        if let Some(sleep) = self.sleep_between_tests {
            config.sleep_between_tests = sleep;
        }
        if let Some(index) = self.driver_index {
            config.backend.driver_index = index;
        }
        if let Some(index) = self.device_index {
            config.backend.device_index = index;
        }
        if let Some(selection) = self.device_selection {
            config.backend.device_selection = selection;
        }
        if let Some(count) = self.link_copy_engines {
            config.backend.link_copy_engines = count;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

/// Run the selected tests, printing results to stdout. Returns the worst result.
pub fn run(args: RunArgs) -> Result<TestResult> {
    let config = args.configuration()?;
    let stdout = io::stdout();
    let worst = execute(&args, &config, stdout.lock())?;
    io::stdout().flush().context("Failed to flush results")?;
    Ok(worst)
}

/// Run against any writer; split out so the command can be exercised in tests.
pub fn execute<W: Write>(args: &RunArgs, config: &Configuration, writer: W) -> Result<TestResult> {
    let registry = cbench_benchmarks::registry();
    let name_width = registry.name_column_width().max(DEFAULT_NAME_COLUMN_WIDTH);
    let mut runner = Runner::new(config, writer).with_name_width(name_width);

    let outcomes = match &args.test {
        Some(name) => {
            let test = registry.get(name).with_context(|| {
                format!(
                    "Unknown test {}. Available tests: {}",
                    name,
                    registry.names().collect::<Vec<_>>().join(", ")
                )
            })?;
            runner.run_single(test, &args.test_args)?
        }
        None => {
            if !args.test_args.is_empty() {
                bail!(
                    "Test arguments {} require --test, all tests run their predefined cases",
                    args.test_args.join(" ")
                );
            }
            runner.run_all(&registry)?
        }
    };

    let worst = worst_result(outcomes.iter().map(|outcome| &outcome.result));
    let succeeded = outcomes
        .iter()
        .filter(|outcome| outcome.result == TestResult::Success)
        .count();
    info!(
        "Finished {} run(s), {} succeeded, worst result {}",
        outcomes.len(),
        succeeded,
        worst
    );
    Ok(worst)
}
