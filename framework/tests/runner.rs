use anyhow::Result;
use cbench_backend::{Backend, QueueProperties};
use cbench_framework::test_case::ensure;
use cbench_framework::{
    ArgumentError, ArgumentSpec, Benchmark, Configuration, PrintType, Registry, Runner,
    Statistics, TestArguments,
};
use cbench_shared::utils::time::Timer;
use cbench_shared::{Api, ApiSelection, MeasurementType, MeasurementUnit, TestResult, TypeSelector};
use std::io::Write;
use tempfile::NamedTempFile;

struct HostCopy;

struct HostCopyConfig {
    size: usize,
    use_events: bool,
}

impl Benchmark for HostCopy {
    type Config = HostCopyConfig;

    const NAME: &'static str = "HostCopy";
    const DESCRIPTION: &'static str = "Copies a buffer on the default blitter";
    const ARGUMENTS: &'static [ArgumentSpec] = &[
        ArgumentSpec::new("size", "Bytes to copy", "64KB"),
        ArgumentSpec::new("useEvents", "Measure with device timestamps", "1"),
    ];
    const APIS: &'static [Api] = &[Api::LevelZero, Api::Host];
    const CASES: &'static [&'static str] = &["--size=4KB", "--size=8KB --useEvents=0"];

    fn configure(&self, args: &TestArguments) -> Result<HostCopyConfig, ArgumentError> {
        let size = args.size("size")?;
        ensure(size > 0, "size", "must be greater than 0")?;
        Ok(HostCopyConfig {
            size,
            use_events: args.flag("useEvents")?,
        })
    }

    fn type_selector(&self, config: &HostCopyConfig) -> TypeSelector {
        TypeSelector::bandwidth(config.use_events)
    }

    fn run(
        &self,
        backend: &dyn Backend,
        config: &HostCopyConfig,
        iterations: usize,
        statistics: &dyn Statistics,
    ) -> cbench_backend::Result<TestResult> {
        let selector = self.type_selector(config);
        let queue = backend
            .create_queue(
                &QueueProperties::create()
                    .set_force_blitter(true)
                    .set_profiling(config.use_events),
            )?
            .ok_or(cbench_backend::BackendError::NoContext)?;

        let src = vec![0xABu8; config.size];
        let mut dst = vec![0u8; config.size];
        let mut timer = Timer::new();
        for _ in 0..iterations {
            timer.measure_start();
            let event = queue.copy(&src, &mut dst)?;
            queue.finish()?;
            timer.measure_end();

            let time = if config.use_events {
                event.duration()?
            } else {
                timer.get()
            };
            // A copy can finish within one clock tick
            let time = time.max(std::time::Duration::from_nanos(1));
            statistics.push_value_with_size(
                time,
                config.size as u64,
                selector.unit,
                selector.measurement_type,
                "",
            );
        }

        if dst != src {
            return Ok(TestResult::VerificationFail);
        }
        Ok(TestResult::Success)
    }
}

fn host_only() -> Configuration {
    Configuration {
        iterations: 4,
        api: ApiSelection::Only(Api::Host),
        ..Configuration::default()
    }
}

fn results(outcomes: &[cbench_framework::TestOutcome]) -> Vec<(Api, TestResult)> {
    outcomes.iter().map(|o| (o.api, o.result)).collect()
}

#[test]
fn test_single_test_on_host() -> Result<()> {
    let config = host_only();
    let mut runner = Runner::new(&config, Vec::new());
    let outcomes = runner.run_single(&HostCopy, &["--size=1KB".to_string()])?;

    assert_eq!(
        results(&outcomes),
        vec![
            (Api::OpenCl, TestResult::SkippedApi),
            (Api::LevelZero, TestResult::SkippedApi),
            (Api::Host, TestResult::Success),
        ]
    );
    assert_eq!(outcomes[2].name, "HostCopy(api=host size=1KB useEvents=1)");

    let output = String::from_utf8(runner.into_inner())?;
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("TestCase"));
    assert!(lines[1].trim_start().starts_with("HostCopy(api=host size=1KB useEvents=1)"));
    assert!(lines[1].ends_with("[GB/s]"));
    assert!(lines[1].contains("GPU"));
    Ok(())
}

#[test]
fn test_all_apis_report_missing_support() -> Result<()> {
    let config = Configuration {
        iterations: 2,
        print_type: PrintType::Csv,
        no_column_names: true,
        ..Configuration::default()
    };
    let mut runner = Runner::new(&config, Vec::new());
    let outcomes = runner.run_single(&HostCopy, &[])?;

    assert_eq!(
        results(&outcomes),
        vec![
            (Api::OpenCl, TestResult::UnsupportedApi),
            (Api::LevelZero, TestResult::UnsupportedApi),
            (Api::Host, TestResult::Success),
        ]
    );

    // Unsupported APIs stay quiet, the successful run prints one CSV row
    let output = String::from_utf8(runner.into_inner())?;
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("HostCopy(api=host size=64KB useEvents=1),"));
    assert_eq!(lines[0].split(',').count(), 8);
    Ok(())
}

#[test]
fn test_noop_prints_shape_without_running() -> Result<()> {
    let config = Configuration {
        print_type: PrintType::Noop,
        no_column_names: true,
        ..host_only()
    };
    let mut runner = Runner::new(&config, Vec::new()).with_name_width(50);
    let outcomes = runner.run_single(&HostCopy, &["--useEvents=0".to_string()])?;
    assert_eq!(outcomes[2].result, TestResult::Nooped);

    let output = String::from_utf8(runner.into_inner())?;
    assert!(output.contains("HostCopy(api=host size=64KB useEvents=0)"));
    assert!(output.trim_end().ends_with("CPU         [GB/s]"));
    Ok(())
}

#[test]
fn test_invalid_arguments() -> Result<()> {
    let config = host_only();
    let mut runner = Runner::new(&config, Vec::new());

    let outcomes = runner.run_single(&HostCopy, &["--size=0".to_string()])?;
    assert_eq!(outcomes[2].result, TestResult::InvalidArgs);

    let outcomes = runner.run_single(&HostCopy, &["--colour=red".to_string()])?;
    assert!(outcomes.iter().all(|o| o.result == TestResult::InvalidArgs));

    let output = String::from_utf8(runner.into_inner())?;
    assert!(output.contains("INVALID_ARGS"));
    Ok(())
}

#[test]
fn test_run_all_with_filters() -> Result<()> {
    let mut registry = Registry::new();
    registry.register(HostCopy);

    let config = Configuration {
        arg_filter: vec!["!useEvents=0".to_string()],
        print_type: PrintType::Json,
        ..host_only()
    };
    let mut runner = Runner::new(&config, Vec::new());
    let outcomes = runner.run_all(&registry)?;

    let host: Vec<TestResult> = outcomes
        .iter()
        .filter(|o| o.api == Api::Host)
        .map(|o| o.result)
        .collect();
    assert_eq!(host, vec![TestResult::Success, TestResult::FilteredOut]);

    let output = String::from_utf8(runner.into_inner())?;
    let records: Vec<serde_json::Value> = output
        .lines()
        .map(serde_json::from_str)
        .collect::<std::result::Result<_, _>>()?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["test"], "HostCopy(api=host size=4KB useEvents=1)");
    assert_eq!(records[0]["series"][0]["count"], 4);
    Ok(())
}

#[test]
fn test_do_not_print_bandwidth_from_config_file() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(
        file,
        "iterations = 3\napi = \"host\"\ndo_not_print_bandwidth = true\ndump_command_lines = true\nprint_type = \"csv\"\nno_column_names = true"
    )?;
    let config = Configuration::from_file(file.path())?;
    config.validate()?;

    let mut runner = Runner::new(&config, Vec::new());
    runner.run_single(&HostCopy, &["--useEvents=0".to_string()])?;

    let output = String::from_utf8(runner.into_inner())?;
    assert!(output.starts_with("--test=HostCopy --api=host --size=64KB --useEvents=0,"));
    assert!(output.trim_end().ends_with("CPU,[us]"));
    Ok(())
}

#[test]
fn test_declared_shape_through_trait_object() {
    let stats = cbench_framework::TestCaseStatistics::new(1, false);
    let dynamic: &dyn Statistics = &stats;
    dynamic.push_unit_and_type(MeasurementUnit::Latency, MeasurementType::Gpu);
    assert!(dynamic.is_empty());
}
