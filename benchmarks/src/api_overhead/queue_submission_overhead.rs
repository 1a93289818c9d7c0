use cbench_backend::{Backend, QueueProperties};
use cbench_framework::test_case::ensure;
use cbench_framework::{ArgumentError, ArgumentSpec, Benchmark, Statistics, TestArguments};
use cbench_shared::utils::time::Timer;
use cbench_shared::{Api, TestResult, TypeSelector};
use std::time::Duration;

/// Copies above this size stop measuring submission and start measuring bandwidth
const MAX_SUBMISSION_SIZE: usize = 4096;

pub struct QueueSubmissionOverhead;

pub struct QueueSubmissionOverheadConfig {
    pub size: usize,
    pub force_blitter: bool,
    pub out_of_order: bool,
}

impl Benchmark for QueueSubmissionOverhead {
    type Config = QueueSubmissionOverheadConfig;

    const NAME: &'static str = "QueueSubmissionOverhead";
    const DESCRIPTION: &'static str =
        "Measures host time to submit a tiny copy and wait for its completion";
    const ARGUMENTS: &'static [ArgumentSpec] = &[
        ArgumentSpec::new("size", "Bytes copied by each submission", "64"),
        ArgumentSpec::new("forceBlitter", "Submit to the main copy engine", "0"),
        ArgumentSpec::new("ooq", "Use an out-of-order queue", "0"),
    ];
    const APIS: &'static [Api] = &[Api::OpenCl, Api::LevelZero, Api::Host];
    const CASES: &'static [&'static str] = &[
        "--size=64 --forceBlitter=0 --ooq=0",
        "--size=64 --forceBlitter=0 --ooq=1",
        "--size=64 --forceBlitter=1 --ooq=0",
        "--size=4KB --forceBlitter=0 --ooq=0",
    ];

    fn configure(&self, args: &TestArguments) -> Result<QueueSubmissionOverheadConfig, ArgumentError> {
        let size = args.size("size")?;
        ensure(
            size > 0 && size <= MAX_SUBMISSION_SIZE,
            "size",
            "must be between 1 and 4096 bytes",
        )?;
        Ok(QueueSubmissionOverheadConfig {
            size,
            force_blitter: args.flag("forceBlitter")?,
            out_of_order: args.flag("ooq")?,
        })
    }

    fn type_selector(&self, _config: &QueueSubmissionOverheadConfig) -> TypeSelector {
        TypeSelector::time(false)
    }

    fn run(
        &self,
        backend: &dyn Backend,
        config: &QueueSubmissionOverheadConfig,
        iterations: usize,
        statistics: &dyn Statistics,
    ) -> cbench_backend::Result<TestResult> {
        let selector = self.type_selector(config);
        let properties = QueueProperties::create()
            .set_force_blitter(config.force_blitter)
            .set_ooq(config.out_of_order)
            .allow_creation_fail();
        let Some(queue) = backend.create_queue(&properties)? else {
            return Ok(TestResult::DeviceNotCapable);
        };

        let src = vec![0x5Au8; config.size];
        let mut dst = vec![0u8; config.size];

        // Warmup
        queue.copy(&src, &mut dst)?;
        queue.finish()?;

        let mut timer = Timer::new();
        for _ in 0..iterations {
            dst.fill(0);

            timer.measure_start();
            queue.copy(&src, &mut dst)?;
            queue.finish()?;
            timer.measure_end();

            statistics.push_value(
                timer.get().max(Duration::from_nanos(1)),
                selector.unit,
                selector.measurement_type,
                "",
            );

            if dst != src {
                return Ok(TestResult::VerificationFail);
            }
        }
        Ok(TestResult::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbench_backend::{open_backend, BackendConfig, ContextProperties, ExtensionProperties};
    use cbench_framework::TestCaseStatistics;
    use cbench_shared::{MeasurementType, MeasurementUnit};

    #[test]
    fn test_size_limits() {
        let configure = |token: &str| {
            let args = TestArguments::parse(QueueSubmissionOverhead::ARGUMENTS, &[token]).unwrap();
            Benchmark::configure(&QueueSubmissionOverhead, &args).map(|config| config.size)
        };
        assert_eq!(configure("--size=4KB"), Ok(4096));
        assert!(configure("--size=0").is_err());
        assert!(configure("--size=8KB").is_err());
    }

    #[test]
    fn test_reports_host_microseconds() {
        let backend = open_backend(
            Api::Host,
            &BackendConfig::default(),
            &ContextProperties::create(),
            &ExtensionProperties::create(),
        )
        .unwrap();
        let args = TestArguments::parse(QueueSubmissionOverhead::ARGUMENTS, &["--forceBlitter"]).unwrap();
        let config = Benchmark::configure(&QueueSubmissionOverhead, &args).unwrap();
        let statistics = TestCaseStatistics::new(8, false);

        let result = QueueSubmissionOverhead
            .run(backend.as_ref(), &config, 8, &statistics)
            .unwrap();
        assert_eq!(result, TestResult::Success);

        let report = statistics.report(0);
        assert_eq!(report.series[0].unit, MeasurementUnit::Microseconds);
        assert_eq!(report.series[0].measurement_type, MeasurementType::Cpu);
        assert_eq!(report.series[0].count, 8);
    }
}
