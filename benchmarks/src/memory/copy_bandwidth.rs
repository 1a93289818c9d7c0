use crate::common::{at_least_one_tick, pattern_bytes};
use cbench_backend::{Backend, QueueProperties};
use cbench_framework::test_case::ensure;
use cbench_framework::{ArgumentError, ArgumentSpec, Benchmark, Statistics, TestArguments};
use cbench_shared::utils::time::Timer;
use cbench_shared::{Api, TestResult, TypeSelector};

pub struct CopyBandwidth;

pub struct CopyBandwidthConfig {
    pub size: usize,
    pub use_events: bool,
    pub force_blitter: bool,
}

impl Benchmark for CopyBandwidth {
    type Config = CopyBandwidthConfig;

    const NAME: &'static str = "CopyBandwidth";
    const DESCRIPTION: &'static str = "Measures bandwidth of a single buffer-to-buffer copy";
    const ARGUMENTS: &'static [ArgumentSpec] = &[
        ArgumentSpec::new("size", "Size of the buffer", "64MB"),
        ArgumentSpec::new(
            "useEvents",
            "Measure with device timestamps instead of the host timer",
            "1",
        ),
        ArgumentSpec::new("forceBlitter", "Submit the copy to the main copy engine", "0"),
    ];
    const APIS: &'static [Api] = &[Api::OpenCl, Api::LevelZero, Api::Host];
    const CASES: &'static [&'static str] = &[
        "--size=64MB --useEvents=1 --forceBlitter=0",
        "--size=64MB --useEvents=1 --forceBlitter=1",
        "--size=64MB --useEvents=0 --forceBlitter=0",
        "--size=256MB --useEvents=1 --forceBlitter=1",
    ];

    fn configure(&self, args: &TestArguments) -> Result<CopyBandwidthConfig, ArgumentError> {
        let size = args.size("size")?;
        ensure(size > 0, "size", "must be greater than 0")?;
        Ok(CopyBandwidthConfig {
            size,
            use_events: args.flag("useEvents")?,
            force_blitter: args.flag("forceBlitter")?,
        })
    }

    fn type_selector(&self, config: &CopyBandwidthConfig) -> TypeSelector {
        TypeSelector::bandwidth(config.use_events)
    }

    fn run(
        &self,
        backend: &dyn Backend,
        config: &CopyBandwidthConfig,
        iterations: usize,
        statistics: &dyn Statistics,
    ) -> cbench_backend::Result<TestResult> {
        let selector = self.type_selector(config);
        let properties = QueueProperties::create()
            .set_profiling(config.use_events)
            .set_force_blitter(config.force_blitter)
            .allow_creation_fail();
        let Some(queue) = backend.create_queue(&properties)? else {
            return Ok(TestResult::DeviceNotCapable);
        };
        let resolution = backend.device_info().timer_resolution;

        let src = pattern_bytes(config.size);
        let mut dst = vec![0u8; config.size];

        // Warmup
        queue.copy(&src, &mut dst)?;
        queue.finish()?;

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
            statistics.push_value_with_size(
                at_least_one_tick(time, resolution),
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

#[cfg(test)]
mod tests {
    use super::*;
    use cbench_backend::{open_backend, BackendConfig, ContextProperties, ExtensionProperties};
    use cbench_framework::TestCaseStatistics;
    use cbench_shared::{MeasurementType, MeasurementUnit};

    fn configure(tokens: &[&str]) -> CopyBandwidthConfig {
        let args = TestArguments::parse(CopyBandwidth::ARGUMENTS, tokens).unwrap();
        Benchmark::configure(&CopyBandwidth, &args).unwrap()
    }

    #[test]
    fn test_type_follows_use_events() {
        let gpu = CopyBandwidth.type_selector(&configure(&[]));
        assert_eq!(gpu.measurement_type, MeasurementType::Gpu);
        let cpu = CopyBandwidth.type_selector(&configure(&["--useEvents=0"]));
        assert_eq!(cpu.measurement_type, MeasurementType::Cpu);
        assert_eq!(cpu.unit, MeasurementUnit::GigabytesPerSecond);
    }

    #[test]
    fn test_copy_on_host_blitter() {
        let backend = open_backend(
            Api::Host,
            &BackendConfig::default(),
            &ContextProperties::create(),
            &ExtensionProperties::create(),
        )
        .unwrap();
        let config = configure(&["--size=256KB", "--forceBlitter=1"]);
        let statistics = TestCaseStatistics::new(5, false);

        let result = CopyBandwidth
            .run(backend.as_ref(), &config, 5, &statistics)
            .unwrap();
        assert_eq!(result, TestResult::Success);

        let report = statistics.report(1);
        assert_eq!(report.series.len(), 1);
        assert_eq!(report.series[0].count, 5);
        let metrics = report.series[0].metrics.as_ref().unwrap();
        assert!(metrics.min > 0.0);
        assert!(metrics.min <= metrics.max);
    }
}
