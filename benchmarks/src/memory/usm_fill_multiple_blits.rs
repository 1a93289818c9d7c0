//! Fill one buffer using several blitters at once

use super::usm_copy_multiple_blits::Partition;
use crate::common::{
    at_least_one_tick, create_engine_queues, gpu_span, join_all, pattern_bytes, split_regions,
    BlitterMask,
};
use cbench_backend::{Backend, CommandQueue, Event};
use cbench_framework::test_case::ensure;
use cbench_framework::{ArgumentError, ArgumentSpec, Benchmark, Statistics, TestArguments};
use cbench_shared::utils::time::Timer;
use cbench_shared::{Api, Engine, MeasurementType, MeasurementUnit, TestResult, TypeSelector};
use std::time::Duration;
use tracing::debug;

const MAX_PATTERN_SIZE: usize = 128;

pub struct UsmFillMultipleBlits;

pub struct UsmFillMultipleBlitsConfig {
    pub size: usize,
    pub engines: Vec<Engine>,
    pub pattern_size: usize,
}

impl Benchmark for UsmFillMultipleBlits {
    type Config = UsmFillMultipleBlitsConfig;

    const NAME: &'static str = "UsmFillMultipleBlits";
    const DESCRIPTION: &'static str =
        "Measures fill bandwidth when one buffer is split across several copy engines";
    const ARGUMENTS: &'static [ArgumentSpec] = &[
        ArgumentSpec::new("size", "Size of the buffer", "64MB"),
        ArgumentSpec::new(
            "blitters",
            "Copy engines to use, as a bit mask. Bit 0 is BCS, bits 1-8 are BCS1-BCS8",
            "000000001",
        ),
        ArgumentSpec::new("patternSize", "Size of the fill pattern in bytes", "1"),
    ];
    const APIS: &'static [Api] = &[Api::OpenCl, Api::LevelZero, Api::Host];
    const CASES: &'static [&'static str] = &[
        "--size=512MB --blitters=000000001 --patternSize=1",
        "--size=512MB --blitters=000000010 --patternSize=1",
        "--size=512MB --blitters=000000111 --patternSize=1",
        "--size=512MB --blitters=111111111 --patternSize=1",
    ];

    fn configure(&self, args: &TestArguments) -> Result<UsmFillMultipleBlitsConfig, ArgumentError> {
        let size = args.size("size")?;
        ensure(size > 0, "size", "must be greater than 0")?;
        let mask: BlitterMask = args.get("blitters")?;
        ensure(!mask.is_empty(), "blitters", "must select at least one copy engine")?;
        let pattern_size: usize = args.get("patternSize")?;
        ensure(
            pattern_size.is_power_of_two() && pattern_size <= MAX_PATTERN_SIZE,
            "patternSize",
            "must be a power of two no larger than 128",
        )?;
        let engines = mask.engines();
        ensure(
            pattern_size <= Partition::smallest_region(size, &engines),
            "patternSize",
            "must fit in the region of every selected copy engine",
        )?;

        Ok(UsmFillMultipleBlitsConfig {
            size,
            engines,
            pattern_size,
        })
    }

    fn type_selector(&self, _config: &UsmFillMultipleBlitsConfig) -> TypeSelector {
        TypeSelector::new(MeasurementUnit::GigabytesPerSecond, MeasurementType::Gpu)
    }

    fn run(
        &self,
        backend: &dyn Backend,
        config: &UsmFillMultipleBlitsConfig,
        iterations: usize,
        statistics: &dyn Statistics,
    ) -> cbench_backend::Result<TestResult> {
        let Some(queues) = create_engine_queues(backend, &config.engines, true)? else {
            return Ok(TestResult::DeviceNotCapable);
        };
        let resolution = backend.device_info().timer_resolution;

        // A region only takes whole patterns, the remainder stays untouched
        let mut partition = Partition::new(config.size, &config.engines);
        for size in partition.sizes.iter_mut() {
            *size -= *size % config.pattern_size;
        }
        let filled = partition.total() as u64;
        debug!(
            "Filling {} of {} bytes with a {} byte pattern",
            filled, config.size, config.pattern_size
        );

        let pattern = pattern_bytes(config.pattern_size);
        let mut buffer = vec![0u8; config.size];

        // Warmup
        fill_regions(&queues, &partition, &pattern, &mut buffer)?;

        let mut timer = Timer::new();
        for _ in 0..iterations {
            timer.measure_start();
            let events = fill_regions(&queues, &partition, &pattern, &mut buffer)?;
            timer.measure_end();

            for ((engine, size), event) in partition.engines.iter().zip(&partition.sizes).zip(&events) {
                statistics.push_value_with_size(
                    at_least_one_tick(event.duration()?, resolution),
                    *size as u64,
                    MeasurementUnit::GigabytesPerSecond,
                    MeasurementType::Gpu,
                    engine.name(),
                );
            }
            statistics.push_value_with_size(
                at_least_one_tick(gpu_span(&events)?, resolution),
                filled,
                MeasurementUnit::GigabytesPerSecond,
                MeasurementType::Gpu,
                "Total (Gpu)",
            );
            statistics.push_value_with_size(
                timer.get().max(Duration::from_nanos(1)),
                filled,
                MeasurementUnit::GigabytesPerSecond,
                MeasurementType::Cpu,
                "Total (Cpu)",
            );
        }

        let verified = buffer[..partition.total()]
            .chunks_exact(config.pattern_size)
            .all(|chunk| chunk == pattern.as_slice());
        if !verified {
            return Ok(TestResult::VerificationFail);
        }
        Ok(TestResult::Success)
    }
}

fn fill_regions(
    queues: &[Box<dyn CommandQueue>],
    partition: &Partition,
    pattern: &[u8],
    buffer: &mut [u8],
) -> cbench_backend::Result<Vec<Event>> {
    let targets = split_regions(buffer, &partition.sizes);
    std::thread::scope(|scope| {
        let handles = queues
            .iter()
            .zip(targets)
            .map(|(queue, target)| {
                scope.spawn(move || -> cbench_backend::Result<Event> {
                    let event = queue.fill(target, pattern)?;
                    queue.finish()?;
                    Ok(event)
                })
            })
            .collect();
        join_all(handles).into_iter().collect()
    })
}
