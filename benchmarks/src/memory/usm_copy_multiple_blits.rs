//! Copy one buffer using several blitters at once

use crate::common::{
    at_least_one_tick, create_engine_queues, gpu_span, join_all, pattern_bytes, split_regions,
    BlitterMask,
};
use cbench_backend::{Backend, CommandQueue, Event};
use cbench_framework::test_case::ensure;
use cbench_framework::{
    ArgumentError, ArgumentSpec, Benchmark, BlitSizeAssigner, Statistics, TestArguments,
};
use cbench_shared::utils::time::Timer;
use cbench_shared::{Api, Engine, MeasurementType, MeasurementUnit, TestResult, TypeSelector};
use std::time::Duration;
use tracing::debug;

pub struct UsmCopyMultipleBlits;

pub struct UsmCopyMultipleBlitsConfig {
    pub size: usize,
    pub engines: Vec<Engine>,
}

/// Copy regions handed to each blitter
pub(crate) struct Partition {
    pub engines: Vec<Engine>,
    pub offsets: Vec<usize>,
    pub sizes: Vec<usize>,
}

impl Partition {
    pub fn new(size: usize, engines: &[Engine]) -> Self {
        let mut assigner = BlitSizeAssigner::new(size);
        for engine in engines {
            assigner.add_copy_engine(*engine);
        }

        let (offsets, sizes): (Vec<usize>, Vec<usize>) = engines
            .iter()
            .map(|engine| assigner.space_for_blit(engine.is_main_copy_engine()))
            .unzip();
        let coverage = assigner.validate();
        debug!("Partitioned {} bytes: {:?}", size, coverage);

        Self {
            engines: engines.to_vec(),
            offsets,
            sizes,
        }
    }

    /// Size of the smallest region `new` would hand out. Every link engine
    /// gets one chunk and the main engine at least one.
    pub fn smallest_region(size: usize, engines: &[Engine]) -> usize {
        let mut assigner = BlitSizeAssigner::new(size);
        for engine in engines {
            assigner.add_copy_engine(*engine);
        }
        assigner.chunk_size()
    }

    /// Bytes covered by all regions
    pub fn total(&self) -> usize {
        self.sizes.iter().sum()
    }
}

impl Benchmark for UsmCopyMultipleBlits {
    type Config = UsmCopyMultipleBlitsConfig;

    const NAME: &'static str = "UsmCopyMultipleBlits";
    const DESCRIPTION: &'static str =
        "Measures copy bandwidth when one buffer is split across several copy engines";
    const ARGUMENTS: &'static [ArgumentSpec] = &[
        ArgumentSpec::new("size", "Size of the buffer", "64MB"),
        ArgumentSpec::new(
            "blitters",
            "Copy engines to use, as a bit mask. Bit 0 is BCS, bits 1-8 are BCS1-BCS8",
            "000000001",
        ),
    ];
    const APIS: &'static [Api] = &[Api::OpenCl, Api::LevelZero, Api::Host];
    const CASES: &'static [&'static str] = &[
        "--size=512MB --blitters=000000001",
        "--size=512MB --blitters=000000010",
        "--size=512MB --blitters=000000111",
        "--size=512MB --blitters=111111111",
    ];

    fn configure(&self, args: &TestArguments) -> Result<UsmCopyMultipleBlitsConfig, ArgumentError> {
        let size = args.size("size")?;
        ensure(size > 0, "size", "must be greater than 0")?;
        let mask: BlitterMask = args.get("blitters")?;
        ensure(!mask.is_empty(), "blitters", "must select at least one copy engine")?;
        let engines = mask.engines();
        ensure(
            Partition::smallest_region(size, &engines) > 0,
            "size",
            "must give every selected copy engine at least one byte",
        )?;

        Ok(UsmCopyMultipleBlitsConfig { size, engines })
    }

    fn type_selector(&self, _config: &UsmCopyMultipleBlitsConfig) -> TypeSelector {
        TypeSelector::new(MeasurementUnit::GigabytesPerSecond, MeasurementType::Gpu)
    }

    fn run(
        &self,
        backend: &dyn Backend,
        config: &UsmCopyMultipleBlitsConfig,
        iterations: usize,
        statistics: &dyn Statistics,
    ) -> cbench_backend::Result<TestResult> {
        let Some(queues) = create_engine_queues(backend, &config.engines, true)? else {
            return Ok(TestResult::DeviceNotCapable);
        };
        let resolution = backend.device_info().timer_resolution;

        let partition = Partition::new(config.size, &config.engines);
        let copied = partition.total() as u64;
        debug!(
            "Copying {} of {} bytes with {} engine(s)",
            copied,
            config.size,
            queues.len()
        );

        let src = pattern_bytes(config.size);
        let mut dst = vec![0u8; config.size];

        // Warmup
        copy_regions(&queues, &partition, &src, &mut dst)?;

        let mut timer = Timer::new();
        for _ in 0..iterations {
            timer.measure_start();
            let events = copy_regions(&queues, &partition, &src, &mut dst)?;
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
                copied,
                MeasurementUnit::GigabytesPerSecond,
                MeasurementType::Gpu,
                "Total (Gpu)",
            );
            statistics.push_value_with_size(
                timer.get().max(Duration::from_nanos(1)),
                copied,
                MeasurementUnit::GigabytesPerSecond,
                MeasurementType::Cpu,
                "Total (Cpu)",
            );
        }

        let end = partition.total();
        if dst[..end] != src[..end] {
            return Ok(TestResult::VerificationFail);
        }
        Ok(TestResult::Success)
    }
}

/// Submit every region to its queue concurrently and wait for all of them
fn copy_regions(
    queues: &[Box<dyn CommandQueue>],
    partition: &Partition,
    src: &[u8],
    dst: &mut [u8],
) -> cbench_backend::Result<Vec<Event>> {
    let targets = split_regions(dst, &partition.sizes);
    std::thread::scope(|scope| {
        let handles = queues
            .iter()
            .zip(targets)
            .zip(partition.offsets.iter().zip(&partition.sizes))
            .map(|((queue, target), (offset, size))| {
                let source = &src[*offset..*offset + *size];
                scope.spawn(move || -> cbench_backend::Result<Event> {
                    let event = queue.copy(source, target)?;
                    queue.finish()?;
                    Ok(event)
                })
            })
            .collect();
        join_all(handles).into_iter().collect()
    })
}
