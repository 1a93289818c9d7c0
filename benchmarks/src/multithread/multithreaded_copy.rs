//! Concurrent copies from several host threads
//!
//! Every thread owns a queue and a pair of buffers. Within an iteration the
//! threads wait on a shared gate held for writing by the coordinator, so all
//! of them start submitting at the same moment once it is released. Each
//! thread records its own bandwidth under a `Thread N` series.

use crate::common::{join_all, pattern_bytes};
use cbench_backend::{Backend, CommandQueue, QueueProperties};
use cbench_framework::test_case::ensure;
use cbench_framework::{ArgumentError, ArgumentSpec, Benchmark, Statistics, TestArguments};
use cbench_shared::utils::time::Timer;
use cbench_shared::{Api, TestResult, TypeSelector};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tracing::debug;

const MAX_THREADS: usize = 64;

pub struct MultithreadedCopy;

pub struct MultithreadedCopyConfig {
    pub threads: usize,
    pub size: usize,
}

struct Worker {
    queue: Box<dyn CommandQueue>,
    src: Vec<u8>,
    dst: Vec<u8>,
}

impl Benchmark for MultithreadedCopy {
    type Config = MultithreadedCopyConfig;

    const NAME: &'static str = "MultithreadedCopy";
    const DESCRIPTION: &'static str =
        "Measures per-thread copy bandwidth when several host threads submit at once";
    const ARGUMENTS: &'static [ArgumentSpec] = &[
        ArgumentSpec::new("threads", "Number of submitting threads", "4"),
        ArgumentSpec::new("size", "Bytes copied by each thread", "16MB"),
    ];
    const APIS: &'static [Api] = &[Api::LevelZero, Api::Host];
    const CASES: &'static [&'static str] = &[
        "--threads=2 --size=16MB",
        "--threads=4 --size=16MB",
        "--threads=8 --size=4MB",
    ];

    fn configure(&self, args: &TestArguments) -> Result<MultithreadedCopyConfig, ArgumentError> {
        let threads: usize = args.get("threads")?;
        ensure(
            threads > 0 && threads <= MAX_THREADS,
            "threads",
            "must be between 1 and 64",
        )?;
        let size = args.size("size")?;
        ensure(size > 0, "size", "must be greater than 0")?;
        Ok(MultithreadedCopyConfig { threads, size })
    }

    fn type_selector(&self, _config: &MultithreadedCopyConfig) -> TypeSelector {
        TypeSelector::bandwidth(false)
    }

    fn run(
        &self,
        backend: &dyn Backend,
        config: &MultithreadedCopyConfig,
        iterations: usize,
        statistics: &dyn Statistics,
    ) -> cbench_backend::Result<TestResult> {
        let selector = self.type_selector(config);

        let mut workers = Vec::with_capacity(config.threads);
        for _ in 0..config.threads {
            let Some(queue) = backend.create_queue(&QueueProperties::create().allow_creation_fail())?
            else {
                return Ok(TestResult::DeviceNotCapable);
            };
            workers.push(Worker {
                queue,
                src: pattern_bytes(config.size),
                dst: vec![0u8; config.size],
            });
        }
        debug!("Starting {} copy threads of {} bytes", config.threads, config.size);

        // Warmup
        run_gated(&mut workers, |_, _| {})?;

        for _ in 0..iterations {
            run_gated(&mut workers, |thread, time| {
                statistics.push_value_with_size(
                    time.max(Duration::from_nanos(1)),
                    config.size as u64,
                    selector.unit,
                    selector.measurement_type,
                    &format!("Thread {}", thread),
                );
            })?;
        }

        if workers.iter().any(|worker| worker.dst != worker.src) {
            return Ok(TestResult::VerificationFail);
        }
        Ok(TestResult::Success)
    }
}

/// Run one copy per worker, all released by the same gate. `record` receives
/// the thread index and its host-measured copy time.
fn run_gated<F>(workers: &mut [Worker], record: F) -> cbench_backend::Result<()>
where
    F: Fn(usize, Duration) + Sync,
{
    let gate = RwLock::new(());
    let record = &record;
    let gate_ref = &gate;

    std::thread::scope(|scope| {
        let closed = gate.write().unwrap_or_else(PoisonError::into_inner);

        let handles = workers
            .iter_mut()
            .enumerate()
            .map(|(thread, worker)| {
                scope.spawn(move || -> cbench_backend::Result<()> {
                    let _open = gate_ref.read().unwrap_or_else(PoisonError::into_inner);
                    worker.dst.fill(0);

                    let mut timer = Timer::new();
                    timer.measure_start();
                    worker.queue.copy(&worker.src, &mut worker.dst)?;
                    worker.queue.finish()?;
                    timer.measure_end();

                    record(thread, timer.get());
                    Ok(())
                })
            })
            .collect();

        drop(closed);
        join_all(handles).into_iter().collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbench_backend::{open_backend, BackendConfig, ContextProperties, ExtensionProperties};
    use cbench_framework::TestCaseStatistics;

    fn configure(tokens: &[&str]) -> Result<MultithreadedCopyConfig, ArgumentError> {
        let args = TestArguments::parse(MultithreadedCopy::ARGUMENTS, tokens)?;
        Benchmark::configure(&MultithreadedCopy, &args)
    }

    #[test]
    fn test_thread_count_limits() {
        assert_eq!(configure(&[]).unwrap().threads, 4);
        assert!(configure(&["--threads=0"]).is_err());
        assert!(configure(&["--threads=65"]).is_err());
        assert!(configure(&["--threads=many"]).is_err());
    }

    #[test]
    fn test_each_thread_has_its_own_series() {
        let backend = open_backend(
            Api::Host,
            &BackendConfig::default(),
            &ContextProperties::create(),
            &ExtensionProperties::create(),
        )
        .unwrap();
        let config = configure(&["--threads=3", "--size=64KB"]).unwrap();
        let statistics = TestCaseStatistics::new(4, false);

        let result = MultithreadedCopy
            .run(backend.as_ref(), &config, 4, &statistics)
            .unwrap();
        assert_eq!(result, TestResult::Success);
        assert!(statistics.is_full());

        let report = statistics.report(0);
        let labels: Vec<&str> = report.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Thread 0", "Thread 1", "Thread 2"]);
        assert!(report.series.iter().all(|s| s.count == 4));
    }
}
