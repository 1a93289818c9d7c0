//! Benchmark procedures
//!
//! Every benchmark follows the same shape: set up queues and buffers, run one
//! warmup iteration, run the timed loop pushing one sample per series, then
//! verify the results. [`register_all`] makes them known to the runner.

pub mod api_overhead;
pub mod common;
pub mod memory;
pub mod multithread;

use cbench_framework::Registry;

/// Register every benchmark in this crate.
pub fn register_all(registry: &mut Registry) {
    registry.register(memory::CopyBandwidth);
    registry.register(memory::UsmCopyMultipleBlits);
    registry.register(memory::UsmFillMultipleBlits);
    registry.register(api_overhead::QueueSubmissionOverhead);
    registry.register(multithread::MultithreadedCopy);
}

/// A registry holding every benchmark in this crate
pub fn registry() -> Registry {
    let mut registry = Registry::new();
    register_all(&mut registry);
    registry
}
