//! Benchmarks sharing one device between host threads

mod multithreaded_copy;

pub use multithreaded_copy::{MultithreadedCopy, MultithreadedCopyConfig};
