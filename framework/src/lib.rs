//! Benchmark execution framework
//!
//! Statistics collection, result printing, copy-engine partitioning and the
//! test case runner shared by every benchmark.

pub mod blit;
pub mod config;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod report;
pub mod runner;
pub mod statistics;
pub mod test_case;

pub use blit::{BlitSizeAssigner, Coverage};
pub use config::{Configuration, PrintType};
pub use error::{ArgumentError, ConfigError};
pub use metrics::Metrics;
pub use registry::Registry;
pub use report::{ReportPrinter, SeriesReport, StatisticsReport};
pub use runner::{Runner, TestOutcome};
pub use statistics::{Statistics, TestCaseStatistics, DEFAULT_SERIES};
pub use test_case::{ArgumentSpec, Benchmark, TestArguments, TestCase};
