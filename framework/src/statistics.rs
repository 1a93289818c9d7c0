//! Measurement aggregator
//!
//! Benchmarks push one sample per timed iteration, optionally into several
//! named series (per-engine throughput next to a "Total", for instance). The
//! runner turns the collected samples into a [`StatisticsReport`] once the run
//! completes.
//!
//! Misuse of the aggregator is a bug in the calling benchmark and panics:
//! continuing would print silently wrong numbers.

use crate::metrics::Metrics;
use crate::report::{SeriesReport, StatisticsReport};
use cbench_shared::{MeasurementType, MeasurementUnit, TypeSelector};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::warn;

/// Name of the unnamed series
pub const DEFAULT_SERIES: &str = "";

/// Sink for benchmark measurements.
///
/// All methods take `&self` so one instance can be shared by the threads of a
/// multithreaded benchmark.
pub trait Statistics: Sync {
    /// Record an elapsed time. `unit` must be a time unit.
    fn push_value(
        &self,
        time: Duration,
        unit: MeasurementUnit,
        measurement_type: MeasurementType,
        name: &str,
    );

    /// Record an elapsed time together with the bytes moved in it; stored as
    /// bandwidth. `unit` must be GB/s.
    fn push_value_with_size(
        &self,
        time: Duration,
        size: u64,
        unit: MeasurementUnit,
        measurement_type: MeasurementType,
        name: &str,
    );

    fn push_percentage(
        &self,
        value: f64,
        unit: MeasurementUnit,
        measurement_type: MeasurementType,
        name: &str,
    );

    fn push_cpu_counter(
        &self,
        count: u64,
        unit: MeasurementUnit,
        measurement_type: MeasurementType,
        name: &str,
    );

    fn push_energy(
        &self,
        micro_joules: u64,
        unit: MeasurementUnit,
        measurement_type: MeasurementType,
        name: &str,
    );

    fn push_power(
        &self,
        watts: f64,
        unit: MeasurementUnit,
        measurement_type: MeasurementType,
        name: &str,
    );

    /// Declare the measurement shape of a run that produces no samples.
    fn push_unit_and_type(&self, unit: MeasurementUnit, measurement_type: MeasurementType);

    fn is_empty(&self) -> bool;

    /// Every series holds exactly the requested number of samples
    fn is_full(&self) -> bool;
}

/// Samples of one named series
#[derive(Debug, Clone, PartialEq)]
pub struct Samples {
    pub unit: MeasurementUnit,
    pub measurement_type: MeasurementType,
    pub values: Vec<f64>,
}

#[derive(Debug, Default)]
struct State {
    series: BTreeMap<String, Samples>,
    declared: Option<TypeSelector>,
    reached_infinity: bool,
}

/// Statistics collected for one test case on one API
#[derive(Debug)]
pub struct TestCaseStatistics {
    max_samples: usize,
    do_not_print_bandwidth: bool,
    state: Mutex<State>,
}

impl TestCaseStatistics {
    /// `max_samples` is the number of iterations each series must record.
    /// With `do_not_print_bandwidth`, GB/s measurements are stored in µs.
    pub fn new(max_samples: usize, do_not_print_bandwidth: bool) -> Self {
        Self {
            max_samples,
            do_not_print_bandwidth,
            state: Mutex::new(State::default()),
        }
    }

    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn override_unit(&self, unit: MeasurementUnit) -> MeasurementUnit {
        if unit == MeasurementUnit::GigabytesPerSecond && self.do_not_print_bandwidth {
            MeasurementUnit::Microseconds
        } else {
            unit
        }
    }

    fn record(
        &self,
        value: f64,
        name: &str,
        unit: MeasurementUnit,
        measurement_type: MeasurementType,
    ) {
        let mut state = self.state();
        if let Some(declared) = state.declared {
            if !state.series.contains_key(name)
                && (declared.unit != unit || declared.measurement_type != measurement_type)
            {
                warn!(
                    "Measurement {:?} recorded as {} {} but the test declared {} {}",
                    name, measurement_type, unit, declared.measurement_type, declared.unit
                );
            }
        }
        let samples = state.series.entry(name.to_string()).or_insert_with(|| Samples {
            unit,
            measurement_type,
            values: Vec::with_capacity(self.max_samples),
        });

        if samples.values.len() >= self.max_samples {
            panic!("Too many values pushed by the test");
        }
        if samples.unit != unit {
            panic!(
                "Different units used for the same measurement ({} vs {})",
                samples.unit, unit
            );
        }
        if samples.measurement_type != measurement_type {
            panic!(
                "Different types used for the same measurement ({} vs {})",
                samples.measurement_type, measurement_type
            );
        }

        samples.values.push(value);
        if value >= f64::MAX {
            state.reached_infinity = true;
        }
    }

    /// Summarize every series.
    ///
    /// A run that only declared its shape yields a single empty series with
    /// the declared unit and type.
    pub fn report(&self, iterations_to_skip: usize) -> StatisticsReport {
        let state = self.state();

        let mut series: Vec<SeriesReport> = state
            .series
            .iter()
            .map(|(name, samples)| SeriesReport {
                label: name.clone(),
                unit: samples.unit,
                measurement_type: samples.measurement_type,
                count: samples.values.len(),
                metrics: Metrics::compute(&samples.values, iterations_to_skip),
                samples: samples.values.clone(),
            })
            .collect();

        if series.is_empty() {
            if let Some(declared) = state.declared {
                series.push(SeriesReport {
                    label: DEFAULT_SERIES.to_string(),
                    unit: declared.unit,
                    measurement_type: declared.measurement_type,
                    count: 0,
                    metrics: None,
                    samples: Vec::new(),
                });
            }
        }

        StatisticsReport {
            series,
            declared: state.declared,
            reached_infinity: state.reached_infinity,
        }
    }
}

fn check_duration(time: Duration) {
    if time.is_zero() {
        panic!("Measured duration must be greater than zero, the timer is broken");
    }
}

impl Statistics for TestCaseStatistics {
    fn push_value(
        &self,
        time: Duration,
        unit: MeasurementUnit,
        measurement_type: MeasurementType,
        name: &str,
    ) {
        check_duration(time);
        let seconds = time.as_secs_f64();
        let unit = self.override_unit(unit);

        let value = match unit {
            MeasurementUnit::Microseconds => seconds * 1e6,
            MeasurementUnit::Nanoseconds | MeasurementUnit::Latency => seconds * 1e9,
            MeasurementUnit::GigabytesPerSecond => {
                panic!("Buffer size needs to be passed when unit is {}", unit)
            }
            other => panic!("Unit {} is not a time unit", other),
        };
        self.record(value, name, unit, measurement_type);
    }

    fn push_value_with_size(
        &self,
        time: Duration,
        size: u64,
        unit: MeasurementUnit,
        measurement_type: MeasurementType,
        name: &str,
    ) {
        if unit != MeasurementUnit::GigabytesPerSecond {
            panic!("Test is passing size which requires bandwidth calculation, please fix benchmark");
        }
        check_duration(time);
        let seconds = time.as_secs_f64();
        let unit = self.override_unit(unit);

        let value = match unit {
            MeasurementUnit::Microseconds => seconds * 1e6,
            // Bytes per nanosecond equals gigabytes per second
            _ => size as f64 / (seconds * 1e9),
        };
        self.record(value, name, unit, measurement_type);
    }

    fn push_percentage(
        &self,
        value: f64,
        unit: MeasurementUnit,
        measurement_type: MeasurementType,
        name: &str,
    ) {
        if unit != MeasurementUnit::Percentage {
            panic!("Incorrect measurement unit {} for a percentage", unit);
        }
        self.record(value, name, unit, measurement_type);
    }

    fn push_cpu_counter(
        &self,
        count: u64,
        unit: MeasurementUnit,
        measurement_type: MeasurementType,
        name: &str,
    ) {
        if unit != MeasurementUnit::CpuHardwareCounter {
            panic!("Incorrect measurement unit {} for a cpu counter", unit);
        }
        self.record(count as f64, name, unit, measurement_type);
    }

    fn push_energy(
        &self,
        micro_joules: u64,
        unit: MeasurementUnit,
        measurement_type: MeasurementType,
        name: &str,
    ) {
        if unit != MeasurementUnit::MicroJoules {
            panic!("Incorrect measurement unit {} for energy", unit);
        }
        self.record(micro_joules as f64, name, unit, measurement_type);
    }

    fn push_power(
        &self,
        watts: f64,
        unit: MeasurementUnit,
        measurement_type: MeasurementType,
        name: &str,
    ) {
        if unit != MeasurementUnit::Watts {
            panic!("Incorrect measurement unit {} for power", unit);
        }
        self.record(watts, name, unit, measurement_type);
    }

    fn push_unit_and_type(&self, unit: MeasurementUnit, measurement_type: MeasurementType) {
        let unit = self.override_unit(unit);
        self.state().declared = Some(TypeSelector::new(unit, measurement_type));
    }

    fn is_empty(&self) -> bool {
        self.state()
            .series
            .values()
            .all(|samples| samples.values.is_empty())
    }

    fn is_full(&self) -> bool {
        let state = self.state();
        if state.series.is_empty() {
            warn!("Test did not generate any values");
        }
        state
            .series
            .values()
            .all(|samples| samples.values.len() == self.max_samples)
    }
}
