//! Measurement metadata
//!
//! Every value pushed into the statistics engine is tagged with a unit and a
//! measurement type. Together they describe what a reported number means.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit of a reported statistic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementUnit {
    Microseconds,
    Nanoseconds,
    GigabytesPerSecond,
    Latency,
    Percentage,
    CpuHardwareCounter,
    MicroJoules,
    Watts,
}

impl MeasurementUnit {
    /// Label printed next to the series name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Microseconds => "[us]",
            Self::Nanoseconds => "[ns]",
            Self::GigabytesPerSecond => "[GB/s]",
            Self::Latency => "[latency ns]",
            Self::Percentage => "[%]",
            Self::CpuHardwareCounter => "[count]",
            Self::MicroJoules => "[uJ]",
            Self::Watts => "[W]",
        }
    }

    /// Whether values in this unit are derived from a byte count
    pub fn is_rate(&self) -> bool {
        matches!(self, Self::GigabytesPerSecond)
    }
}

impl fmt::Display for MeasurementUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a duration was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementType {
    /// Host-side stopwatch
    Cpu,
    /// Device timestamp query
    Gpu,
}

impl MeasurementType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cpu => "CPU",
            Self::Gpu => "GPU",
        }
    }
}

impl fmt::Display for MeasurementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The (unit, type) pair a benchmark declares once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSelector {
    pub unit: MeasurementUnit,
    pub measurement_type: MeasurementType,
}

impl TypeSelector {
    pub fn new(unit: MeasurementUnit, measurement_type: MeasurementType) -> Self {
        Self {
            unit,
            measurement_type,
        }
    }

    /// Timing in microseconds, measured on the device when `use_events` is set
    /// and on the host otherwise.
    pub fn time(use_events: bool) -> Self {
        Self::new(MeasurementUnit::Microseconds, Self::type_for(use_events))
    }

    /// Bandwidth in GB/s, measured on the device when `use_events` is set.
    pub fn bandwidth(use_events: bool) -> Self {
        Self::new(MeasurementUnit::GigabytesPerSecond, Self::type_for(use_events))
    }

    fn type_for(use_events: bool) -> MeasurementType {
        if use_events {
            MeasurementType::Gpu
        } else {
            MeasurementType::Cpu
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_labels() {
        assert_eq!(MeasurementUnit::GigabytesPerSecond.to_string(), "[GB/s]");
        assert_eq!(MeasurementUnit::Microseconds.to_string(), "[us]");
        assert!(MeasurementUnit::GigabytesPerSecond.is_rate());
        assert!(!MeasurementUnit::Latency.is_rate());
    }

    #[test]
    fn test_type_selector_from_events_flag() {
        let gpu = TypeSelector::bandwidth(true);
        assert_eq!(gpu.unit, MeasurementUnit::GigabytesPerSecond);
        assert_eq!(gpu.measurement_type, MeasurementType::Gpu);

        let cpu = TypeSelector::time(false);
        assert_eq!(cpu.unit, MeasurementUnit::Microseconds);
        assert_eq!(cpu.measurement_type, MeasurementType::Cpu);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&MeasurementUnit::GigabytesPerSecond).unwrap();
        assert_eq!(json, "\"gigabytes_per_second\"");
        let back: MeasurementType = serde_json::from_str("\"gpu\"").unwrap();
        assert_eq!(back, MeasurementType::Gpu);
    }
}
