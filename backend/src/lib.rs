//! Compute API resource wrappers
//!
//! A backend owns the driver, device and context handles of one compute API and
//! hands out command queues bound to specific engines. Benchmarks are written
//! once against the [`Backend`] and [`CommandQueue`] traits and run on whichever
//! API the runner selected.

pub mod host;
pub mod properties;

pub use properties::{ContextProperties, ExtensionProperties, QueueProperties};

use cbench_shared::{Api, DeviceSelection, Engine};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("{0} support is not built into this binary")]
    UnsupportedApi(Api),

    #[error("driver index {0} not found")]
    DriverNotFound(usize),

    #[error("device index {0} not found")]
    DeviceNotFound(usize),

    #[error("device selection {0} is not available")]
    DeviceSelectionUnavailable(DeviceSelection),

    #[error("context creation was disabled")]
    NoContext,

    #[error("engine {0} is not available on this device")]
    EngineUnavailable(Engine),

    #[error("extension {0} is not supported by the driver")]
    ExtensionUnavailable(&'static str),

    #[error("copy regions differ in size (src {src} bytes, dst {dst} bytes)")]
    RegionMismatch { src: usize, dst: usize },

    #[error("fill pattern of {pattern} bytes does not tile a {size} byte region")]
    InvalidPattern { pattern: usize, size: usize },

    #[error("queue was created without profiling")]
    ProfilingNotEnabled,
}

pub type Result<T> = std::result::Result<T, BackendError>;

/// Device selection parameters shared by every backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Driver (platform) index
    pub driver_index: usize,

    /// Device index inside the driver
    pub device_index: usize,

    /// Device or sub-device the context is created on
    pub device_selection: DeviceSelection,

    /// Number of link copy engines exposed by the host device
    pub link_copy_engines: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            driver_index: 0,
            device_index: 0,
            device_selection: DeviceSelection::ROOT,
            link_copy_engines: host::DEFAULT_LINK_COPY_ENGINES,
        }
    }
}

/// Static description of an opened device
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub api: Api,
    pub name: String,
    pub engines: Vec<Engine>,
    pub timer_resolution: Duration,
}

/// Device-side timestamps of one command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    /// Time the command was handed to the queue, on the device clock
    pub enqueued: Duration,
    /// Start and end of execution; absent when profiling is off
    pub profiling: Option<(Duration, Duration)>,
}

impl Event {
    /// Execution time measured by the device
    pub fn duration(&self) -> Result<Duration> {
        let (start, end) = self.profiling.ok_or(BackendError::ProfilingNotEnabled)?;
        Ok(end.saturating_sub(start))
    }

    /// Time between enqueue and execution start
    pub fn submission_time(&self) -> Result<Duration> {
        let (start, _) = self.profiling.ok_or(BackendError::ProfilingNotEnabled)?;
        Ok(start.saturating_sub(self.enqueued))
    }
}

/// An opened driver/device/context triple
pub trait Backend: Send + Sync {
    fn api(&self) -> Api;

    fn device_info(&self) -> DeviceInfo;

    /// Copy engines available on the device, main engine first
    fn copy_engines(&self) -> Vec<Engine> {
        self.device_info()
            .engines
            .into_iter()
            .filter(|engine| engine.is_copy_engine())
            .collect()
    }

    /// Create a queue for the given properties.
    ///
    /// Returns `Ok(None)` when the requested engine is missing and the
    /// properties allow creation to fail.
    fn create_queue(&self, properties: &QueueProperties) -> Result<Option<Box<dyn CommandQueue>>>;
}

/// A queue bound to one engine
pub trait CommandQueue: Send + Sync {
    fn engine(&self) -> Engine;

    fn copy(&self, src: &[u8], dst: &mut [u8]) -> Result<Event>;

    fn fill(&self, dst: &mut [u8], pattern: &[u8]) -> Result<Event>;

    /// Block until every submitted command has completed
    fn finish(&self) -> Result<()>;
}

/// APIs this binary can open a backend for
pub fn supported_apis() -> &'static [Api] {
    &[Api::Host]
}

pub fn is_api_supported(api: Api) -> bool {
    supported_apis().contains(&api)
}

/// Open a backend for `api`.
pub fn open_backend(
    api: Api,
    config: &BackendConfig,
    context: &ContextProperties,
    extensions: &ExtensionProperties,
) -> Result<Box<dyn Backend>> {
    debug!(
        "Opening {} backend (driver={} device={} selection={})",
        api, config.driver_index, config.device_index, config.device_selection
    );
    match api {
        Api::Host => Ok(Box::new(host::HostBackend::new(config, context, extensions)?)),
        other => Err(BackendError::UnsupportedApi(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_host_is_supported() {
        assert!(is_api_supported(Api::Host));
        assert!(!is_api_supported(Api::OpenCl));

        let err = open_backend(
            Api::LevelZero,
            &BackendConfig::default(),
            &ContextProperties::create(),
            &ExtensionProperties::create(),
        )
        .err();
        assert_eq!(err, Some(BackendError::UnsupportedApi(Api::LevelZero)));
    }

    #[test]
    fn test_event_durations() {
        let event = Event {
            enqueued: Duration::from_nanos(100),
            profiling: Some((Duration::from_nanos(150), Duration::from_nanos(400))),
        };
        assert_eq!(event.duration().unwrap(), Duration::from_nanos(250));
        assert_eq!(event.submission_time().unwrap(), Duration::from_nanos(50));

        let unprofiled = Event {
            enqueued: Duration::ZERO,
            profiling: None,
        };
        assert_eq!(unprofiled.duration(), Err(BackendError::ProfilingNotEnabled));
    }

    #[test]
    fn test_backend_config_from_toml() {
        let config: BackendConfig =
            toml::from_str("device_selection = \"tile0\"\nlink_copy_engines = 4\n").unwrap();
        assert_eq!(config.device_selection, DeviceSelection::TILE0);
        assert_eq!(config.link_copy_engines, 4);
        assert_eq!(config.driver_index, 0);
    }
}
