//! Host reference device
//!
//! A CPU stand-in for a GPU with one compute engine, one main blitter and a
//! configurable number of link blitters. Commands execute synchronously on the
//! calling thread and are timestamped against a monotonic device clock, so
//! benchmarks can be exercised end to end on machines without a GPU driver.

mod queue;

pub use queue::HostQueue;

use crate::{
    Backend, BackendConfig, BackendError, CommandQueue, ContextProperties, DeviceInfo,
    ExtensionProperties, QueueProperties, Result,
};
use cbench_shared::{Api, DeviceSelection, Engine};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const DEFAULT_LINK_COPY_ENGINES: usize = 2;

const MAX_LINK_COPY_ENGINES: usize = 8;

const SUPPORTED_EXTENSIONS: &[&str] = &["counter_based_events", "import_host_pointer"];

#[derive(Debug)]
pub struct HostBackend {
    engines: Vec<Engine>,
    context_created: bool,
    device_clock: Instant,
}

impl HostBackend {
    pub fn new(
        config: &BackendConfig,
        context: &ContextProperties,
        extensions: &ExtensionProperties,
    ) -> Result<Self> {
        if config.driver_index != 0 {
            return Err(BackendError::DriverNotFound(config.driver_index));
        }
        if config.device_index != 0 {
            return Err(BackendError::DeviceNotFound(config.device_index));
        }

        let selection = context.device_selection.unwrap_or(config.device_selection);
        check_selection(selection)?;

        if let Some(missing) = extensions
            .requested()
            .into_iter()
            .find(|name| !SUPPORTED_EXTENSIONS.contains(name))
        {
            return Err(BackendError::ExtensionUnavailable(missing));
        }

        let mut link_count = config.link_copy_engines;
        if link_count > MAX_LINK_COPY_ENGINES {
            warn!(
                "Host device supports at most {} link copy engines, {} requested",
                MAX_LINK_COPY_ENGINES, link_count
            );
            link_count = MAX_LINK_COPY_ENGINES;
        }

        let mut engines = vec![Engine::Ccs0, Engine::Bcs];
        engines.extend((0..link_count).filter_map(Engine::link_copy_from_index));
        debug!("Host device engines: {:?}", engines);

        Ok(Self {
            engines,
            context_created: context.create_context,
            device_clock: Instant::now(),
        })
    }
}

/// The host device has no sub-devices
fn check_selection(selection: DeviceSelection) -> Result<()> {
    let whole_device = DeviceSelection::ROOT | DeviceSelection::HOST;
    if selection.is_empty() || !whole_device.contains(selection) {
        return Err(BackendError::DeviceSelectionUnavailable(selection));
    }
    Ok(())
}

impl Backend for HostBackend {
    fn api(&self) -> Api {
        Api::Host
    }

    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            api: Api::Host,
            name: format!("Host reference device ({} threads)", available_threads()),
            engines: self.engines.clone(),
            timer_resolution: Duration::from_nanos(1),
        }
    }

    fn create_queue(&self, properties: &QueueProperties) -> Result<Option<Box<dyn CommandQueue>>> {
        if !self.context_created {
            return Err(BackendError::NoContext);
        }
        if let Some(selection) = properties.device_selection {
            check_selection(selection)?;
        }

        let engine = properties.selected_engine.unwrap_or(Engine::Ccs0);
        if !self.engines.contains(&engine) {
            if properties.require_creation_success {
                return Err(BackendError::EngineUnavailable(engine));
            }
            debug!("Engine {} not available, queue creation skipped", engine);
            return Ok(None);
        }

        Ok(Some(Box::new(HostQueue::new(
            engine,
            properties.profiling,
            self.device_clock,
        ))))
    }
}

fn available_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(config: &BackendConfig) -> Result<HostBackend> {
        HostBackend::new(config, &ContextProperties::create(), &ExtensionProperties::create())
    }

    #[test]
    fn test_engines_follow_link_count() {
        let config = BackendConfig {
            link_copy_engines: 3,
            ..BackendConfig::default()
        };
        let backend = open(&config).unwrap();
        assert_eq!(
            backend.copy_engines(),
            vec![Engine::Bcs, Engine::Bcs1, Engine::Bcs2, Engine::Bcs3]
        );
    }

    #[test]
    fn test_link_count_is_clamped() {
        let config = BackendConfig {
            link_copy_engines: 12,
            ..BackendConfig::default()
        };
        let backend = open(&config).unwrap();
        assert_eq!(backend.copy_engines().len(), 1 + MAX_LINK_COPY_ENGINES);
    }

    #[test]
    fn test_device_indices_are_checked() {
        let config = BackendConfig {
            device_index: 1,
            ..BackendConfig::default()
        };
        assert_eq!(open(&config).err(), Some(BackendError::DeviceNotFound(1)));

        let config = BackendConfig {
            device_selection: DeviceSelection::TILE1,
            ..BackendConfig::default()
        };
        assert_eq!(
            open(&config).err(),
            Some(BackendError::DeviceSelectionUnavailable(DeviceSelection::TILE1))
        );
    }

    #[test]
    fn test_unsupported_extension() {
        let result = HostBackend::new(
            &BackendConfig::default(),
            &ContextProperties::create(),
            &ExtensionProperties::create().set_graph(true),
        );
        assert_eq!(result.err(), Some(BackendError::ExtensionUnavailable("graph")));
    }

    #[test]
    fn test_missing_engine_queue_creation() {
        let backend = open(&BackendConfig {
            link_copy_engines: 1,
            ..BackendConfig::default()
        })
        .unwrap();

        let strict = QueueProperties::create().set_force_engine(Engine::Bcs4);
        assert_eq!(
            backend.create_queue(&strict).err(),
            Some(BackendError::EngineUnavailable(Engine::Bcs4))
        );

        let lenient = strict.allow_creation_fail();
        assert!(backend.create_queue(&lenient).unwrap().is_none());

        let queue = backend
            .create_queue(&QueueProperties::create().set_force_blitter(true))
            .unwrap()
            .unwrap();
        assert_eq!(queue.engine(), Engine::Bcs);
    }

    #[test]
    fn test_disabled_context_has_no_queues() {
        let backend = HostBackend::new(
            &BackendConfig::default(),
            &ContextProperties::disable(),
            &ExtensionProperties::create(),
        )
        .unwrap();
        assert_eq!(
            backend.create_queue(&QueueProperties::create()).err(),
            Some(BackendError::NoContext)
        );
    }
}
