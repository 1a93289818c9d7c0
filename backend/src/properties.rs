//! Declarative setup objects
//!
//! Benchmarks describe the context, queue and extensions they need with these
//! builders; the backend turns them into driver calls.

use cbench_shared::{DeviceSelection, Engine};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueProperties {
    pub profiling: bool,
    pub selected_engine: Option<Engine>,
    pub out_of_order: bool,
    pub require_creation_success: bool,
    pub device_selection: Option<DeviceSelection>,
}

impl QueueProperties {
    pub fn create() -> Self {
        Self {
            profiling: false,
            selected_engine: None,
            out_of_order: false,
            require_creation_success: true,
            device_selection: None,
        }
    }

    pub fn set_profiling(mut self, profiling: bool) -> Self {
        self.profiling = profiling;
        self
    }

    pub fn set_force_blitter(mut self, force: bool) -> Self {
        self.selected_engine = if force { Some(Engine::Bcs) } else { None };
        self
    }

    pub fn set_force_engine(mut self, engine: Engine) -> Self {
        self.selected_engine = Some(engine);
        self
    }

    pub fn set_ooq(mut self, out_of_order: bool) -> Self {
        self.out_of_order = out_of_order;
        self
    }

    pub fn allow_creation_fail(mut self) -> Self {
        self.require_creation_success = false;
        self
    }

    /// Queues live on exactly one device; naming more than one is a benchmark bug.
    pub fn set_device_selection(mut self, selection: DeviceSelection) -> Self {
        if !selection.has_single_device() {
            panic!("Queue can be created only on a single device, got {}", selection);
        }
        self.device_selection = Some(selection);
        self
    }
}

impl Default for QueueProperties {
    fn default() -> Self {
        Self::create()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextProperties {
    pub create_context: bool,
    pub device_selection: Option<DeviceSelection>,
}

impl ContextProperties {
    pub fn create() -> Self {
        Self {
            create_context: true,
            device_selection: None,
        }
    }

    pub fn disable() -> Self {
        Self {
            create_context: false,
            device_selection: None,
        }
    }

    pub fn set_device_selection(mut self, selection: DeviceSelection) -> Self {
        self.device_selection = Some(selection);
        self
    }
}

impl Default for ContextProperties {
    fn default() -> Self {
        Self::create()
    }
}

/// Optional driver extensions a benchmark wants loaded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionProperties {
    pub counter_based_events: bool,
    pub graph: bool,
    pub import_host_pointer: bool,
}

impl ExtensionProperties {
    pub fn create() -> Self {
        Self::default()
    }

    pub fn set_counter_based_events(mut self, enabled: bool) -> Self {
        self.counter_based_events = enabled;
        self
    }

    pub fn set_graph(mut self, enabled: bool) -> Self {
        self.graph = enabled;
        self
    }

    pub fn set_import_host_pointer(mut self, enabled: bool) -> Self {
        self.import_host_pointer = enabled;
        self
    }

    /// Names of the requested extensions
    pub fn requested(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.counter_based_events {
            names.push("counter_based_events");
        }
        if self.graph {
            names.push("graph");
        }
        if self.import_host_pointer {
            names.push("import_host_pointer");
        }
        names
    }
}
