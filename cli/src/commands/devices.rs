//! Devices command implementation

use crate::output;
use anyhow::{Context, Result};
use cbench_backend::{
    is_api_supported, open_backend, BackendConfig, ContextProperties, DeviceInfo,
    ExtensionProperties,
};
use cbench_framework::Configuration;
use cbench_shared::Api;
use clap::Args;
use std::path::PathBuf;
use tracing::debug;

#[derive(Args, Debug)]
pub struct DevicesArgs {
    /// TOML configuration file providing the device selection
    #[arg(short, long, env = "CBENCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Link copy engines exposed by the host device
    #[arg(long)]
    pub link_copy_engines: Option<usize>,
}

fn describe(info: &DeviceInfo) -> String {
    let engines: Vec<&str> = info.engines.iter().map(|engine| engine.name()).collect();
    format!(
        "{} [engines: {}] [timer resolution: {:?}]",
        info.name,
        engines.join(" "),
        info.timer_resolution
    )
}

fn query_device(api: Api, config: &BackendConfig) -> Result<DeviceInfo, String> {
    if !is_api_supported(api) {
        return Err(format!("{} support is not built into this binary", api));
    }
    open_backend(
        api,
        config,
        &ContextProperties::create(),
        &ExtensionProperties::create(),
    )
    .map(|backend| backend.device_info())
    .map_err(|e| e.to_string())
}

pub fn run(args: DevicesArgs) -> Result<()> {
    let mut config =
        Configuration::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(count) = args.link_copy_engines {
        config.backend.link_copy_engines = count;
    }
    debug!("Probing devices with {:?}", config.backend);

    for api in Api::ALL {
        match query_device(api, &config.backend) {
            Ok(info) => output::success(&format!("{}: {}", api, describe(&info))),
            Err(reason) if !is_api_supported(api) => {
                output::warning(&format!("{}: {}", api, reason))
            }
            Err(reason) => output::error(&format!("{}: {}", api, reason)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_host_and_missing_apis() {
        let config = BackendConfig {
            link_copy_engines: 1,
            ..BackendConfig::default()
        };
        let info = query_device(Api::Host, &config).unwrap();
        let text = describe(&info);
        assert!(text.contains("CCS0 BCS BCS1"));

        let err = query_device(Api::OpenCl, &config).unwrap_err();
        assert!(err.contains("not built"));

        let bad = BackendConfig {
            device_index: 3,
            ..BackendConfig::default()
        };
        assert!(query_device(Api::Host, &bad).unwrap_err().contains("device index 3"));
    }
}
