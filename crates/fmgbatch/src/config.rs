//! Connection settings for commands that talk to the appliance.
//!
//! Wraps `fmgbatch_config` with the `GlobalOpts` overrides and hands the
//! core crate a ready `ManagerConfig`.

use std::time::Duration;

use tracing::debug;

use fmgbatch_core::{ManagerConfig, PolicyPackage};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Load and validate settings, applying `--timeout`.
pub fn manager_config(global: &GlobalOpts) -> Result<ManagerConfig, CliError> {
    let settings =
        fmgbatch_config::load_settings(global.config.as_deref(), global.env_file.as_deref())?;
    debug!(settings = %settings.redacted(), "loaded settings");

    let mut config = settings.into_manager_config()?;
    if let Some(secs) = global.timeout {
        if secs == 0 {
            return Err(CliError::Config {
                message: "--timeout must be at least 1 second".into(),
            });
        }
        config.timeout = Duration::from_secs(secs);
    }
    Ok(config)
}

/// Build the remote package handle. No request is sent yet.
pub fn connect(config: &ManagerConfig) -> Result<PolicyPackage, CliError> {
    debug!(
        url = %config.url,
        adom = %config.scope.adom,
        package = %config.scope.package,
        "connecting"
    );
    Ok(PolicyPackage::connect(config)?)
}
