//! Shared utility functions used across command modules.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use nautodog_core::config::{self, ConfigManager, TransferSettings};

use crate::error::CliError;

/// Resolves the configuration file from the `--config` flag or the
/// default location.
pub fn config_file_path(config_path: Option<&Path>) -> Result<PathBuf, CliError> {
    match config_path {
        Some(path) => Ok(path.to_path_buf()),
        None => config::default_config_path().ok_or_else(|| {
            CliError::Config("could not determine the user configuration directory".into())
        }),
    }
}

/// Installs the process-wide configuration manager and returns it.
pub fn load_config(config_path: Option<&Path>) -> Result<Arc<ConfigManager>, CliError> {
    let path = config_file_path(config_path)?;
    config::initialize(&path, false).map_err(CliError::from)
}

/// Reads transfer settings from the configuration.
///
/// An explicit `--config` must load. Without one, the default file is used
/// when it exists and built-in defaults otherwise.
pub fn transfer_settings(config_path: Option<&Path>) -> Result<TransferSettings, CliError> {
    let use_file = match config_path {
        Some(_) => true,
        None => config::default_config_path().is_some_and(|path| path.is_file()),
    };
    if !use_file {
        tracing::debug!("No configuration file, using default transfer settings");
        return Ok(TransferSettings::default());
    }

    let manager = load_config(config_path)?;
    TransferSettings::from_config(&manager).map_err(CliError::from)
}

/// Formats parameters as `k='v', ...` for command logging
pub fn format_params(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{k}='{v}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
