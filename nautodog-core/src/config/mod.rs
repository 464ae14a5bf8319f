//! Configuration management for Nautodog.
//!
//! [`ConfigManager`] loads a YAML document and resolves dotted key paths
//! against it, recording every lookup that misses. A single manager can be
//! installed process-wide with [`initialize`] and retrieved with
//! [`instance`]. [`TransferSettings`] are read from its `remote` section.

mod manager;
mod settings;

pub use manager::{
    ConfigManager, DEFAULT_CONFIG_FILE, MissingKey, default_config_path, initialize, instance,
};
pub use settings::{BackupPolicy, REMOTE_SECTION, TransferSettings};
