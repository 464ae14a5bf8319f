//! Configuration inspection commands.

use std::path::Path;

use serde_yaml::Value;

use crate::cli::{ConfigCommands, DumpFormat};
use crate::error::CliError;
use crate::util::{config_file_path, load_config};

use super::log_command;

/// Config command handler
pub fn cmd_config(config_path: Option<&Path>, command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show { format } => {
            log_command("nautodog config show", &[("format", format!("{format:?}"))]);
            let config = load_config(config_path)?;
            let text = match format {
                DumpFormat::Yaml => config.to_yaml()?,
                DumpFormat::Json => config.to_json()?,
            };
            println!("{}", text.trim_end());
            Ok(())
        }
        ConfigCommands::Get { key } => {
            log_command("nautodog config get", &[("key", key.clone())]);
            let config = load_config(config_path)?;
            let value = config.get(&key)?;
            println!("{}", render_value(&value)?);
            Ok(())
        }
        ConfigCommands::Missing { keys } => {
            log_command("nautodog config missing", &[("keys", keys.join(","))]);
            let config = load_config(config_path)?;
            for key in &keys {
                let _ = config.get(key);
            }

            let missing = config.missing_keys();
            if missing.is_empty() {
                println!("All {} keys are defined.", keys.len());
                return Ok(());
            }
            println!("Missing keys:");
            for entry in &missing {
                println!("  {} ({} lookups)", entry.path, entry.attempts);
            }
            Err(CliError::Config(format!(
                "{} of {} keys are not defined",
                missing.len(),
                keys.len()
            )))
        }
        ConfigCommands::Path => {
            let path = config_file_path(config_path)?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

/// Scalars print bare; mappings and sequences print as YAML
fn render_value(value: &Value) -> Result<String, CliError> {
    match value {
        Value::Null => Ok("null".to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s.clone()),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .map_err(|e| CliError::Output(format!("Failed to render value: {e}"))),
    }
}
