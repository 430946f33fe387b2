//! Protection key commands.

use std::path::Path;

use cs_crypto::ProtectionKey;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::KeyCommand;
use crate::config::OutputFormat;
use crate::output::{output, output_value, success};
use crate::CliConfig;

/// A configured key, without its material.
#[derive(Debug, Serialize, Tabled)]
pub struct KeyRow {
    /// Key ID.
    pub id: u32,
    /// Whether new tokens use this key.
    pub default: bool,
}

/// Runs a key command.
pub fn run_key(
    cmd: KeyCommand,
    config: &mut CliConfig,
    config_path: &Path,
    format: OutputFormat,
) -> crate::CliResult<()> {
    match cmd {
        KeyCommand::Generate { id, save } => generate_key(config, config_path, id, save, format),
        KeyCommand::List => list_keys(config, format),
    }
}

/// Generates a key, optionally storing it as the new default.
fn generate_key(
    config: &mut CliConfig,
    config_path: &Path,
    id: Option<u32>,
    save: bool,
    format: OutputFormat,
) -> crate::CliResult<()> {
    let id = match id {
        Some(id) => id,
        None => config.next_key_id()?,
    };
    let key = ProtectionKey::generate(id);

    if save {
        config.add_default_key(&key)?;
        config.save(config_path)?;
        success(&format!(
            "Added key {id} as default in {}",
            config_path.display()
        ));
    }

    output_value("key", &key.to_base64(), format)
}

/// Lists configured keys.
fn list_keys(config: &CliConfig, format: OutputFormat) -> crate::CliResult<()> {
    output(&key_rows(config)?, format)
}

/// Builds the rows shown by `key list`.
pub fn key_rows(config: &CliConfig) -> crate::CliResult<Vec<KeyRow>> {
    let keys = config.protection_keys()?;
    if keys.is_empty() {
        return Ok(Vec::new());
    }
    let default = config.effective_default_key()?;
    let mut rows: Vec<KeyRow> = keys
        .iter()
        .map(|k| KeyRow {
            id: k.id(),
            default: k.id() == default,
        })
        .collect();
    rows.sort_by_key(|r| r.id);
    Ok(rows)
}
