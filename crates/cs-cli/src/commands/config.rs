//! Configuration management commands.

use std::path::Path;

use cs_crypto::ProtectionKey;

use crate::cli::ConfigCommand;
use crate::config::OutputFormat;
use crate::output::{info, success};
use crate::{CliConfig, CliError};

const REDACTED: &str = "<redacted>";

/// Runs a config command.
pub fn run_config(
    cmd: ConfigCommand,
    config: &mut CliConfig,
    config_path: &Path,
    format: OutputFormat,
) -> crate::CliResult<()> {
    match cmd {
        ConfigCommand::Show => show_config(config, config_path, format),
        ConfigCommand::Path => {
            println!("{}", config_path.display());
            Ok(())
        }
        ConfigCommand::Init { force } => init_config(config, config_path, force),
    }
}

/// Shows the current configuration with secrets masked.
fn show_config(config: &CliConfig, config_path: &Path, format: OutputFormat) -> crate::CliResult<()> {
    let shown = redacted(config);
    match format {
        OutputFormat::Table => {
            info(&format!("Configuration file: {}", config_path.display()));
            let content = toml::to_string_pretty(&shown)
                .map_err(|e| CliError::Config(format!("failed to serialize config: {e}")))?;
            println!("{content}");
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&shown)?),
        OutputFormat::Quiet => {}
    }
    Ok(())
}

/// Returns a copy with key material and the Redis password masked.
fn redacted(config: &CliConfig) -> CliConfig {
    let mut shown = config.clone();
    for material in shown.keys.values_mut() {
        *material = REDACTED.to_string();
    }
    if shown.redis.password.is_some() {
        shown.redis.password = Some(REDACTED.to_string());
    }
    shown
}

/// Writes a default configuration with one fresh key.
fn init_config(config: &mut CliConfig, config_path: &Path, force: bool) -> crate::CliResult<()> {
    if config_path.exists() && !force {
        return Err(CliError::InvalidArgument(format!(
            "{} already exists; use --force to overwrite",
            config_path.display()
        )));
    }

    let mut fresh = CliConfig::default();
    fresh.add_default_key(&ProtectionKey::generate(1))?;
    fresh.save(config_path)?;
    *config = fresh;

    success(&format!("Wrote {}", config_path.display()));
    Ok(())
}
