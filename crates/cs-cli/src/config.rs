//! CLI configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cs_cache_redis::RedisConfig;
use cs_crypto::{KeyRing, ProtectionKey};
use cs_state::StateCodecConfig;
use serde::{Deserialize, Serialize};

use crate::{CliError, CliResult};

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Cache backend.
    pub backend: Backend,

    /// Output format.
    pub output_format: OutputFormat,

    /// ID of the key used for new tokens (defaults to the highest ID).
    pub default_key: Option<u32>,

    /// State codec settings.
    pub state: StateCodecConfig,

    /// Redis connection settings, used when `backend = "redis"`.
    pub redis: RedisConfig,

    /// Protection keys by ID, as standard base64.
    pub keys: BTreeMap<String, String>,
}

impl CliConfig {
    /// Loads configuration from `path`, or defaults if it does not exist.
    pub fn load(path: &Path) -> CliResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)
                .map_err(|e| CliError::Config(format!("failed to parse config: {e}")))
        } else {
            Ok(Self::default())
        }
    }

    /// Saves configuration to `path`.
    pub fn save(&self, path: &Path) -> CliResult<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Gets the default configuration file path.
    pub fn config_path() -> CliResult<PathBuf> {
        let home = dirs_next::home_dir()
            .ok_or_else(|| CliError::Config("could not determine home directory".to_string()))?;
        Ok(home.join(".cstate").join("cstate.toml"))
    }

    /// Returns `explicit` if given, otherwise the default path.
    pub fn resolve_path(explicit: Option<&Path>) -> CliResult<PathBuf> {
        match explicit {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::config_path(),
        }
    }

    /// Parses the configured protection keys.
    pub fn protection_keys(&self) -> CliResult<Vec<ProtectionKey>> {
        self.keys
            .iter()
            .map(|(id, material)| {
                let id = id
                    .parse::<u32>()
                    .map_err(|_| CliError::Config(format!("invalid key id '{id}'")))?;
                ProtectionKey::from_base64(id, material).map_err(CliError::from)
            })
            .collect()
    }

    /// Returns the effective default key ID.
    pub fn effective_default_key(&self) -> CliResult<u32> {
        if let Some(id) = self.default_key {
            return Ok(id);
        }
        self.protection_keys()?
            .iter()
            .map(ProtectionKey::id)
            .max()
            .ok_or_else(no_keys)
    }

    /// Builds the key ring from the configured keys.
    pub fn key_ring(&self) -> CliResult<KeyRing> {
        let keys = self.protection_keys()?;
        if keys.is_empty() {
            return Err(no_keys());
        }
        let default = self.effective_default_key()?;
        KeyRing::from_keys(keys, default).map_err(CliError::from)
    }

    /// Next unused key ID.
    pub fn next_key_id(&self) -> CliResult<u32> {
        match self.protection_keys()?.iter().map(ProtectionKey::id).max() {
            Some(max) => max.checked_add(1).ok_or_else(|| {
                CliError::Config("key ids exhausted; pass an explicit --id".to_string())
            }),
            None => Ok(1),
        }
    }

    /// Adds a key and makes it the default.
    pub fn add_default_key(&mut self, key: &ProtectionKey) -> CliResult<()> {
        let id = key.id().to_string();
        if self.keys.contains_key(&id) {
            return Err(CliError::InvalidArgument(format!("key {id} already exists")));
        }
        self.keys.insert(id, key.to_base64());
        self.default_key = Some(key.id());
        Ok(())
    }

    /// Gets the effective backend (from args or config).
    pub fn effective_backend(&self, arg_backend: Option<Backend>) -> Backend {
        arg_backend.unwrap_or(self.backend)
    }

    /// Gets the effective output format (from args or config).
    pub fn effective_output(&self, arg_output: Option<OutputFormat>) -> OutputFormat {
        arg_output.unwrap_or(self.output_format)
    }

    /// Gets the effective Redis settings (from args or config).
    pub fn effective_redis(&self, arg_url: Option<&str>) -> CliResult<RedisConfig> {
        match arg_url {
            Some(url) => {
                let parsed = RedisConfig::from_url(url).map_err(CliError::InvalidArgument)?;
                Ok(RedisConfig {
                    key_prefix: self.redis.key_prefix.clone(),
                    connect_timeout_ms: self.redis.connect_timeout_ms,
                    command_timeout_ms: self.redis.command_timeout_ms,
                    ..parsed
                })
            }
            None => Ok(self.redis.clone()),
        }
    }
}

fn no_keys() -> CliError {
    CliError::Config("no protection keys configured; run `cstate config init`".to_string())
}

/// Cache backend.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// In-process cache; entries vanish when the command exits.
    #[default]
    Memory,
    /// Shared Redis cache.
    Redis,
}

/// Output format.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
    /// Quiet (minimal output).
    Quiet,
}
