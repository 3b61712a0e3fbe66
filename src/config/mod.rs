//! # Configuration Management Module
//!
//! Centralized configuration for a tradepost deployment: where the external
//! price catalogs live, where installed content packs are found, the host
//! item listing the CLI builds its catalog from, and logging/cleaner knobs.
//!
//! Configuration is TOML, loaded once at startup:
//!
//! ```toml
//! [prices]
//! directory = "data/prices"
//!
//! [packs]
//! directory = "data/packs"
//! host_namespace = "core"
//!
//! [catalog]
//! items_file = "data/items.json"
//!
//! [cleaner]
//! pace_ms = 1
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Values left out fall back to the defaults above. The price pipeline
//! itself never reads this module — it takes paths and handles directly —
//! so embedders with their own configuration systems can skip it entirely.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// External catalog directory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricesConfig {
    /// User-writable directory scanned for `*.json` catalogs; also holds
    /// the persisted override file.
    pub directory: PathBuf,
}

/// Installed content pack settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacksConfig {
    /// Directory scanned for pack directories and `.tar.gz` archives.
    pub directory: PathBuf,
    /// Namespace the base game owns; always counts as installed.
    #[serde(default = "default_host_namespace")]
    pub host_namespace: String,
}

fn default_host_namespace() -> String {
    "core".to_string()
}

/// Host item catalog settings (CLI deployments only; an embedding host
/// supplies its own `ItemIndex`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// `items.json` listing of known items, blocks and currency.
    pub items_file: PathBuf,
}

/// Clean pass pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanerConfig {
    /// Milliseconds slept between per-entry catalog checks.
    #[serde(default = "default_pace_ms")]
    pub pace_ms: u64,
}

fn default_pace_ms() -> u64 {
    1
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            pace_ms: default_pace_ms(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter: error, warn, info, debug, trace.
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub prices: PricesConfig,
    pub packs: PacksConfig,
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub cleaner: CleanerConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            other => return Err(anyhow!("Invalid logging level: {}", other)),
        }
        if self.packs.host_namespace.is_empty() || self.packs.host_namespace.contains(':') {
            return Err(anyhow!(
                "Invalid host namespace: {:?}",
                self.packs.host_namespace
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            prices: PricesConfig {
                directory: PathBuf::from("data/prices"),
            },
            packs: PacksConfig {
                directory: PathBuf::from("data/packs"),
                host_namespace: default_host_namespace(),
            },
            catalog: CatalogConfig {
                items_file: PathBuf::from("data/items.json"),
            },
            cleaner: CleanerConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}
