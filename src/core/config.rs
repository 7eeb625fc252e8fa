use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

use super::currency::CurrencyCode;

pub const DEFAULT_AWESOME_API_URL: &str = "https://economia.awesomeapi.com.br/json/last";

fn default_timeout_secs() -> u64 {
    10
}

fn default_currencies() -> Vec<CurrencyCode> {
    ["BRL", "USD", "EUR", "BTC"]
        .iter()
        .filter_map(|c| c.parse().ok())
        .collect()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AwesomeApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AwesomeApiConfig {
    fn default() -> Self {
        AwesomeApiConfig {
            base_url: DEFAULT_AWESOME_API_URL.to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub awesome_api: AwesomeApiConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Currencies offered for selection.
    #[serde(default = "default_currencies")]
    pub currencies: Vec<CurrencyCode>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            currencies: default_currencies(),
        }
    }
}

impl AppConfig {
    /// Loads the default config file, falling back to built-in defaults when it
    /// does not exist.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("br", "cambio", "cambio")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
