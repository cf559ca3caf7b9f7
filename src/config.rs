use crate::core::reference::{ReferenceEntry, ReferenceTable};
use crate::providers::rapidapi::RapidApiCredentials;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

/// RapidAPI key override, takes precedence over the config file.
pub const RAPIDAPI_KEY_ENV: &str = "QUOTEWATCH_RAPIDAPI_KEY";

const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub primary_base_url: String,
    pub secondary_base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RapidApiProviderConfig {
    pub base_url: String,
    pub host: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CoinGeckoProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub yahoo: Option<YahooProviderConfig>,
    pub rapidapi: Option<RapidApiProviderConfig>,
    pub coingecko: Option<CoinGeckoProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            yahoo: Some(YahooProviderConfig {
                primary_base_url: "https://query1.finance.yahoo.com".to_string(),
                secondary_base_url: "https://query2.finance.yahoo.com".to_string(),
            }),
            rapidapi: Some(RapidApiProviderConfig {
                base_url: "https://apidojo-yahoo-finance-v1.p.rapidapi.com".to_string(),
                host: "apidojo-yahoo-finance-v1.p.rapidapi.com".to_string(),
                api_key: None,
            }),
            coingecko: Some(CoinGeckoProviderConfig {
                base_url: "https://api.coingecko.com".to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Override for the keyspace location, mainly for tests.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Replaces the built-in reference table when present.
    #[serde(default)]
    pub reference: Option<Vec<ReferenceEntry>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            data_dir: None,
            reference: None,
        }
    }
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl AppConfig {
    /// Loads the default config file. A missing file is not an error: every
    /// field has a safe default, so a fresh install runs unconfigured.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file found, using defaults");
            return Ok(AppConfig::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "quotewatch", "quotewatch")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "quotewatch", "quotewatch")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn data_path(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::default_data_path(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn reference_table(&self) -> ReferenceTable {
        match &self.reference {
            Some(entries) => ReferenceTable::new(entries.clone()),
            None => ReferenceTable::default(),
        }
    }

    /// Credentials for the RapidAPI-hosted endpoints, if a key is supplied
    /// at all. No key means those providers are simply left out of the
    /// chain and their callers degrade to fallback behavior.
    pub fn rapidapi_credentials(&self) -> Option<(RapidApiProviderConfig, RapidApiCredentials)> {
        let provider = self.providers.rapidapi.clone()?;
        let api_key = std::env::var(RAPIDAPI_KEY_ENV)
            .ok()
            .filter(|key| !key.is_empty())
            .or_else(|| provider.api_key.clone())?;
        let credentials = RapidApiCredentials {
            host: provider.host.clone(),
            api_key,
        };
        Some((provider, credentials))
    }
}
