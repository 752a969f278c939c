//! JSON configuration with environment overrides.
//!
//! Every section carries `#[serde(default)]`, so a partial file (or no file
//! at all) yields a usable configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::clustering::LanguageThresholds;
use crate::engine::RankClock;
use crate::environment::{get_env_var, get_env_var_as};

pub const CONFIG_ENV: &str = "NEWSTHREADS_CONFIG";
pub const INDEX_DIR_ENV: &str = "NEWSTHREADS_INDEX_DIR";
pub const WORKERS_ENV: &str = "NEWSTHREADS_WORKERS";
pub const ADDRESS_ENV: &str = "NEWSTHREADS_ADDRESS";
pub const PORT_ENV: &str = "NEWSTHREADS_PORT";

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Spaces per nesting level of JSON output
    #[serde(alias = "indent_space_amount")]
    pub json_indent: usize,
    pub server: ServerConfig,
    pub languages: LanguageConfig,
    pub categories: CategoryConfig,
    #[serde(alias = "threads")]
    pub clustering: LanguageThresholds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            json_indent: 2,
            server: ServerConfig::default(),
            languages: LanguageConfig::default(),
            categories: CategoryConfig::default(),
            clustering: LanguageThresholds::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    #[serde(alias = "thread_num")]
    pub workers: usize,
    pub keep_alive_count: usize,
    pub index_dir: PathBuf,
    pub rank_clock: RankClock,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 8000,
            workers: 4,
            keep_alive_count: 100,
            index_dir: PathBuf::from("index"),
            rank_clock: RankClock::Wall,
        }
    }
}

impl ServerConfig {
    /// Port given on the command line, else the configured one.
    pub fn listen_port(&self, requested: Option<u16>) -> u16 {
        requested.unwrap_or(self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    pub token_share: f64,
    pub en_common_share: f64,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            token_share: 0.6,
            en_common_share: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerLanguage<T> {
    pub en: T,
    pub ru: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    pub filename: PerLanguage<PathBuf>,
    pub min_char_share: f64,
    pub min_token_count: PerLanguage<usize>,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            filename: PerLanguage {
                en: PathBuf::from("data/categories_en.txt"),
                ru: PathBuf::from("data/categories_ru.txt"),
            },
            min_char_share: 0.6,
            min_token_count: PerLanguage { en: 2, ru: 2 },
        }
    }
}

impl Config {
    /// Parses a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Loads the config named by `NEWSTHREADS_CONFIG` (or `config.json`),
    /// falling back to defaults when the file does not exist, then applies
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let path = get_env_var(CONFIG_ENV).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        let path = Path::new(&path);

        let mut config = if path.exists() {
            info!("Loading configuration from {}", path.display());
            Self::from_file(path)?
        } else {
            info!("No configuration at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        if let Some(dir) = get_env_var(INDEX_DIR_ENV) {
            self.server.index_dir = PathBuf::from(dir);
        }
        if let Some(workers) = get_env_var_as::<usize>(WORKERS_ENV) {
            self.server.workers = workers;
        }
        if let Some(address) = get_env_var(ADDRESS_ENV) {
            self.server.address = address;
        }
        if let Some(port) = get_env_var_as::<u16>(PORT_ENV) {
            self.server.port = port;
        }
    }
}
