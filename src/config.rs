//! Configuration file parser for ~/.config/newsdesk/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted but logged, so typos show up under `RUST_LOG=warn`.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::news::{
    StoreOptions, DEFAULT_BREAKING_LIMIT, DEFAULT_FEATURED_LIMIT, DEFAULT_RECOMMENDED_LIMIT,
    DEFAULT_TRENDING_LIMIT,
};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration
// ============================================================================

/// Top-level application configuration.
///
/// Every key is optional; missing keys take `Default::default()`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file holding the persisted collections. Defaults to
    /// `news.db` next to the config file.
    pub database_path: Option<PathBuf>,

    /// Start from the built-in sample articles on an empty database.
    pub seed_demo_content: bool,

    pub trending_limit: usize,
    pub breaking_limit: usize,
    pub featured_limit: usize,
    pub recommended_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            seed_demo_content: true,
            trending_limit: DEFAULT_TRENDING_LIMIT,
            breaking_limit: DEFAULT_BREAKING_LIMIT,
            featured_limit: DEFAULT_FEATURED_LIMIT,
            recommended_limit: DEFAULT_RECOMMENDED_LIMIT,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 6] = [
        "database_path",
        "seed_demo_content",
        "trending_limit",
        "breaking_limit",
        "featured_limit",
        "recommended_limit",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing or blank file → `Ok(Config::default())`
    /// - Larger than 1 MB → `Err(ConfigError::TooLarge)`
    /// - Invalid TOML or wrong value types → `Err(ConfigError::Parse)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let Some(content) = read_capped(path, Self::MAX_FILE_SIZE)? else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        };
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Blank config file, using defaults");
            return Ok(Self::default());
        }

        let table: toml::Table = content.parse()?;
        for key in table.keys().filter(|k| !Self::KNOWN_KEYS.contains(&k.as_str())) {
            tracing::warn!(key = %key, path = %path.display(), "Ignoring unknown config key");
        }

        let config: Config = toml::Value::Table(table).try_into()?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Database location, resolving the default against `config_dir`.
    pub fn database_path(&self, config_dir: &Path) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| config_dir.join("news.db"))
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            seed_demo_content: self.seed_demo_content,
        }
    }
}

/// Read `path` as UTF-8, refusing files over `limit` bytes.
///
/// `Ok(None)` if the file does not exist, including when it vanishes
/// between the size check and the read.
fn read_capped(path: &Path, limit: u64) -> Result<Option<String>, ConfigError> {
    let not_found = |e: &std::io::Error| e.kind() == std::io::ErrorKind::NotFound;

    let size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if not_found(&e) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if size > limit {
        return Err(ConfigError::TooLarge(format!(
            "{} is {} bytes (limit {})",
            path.display(),
            size,
            limit
        )));
    }

    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if not_found(&e) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ============================================================================
// Tests
// ============================================================================
