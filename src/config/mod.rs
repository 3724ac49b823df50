//! Configuration management for the resolver

pub mod schema;

pub use schema::{Config, GeneralConfig, ResolverConfig, StoreConfig};

use crate::error::{ResolverError, ResolverResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("s3-resolver")
            .join("config.toml")
    }

    /// Load configuration, falling back to defaults if the file does not exist
    pub async fn load(&self) -> ResolverResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> ResolverResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| ResolverError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| ResolverError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> ResolverResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            ResolverError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> ResolverResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                ResolverError::io(format!("creating config directory {}", parent.display()), e)
            })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply command-line overrides on top of the file configuration.
///
/// The CLI reads `SOURCE_ROOT` / `CACHE_ROOT` from the environment, so the
/// precedence is: config file, then environment, then explicit flags.
/// Blank values are ignored.
pub fn apply_overrides(
    config: &mut Config,
    source_root: Option<String>,
    cache_root: Option<PathBuf>,
) {
    if let Some(value) = source_root.filter(|v| !v.trim().is_empty()) {
        debug!("source_root overridden: {}", value);
        config.resolver.source_root = Some(value);
    }
    if let Some(value) = cache_root.filter(|v| !v.as_os_str().is_empty()) {
        debug!("cache_root overridden: {}", value.display());
        config.resolver.cache_root = Some(value);
    }
}
