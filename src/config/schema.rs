//! Configuration schema for the resolver
//!
//! Configuration is stored at `~/.config/s3-resolver/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Resolver settings
    pub resolver: ResolverConfig,

    /// Remote store client settings
    pub store: StoreConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Resolver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Remote root, e.g. `s3://bucket/prefix/`
    pub source_root: Option<String>,

    /// Absolute directory where resolved images are cached
    pub cache_root: Option<PathBuf>,

    /// Format assumed when the identifier has no recognised extension
    pub default_format: Option<String>,

    /// Upper bound on a single remote check or download, in seconds
    pub timeout_secs: u64,

    /// Collapse concurrent downloads of the same identifier
    pub single_flight: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            source_root: None,
            cache_root: None,
            default_format: None,
            timeout_secs: 30,
            single_flight: true,
        }
    }
}

/// Remote store client settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// AWS region (falls back to the environment)
    pub region: Option<String>,

    /// Custom endpoint for S3-compatible stores
    pub endpoint: Option<String>,

    /// Allow plain HTTP endpoints
    pub allow_http: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[resolver]"));
        assert!(toml.contains("timeout_secs = 30"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.resolver.source_root.is_none());
        assert!(config.resolver.single_flight);
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [resolver]
            source_root = "s3://bucket1/images/"
            cache_root = "/tmp/cache"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.resolver.source_root.as_deref(),
            Some("s3://bucket1/images/")
        );
        assert_eq!(config.resolver.cache_root, Some(PathBuf::from("/tmp/cache")));
        assert_eq!(config.resolver.timeout_secs, 30); // default preserved
        assert_eq!(config.general.log_format, "text");
    }
}
