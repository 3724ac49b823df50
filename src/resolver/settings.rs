//! Validated, immutable resolver settings

use super::format::ImageFormat;
use super::paths::KeyMapper;
use crate::config::ResolverConfig;
use crate::error::{ResolverError, ResolverResult};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Settings a `Resolver` is built from.
///
/// Constructed once; every field is checked up front so a resolver never
/// starts in a partially configured state.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    source_root: String,
    scheme: String,
    bucket: String,
    keys: KeyMapper,
    cache_root: PathBuf,
    default_format: Option<ImageFormat>,
    timeout: Option<Duration>,
    single_flight: bool,
}

impl ResolverSettings {
    /// Parse `source_root` (`scheme://bucket/prefix`) and check `cache_root`
    pub fn new(source_root: &str, cache_root: impl Into<PathBuf>) -> ResolverResult<Self> {
        let cache_root = cache_root.into();
        if !cache_root.is_absolute() {
            return Err(ResolverError::CacheRootRelative(cache_root));
        }

        let url = Url::parse(source_root).map_err(|e| ResolverError::SourceRootInvalid {
            source_root: source_root.to_string(),
            reason: e.to_string(),
        })?;

        let bucket = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| ResolverError::SourceRootInvalid {
                source_root: source_root.to_string(),
                reason: "missing bucket".to_string(),
            })?
            .to_string();

        Ok(Self {
            source_root: source_root.to_string(),
            scheme: url.scheme().to_string(),
            bucket,
            keys: KeyMapper::new(url.path()),
            cache_root,
            default_format: None,
            timeout: Some(Duration::from_secs(30)),
            single_flight: true,
        })
    }

    /// Build from the `[resolver]` config section
    pub fn from_config(config: &ResolverConfig) -> ResolverResult<Self> {
        let source_root = config
            .source_root
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ResolverError::ConfigMissing { key: "source_root" })?;
        let cache_root = config
            .cache_root
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ResolverError::ConfigMissing { key: "cache_root" })?;

        let default_format = config
            .default_format
            .as_deref()
            .map(|f| {
                f.parse::<ImageFormat>()
                    .map_err(|reason| ResolverError::ConfigInvalid {
                        path: PathBuf::from("resolver.default_format"),
                        reason,
                    })
            })
            .transpose()?;

        Ok(Self::new(source_root, cache_root.clone())?
            .with_default_format(default_format)
            .with_timeout_secs(config.timeout_secs)
            .with_single_flight(config.single_flight))
    }

    /// Format used when the identifier has no recognised extension
    pub fn with_default_format(mut self, format: Option<ImageFormat>) -> Self {
        self.default_format = format;
        self
    }

    /// Bound remote calls to `secs` seconds; 0 disables the bound
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }

    /// Enable or disable per-identifier download deduplication
    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.single_flight = enabled;
        self
    }

    pub fn source_root(&self) -> &str {
        &self.source_root
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn keys(&self) -> &KeyMapper {
        &self.keys
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    pub fn default_format(&self) -> Option<ImageFormat> {
        self.default_format
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn single_flight(&self) -> bool {
        self.single_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bucket_and_prefix() {
        let settings = ResolverSettings::new("s3://bucket1/images/", "/tmp/cache").unwrap();
        assert_eq!(settings.scheme(), "s3");
        assert_eq!(settings.bucket(), "bucket1");
        assert_eq!(settings.keys().prefix(), "images/");
        assert_eq!(settings.cache_root(), Path::new("/tmp/cache"));
        assert_eq!(settings.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn bucket_without_prefix() {
        let settings = ResolverSettings::new("s3://bucket1", "/tmp/cache").unwrap();
        assert_eq!(settings.keys().prefix(), "");
    }

    #[test]
    fn rejects_missing_bucket() {
        let err = ResolverSettings::new("s3:///images/", "/tmp/cache").unwrap_err();
        assert!(matches!(err, ResolverError::SourceRootInvalid { .. }));
    }

    #[test]
    fn rejects_unparseable_source_root() {
        let err = ResolverSettings::new("bucket1/images", "/tmp/cache").unwrap_err();
        assert!(matches!(err, ResolverError::SourceRootInvalid { .. }));
    }

    #[test]
    fn rejects_relative_cache_root() {
        let err = ResolverSettings::new("s3://bucket1/", "cache").unwrap_err();
        assert!(matches!(err, ResolverError::CacheRootRelative(_)));
    }

    #[test]
    fn from_config_requires_source_root() {
        let config = ResolverConfig {
            cache_root: Some(PathBuf::from("/tmp/cache")),
            ..ResolverConfig::default()
        };
        let err = ResolverSettings::from_config(&config).unwrap_err();
        assert!(matches!(err, ResolverError::ConfigMissing { key: "source_root" }));
    }

    #[test]
    fn from_config_requires_cache_root() {
        let config = ResolverConfig {
            source_root: Some("s3://bucket1/images/".to_string()),
            ..ResolverConfig::default()
        };
        let err = ResolverSettings::from_config(&config).unwrap_err();
        assert!(matches!(err, ResolverError::ConfigMissing { key: "cache_root" }));
    }

    #[test]
    fn from_config_applies_options() {
        let config = ResolverConfig {
            source_root: Some("s3://bucket1/images/".to_string()),
            cache_root: Some(PathBuf::from("/tmp/cache")),
            default_format: Some("jp2".to_string()),
            timeout_secs: 0,
            single_flight: false,
        };
        let settings = ResolverSettings::from_config(&config).unwrap();
        assert_eq!(settings.default_format(), Some(ImageFormat::Jp2));
        assert_eq!(settings.timeout(), None);
        assert!(!settings.single_flight());
    }

    #[test]
    fn from_config_rejects_unknown_default_format() {
        let config = ResolverConfig {
            source_root: Some("s3://bucket1/images/".to_string()),
            cache_root: Some(PathBuf::from("/tmp/cache")),
            default_format: Some("bmp".to_string()),
            ..ResolverConfig::default()
        };
        let err = ResolverSettings::from_config(&config).unwrap_err();
        assert!(matches!(err, ResolverError::ConfigInvalid { .. }));
    }
}
