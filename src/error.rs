//! Error types for the resolver
//!
//! All modules use `ResolverResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for resolver operations
pub type ResolverResult<T> = Result<T, ResolverError>;

/// Boxed source error from a remote store backend
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All errors that can occur while resolving identifiers
#[derive(Error, Debug)]
pub enum ResolverError {
    // Configuration errors
    #[error("Configuration error: missing setting for {key}")]
    ConfigMissing { key: &'static str },

    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Configuration error: source_root {source_root} is not a valid URL: {reason}")]
    SourceRootInvalid { source_root: String, reason: String },

    #[error("Configuration error: source_root {source_root} is not an {expected}:// url")]
    SourceRootScheme {
        source_root: String,
        expected: String,
    },

    #[error("Configuration error: cache_root must be an absolute path, got {0}")]
    CacheRootRelative(PathBuf),

    // Request errors
    #[error("Key {key} not found in bucket {bucket}")]
    NotFound { key: String, bucket: String },

    #[error("Invalid identifier {ident}: {reason}")]
    InvalidIdentifier { ident: String, reason: String },

    #[error("Format could not be determined for {ident}")]
    UnknownFormat { ident: String },

    // Remote errors
    #[error("Remote store error for key {key} in bucket {bucket}: {source}")]
    Remote {
        key: String,
        bucket: String,
        #[source]
        source: BoxError,
    },

    #[error("Timed out after {secs}s waiting on key {key} in bucket {bucket}")]
    Timeout {
        key: String,
        bucket: String,
        secs: u64,
    },

    #[error("Failed to write cache file {path}: {source}")]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

/// Coarse classification used by callers to pick a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Resolver cannot be built; fatal until reconfigured
    Config,
    /// Definitive miss
    NotFound,
    /// The request itself is unusable
    Request,
    /// Remote store, network or cache population failure
    Remote,
    /// Anything else
    Internal,
}

impl ResolverError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a remote store error
    pub fn remote(
        key: impl Into<String>,
        bucket: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Remote {
            key: key.into(),
            bucket: bucket.into(),
            source: source.into(),
        }
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigMissing { .. }
            | Self::ConfigInvalid { .. }
            | Self::SourceRootInvalid { .. }
            | Self::SourceRootScheme { .. }
            | Self::CacheRootRelative(_) => ErrorKind::Config,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidIdentifier { .. } | Self::UnknownFormat { .. } | Self::User(_) => {
                ErrorKind::Request
            }
            Self::Remote { .. } | Self::Timeout { .. } | Self::CacheWrite { .. } => {
                ErrorKind::Remote
            }
            Self::Io { .. } | Self::Json(_) | Self::TomlSerialize(_) => ErrorKind::Internal,
        }
    }

    /// HTTP status a serving front end should answer with
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::NotFound => 404,
            ErrorKind::Request => 400,
            ErrorKind::Config | ErrorKind::Remote | ErrorKind::Internal => 500,
        }
    }

    /// Check if the caller may reasonably retry
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Remote
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ConfigMissing { key: "source_root" } => {
                Some("Set SOURCE_ROOT, pass --source-root, or run: s3-resolver config set resolver.source_root s3://bucket/prefix/")
            }
            Self::ConfigMissing { key: "cache_root" } => {
                Some("Set CACHE_ROOT, pass --cache-root, or run: s3-resolver config set resolver.cache_root /var/cache/images")
            }
            Self::SourceRootScheme { .. } => Some("source_root must look like s3://bucket/prefix/"),
            Self::CacheRootRelative(_) => Some("Use an absolute directory for cache_root"),
            Self::UnknownFormat { .. } => {
                Some("Add a file extension or run: s3-resolver config set resolver.default_format jpg")
            }
            Self::Timeout { .. } => Some("Raise resolver.timeout_secs or check network access"),
            _ => None,
        }
    }
}
