//! Resolved image descriptor handed to the serving pipeline

use super::format::ImageFormat;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// A local, complete copy of a source image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedImage {
    /// Identifier as supplied by the caller
    pub ident: String,

    /// Readable file inside the cache root
    pub src_path: PathBuf,

    /// Source format
    pub format: ImageFormat,

    /// Base URI with trailing slashes removed
    pub base_uri: String,

    /// Filesystem metadata of the cached copy
    pub extra: ExtraInfo,
}

/// Metadata read from the cached file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtraInfo {
    /// Size in bytes
    pub size: u64,

    /// Last modification time, when the filesystem reports one
    pub modified: Option<DateTime<Utc>>,
}

/// Strip trailing slashes so `{base_uri}/info.json` never doubles up
pub fn normalize_base_uri(base_uri: &str) -> String {
    base_uri.trim_end_matches('/').to_string()
}
