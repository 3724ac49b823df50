//! Filesystem side of the cache

use super::staged::{is_staging_name, StagedFile};
use crate::error::{ResolverError, ResolverResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Format bytes as human-readable size (e.g., "1.5 GB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Totals across the cache root
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheUsage {
    /// Complete cached files
    pub files: u64,
    /// Bytes held by complete cached files
    pub bytes: u64,
    /// Leftover staging files (interrupted downloads)
    pub staging: u64,
}

/// Cache directory handle
#[derive(Debug, Clone)]
pub struct LocalCache {
    root: PathBuf,
}

impl LocalCache {
    /// Create a handle for `root`; nothing is created until the first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// True iff a regular file exists at `path`. Contents are never read.
    pub async fn contains(&self, path: &Path) -> bool {
        fs::metadata(path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    /// Create parent directories for `target` and reserve a staging file
    pub async fn stage(&self, target: &Path) -> ResolverResult<StagedFile> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ResolverError::CacheWrite {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(StagedFile::new(target))
    }

    /// Size and modification time of a cached file
    pub async fn stat(&self, path: &Path) -> ResolverResult<(u64, Option<DateTime<Utc>>)> {
        let meta = fs::metadata(path)
            .await
            .map_err(|e| ResolverError::io(format!("reading metadata of {}", path.display()), e))?;
        let modified = meta.modified().ok().map(DateTime::<Utc>::from);
        Ok((meta.len(), modified))
    }

    /// Remove a cached file. Returns false if it was not cached.
    pub async fn remove(&self, path: &Path) -> ResolverResult<bool> {
        match fs::remove_file(path).await {
            Ok(()) => {
                debug!("Removed cached file {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ResolverError::io(
                format!("removing cache file {}", path.display()),
                e,
            )),
        }
    }

    /// Walk the cache root and total up its contents
    pub async fn usage(&self) -> ResolverResult<CacheUsage> {
        let mut usage = CacheUsage::default();
        if !self.root.exists() {
            return Ok(usage);
        }

        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir)
                .await
                .map_err(|e| ResolverError::io(format!("reading {}", dir.display()), e))?;

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| ResolverError::io("reading cache entry", e))?
            {
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| ResolverError::io("reading cache entry type", e))?;

                if file_type.is_dir() {
                    pending.push(entry.path());
                } else if file_type.is_file() {
                    if is_staging_name(&entry.file_name().to_string_lossy()) {
                        usage.staging += 1;
                        continue;
                    }
                    let meta = entry
                        .metadata()
                        .await
                        .map_err(|e| ResolverError::io("reading cache entry metadata", e))?;
                    usage.files += 1;
                    usage.bytes += meta.len();
                }
            }
        }

        Ok(usage)
    }

    /// Remove everything below the cache root, keeping the root itself.
    ///
    /// Returns the number of top-level entries removed.
    pub async fn clear(&self) -> ResolverResult<u64> {
        if !self.root.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| ResolverError::io("reading cache directory", e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ResolverError::io("reading cache entry", e))?
        {
            let path = entry.path();
            let result = if path.is_dir() {
                fs::remove_dir_all(&path).await
            } else {
                fs::remove_file(&path).await
            };
            result.map_err(|e| ResolverError::io(format!("removing {}", path.display()), e))?;
            removed += 1;
        }

        Ok(removed)
    }
}
