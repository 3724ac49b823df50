//! Remote object store collaborator
//!
//! The resolver only needs two things from a store: "does this key exist" and
//! "download this key to a local path". Backends must report a missing object
//! as `StoreError::NotFound` so it can be told apart from every other fault.
//!
//! - `S3Store`: AWS S3 and S3-compatible endpoints via `object_store`
//! - `MemoryStore`: in-process objects with call counters, for tests

mod memory;
mod s3;

pub use memory::MemoryStore;
pub use s3::S3Store;

use crate::error::BoxError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::{Stream, StreamExt};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures reported by a remote store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store confirmed the object does not exist
    #[error("object not found")]
    NotFound,

    /// Transport, auth, throttling or any other backend failure
    #[error(transparent)]
    Backend(BoxError),

    /// Writing the downloaded bytes locally failed
    #[error("writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Wrap any backend error
    pub fn backend(source: impl Into<BoxError>) -> Self {
        Self::Backend(source.into())
    }

    fn write(path: &Path, source: std::io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Object metadata returned by a head request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHead {
    /// Size in bytes
    pub size: u64,
    /// Last modification time reported by the store
    pub last_modified: Option<DateTime<Utc>>,
    /// Entity tag, if the store has one
    pub e_tag: Option<String>,
}

/// Outcome of a completed download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReceipt {
    /// Bytes written
    pub bytes: u64,
    /// Hex SHA-256 of the bytes written
    pub sha256: String,
}

/// Abstract remote store interface
///
/// Any backend satisfying this contract can stand behind the resolver.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// URL scheme this store serves (`s3` for `s3://bucket/prefix`)
    fn scheme(&self) -> &str;

    /// Check that `key` exists in `bucket`
    async fn head_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectHead>;

    /// Stream `key` from `bucket` into a new file at `dest`
    async fn download_object(
        &self,
        bucket: &str,
        key: &str,
        dest: &Path,
    ) -> StoreResult<DownloadReceipt>;

    /// Get the human-readable store name for display
    fn store_name(&self) -> &'static str;
}

/// Write a chunk stream to `dest`, hashing as it goes.
///
/// The file is synced before returning so a later rename publishes complete data.
pub async fn write_stream<S, B, E>(dest: &Path, mut stream: S) -> StoreResult<DownloadReceipt>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Into<BoxError>,
{
    let mut file = File::create(dest)
        .await
        .map_err(|e| StoreError::write(dest, e))?;
    let mut hasher = Sha256::new();
    let mut bytes = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(StoreError::backend)?;
        let chunk = chunk.as_ref();
        hasher.update(chunk);
        file.write_all(chunk)
            .await
            .map_err(|e| StoreError::write(dest, e))?;
        bytes += chunk.len() as u64;
    }

    file.flush().await.map_err(|e| StoreError::write(dest, e))?;
    file.sync_all()
        .await
        .map_err(|e| StoreError::write(dest, e))?;

    Ok(DownloadReceipt {
        bytes,
        sha256: hex::encode(hasher.finalize()),
    })
}
