//! In-memory store with call accounting and failure injection

use super::{write_stream, DownloadReceipt, ObjectHead, RemoteStore, StoreError, StoreResult};
use crate::error::BoxError;
use async_trait::async_trait;
use chrono::Utc;
use futures_util::stream;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Chunk size used when replaying objects as a stream
const CHUNK_SIZE: usize = 4096;

#[derive(Debug, Default)]
struct Faults {
    head_error: Option<String>,
    download_error_after: Option<usize>,
    delay: Option<Duration>,
}

/// Objects held in process memory, keyed by (bucket, key)
#[derive(Debug)]
pub struct MemoryStore {
    scheme: String,
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    faults: Mutex<Faults>,
    head_calls: AtomicUsize,
    download_calls: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store answering for `scheme`
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            objects: Mutex::new(HashMap::new()),
            faults: Mutex::new(Faults::default()),
            head_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
        }
    }

    /// Add or replace an object
    pub fn insert(&self, bucket: &str, key: &str, data: impl Into<Vec<u8>>) {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((bucket.to_string(), key.to_string()), data.into());
    }

    /// Make every head request fail with a backend error
    pub fn fail_head(&self, message: impl Into<String>) {
        self.faults().head_error = Some(message.into());
    }

    /// Make downloads fail after `bytes` bytes have been streamed
    pub fn fail_download_after(&self, bytes: usize) {
        self.faults().download_error_after = Some(bytes);
    }

    /// Delay every request, to exercise timeouts and concurrent callers
    pub fn set_delay(&self, delay: Duration) {
        self.faults().delay = Some(delay);
    }

    /// Number of head requests served
    pub fn head_calls(&self) -> usize {
        self.head_calls.load(Ordering::SeqCst)
    }

    /// Number of download requests served
    pub fn download_calls(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }

    fn faults(&self) -> std::sync::MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    async fn pause(&self) {
        let delay = self.faults().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    async fn head_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectHead> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        let head_error = self.faults().head_error.clone();
        if let Some(message) = head_error {
            return Err(StoreError::backend(message));
        }

        let data = self.object(bucket, key).ok_or(StoreError::NotFound)?;
        Ok(ObjectHead {
            size: data.len() as u64,
            last_modified: Some(Utc::now()),
            e_tag: None,
        })
    }

    async fn download_object(
        &self,
        bucket: &str,
        key: &str,
        dest: &Path,
    ) -> StoreResult<DownloadReceipt> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        let data = self.object(bucket, key).ok_or(StoreError::NotFound)?;
        let fail_after = self.faults().download_error_after;

        let mut chunks: Vec<Result<Vec<u8>, BoxError>> = Vec::new();
        match fail_after {
            Some(limit) => {
                let limit = limit.min(data.len());
                chunks.extend(data[..limit].chunks(CHUNK_SIZE).map(|c| Ok(c.to_vec())));
                chunks.push(Err("connection reset by peer".into()));
            }
            None => chunks.extend(data.chunks(CHUNK_SIZE).map(|c| Ok(c.to_vec()))),
        }

        write_stream(dest, stream::iter(chunks)).await
    }

    fn store_name(&self) -> &'static str {
        "in-memory"
    }
}
