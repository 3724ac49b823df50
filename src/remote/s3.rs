//! S3 backend built on the `object_store` crate
//!
//! Credentials, region and endpoint come from the standard AWS environment
//! variables unless overridden in `[store]`.

use super::{write_stream, DownloadReceipt, ObjectHead, RemoteStore, StoreError, StoreResult};
use crate::config::StoreConfig;
use async_trait::async_trait;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::{ClientOptions, ObjectStore};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

/// S3 store with one client per bucket, built on first use
pub struct S3Store {
    config: StoreConfig,
    timeout: Option<Duration>,
    clients: Mutex<HashMap<String, Arc<AmazonS3>>>,
}

impl S3Store {
    /// Create a store; no network activity happens until the first request
    pub fn new(config: StoreConfig, timeout: Option<Duration>) -> Self {
        Self {
            config,
            timeout,
            clients: Mutex::new(HashMap::new()),
        }
    }

    fn client(&self, bucket: &str) -> StoreResult<Arc<AmazonS3>> {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = clients.get(bucket) {
            return Ok(Arc::clone(client));
        }

        debug!("Building S3 client for bucket {}", bucket);
        let mut options = ClientOptions::new();
        if let Some(timeout) = self.timeout {
            options = options.with_timeout(timeout);
        }
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_client_options(options);

        if let Some(ref region) = self.config.region {
            builder = builder.with_region(region);
        }
        if let Some(ref endpoint) = self.config.endpoint {
            builder = builder.with_endpoint(endpoint);
        }
        if self.config.allow_http {
            builder = builder.with_allow_http(true);
        }

        let client = Arc::new(builder.build().map_err(StoreError::backend)?);
        clients.insert(bucket.to_string(), Arc::clone(&client));
        Ok(client)
    }
}

/// Use the key verbatim.
///
/// `ObjectPath::from` percent-encodes parts and drops empty segments, which
/// would address a different object than `prefix + identifier`.
fn object_path(key: &str) -> StoreResult<ObjectPath> {
    ObjectPath::parse(key).map_err(StoreError::backend)
}

/// Separate "no such key" from everything else the SDK can return
fn classify(err: object_store::Error) -> StoreError {
    match err {
        object_store::Error::NotFound { .. } => StoreError::NotFound,
        other => StoreError::backend(other),
    }
}

#[async_trait]
impl RemoteStore for S3Store {
    fn scheme(&self) -> &str {
        "s3"
    }

    async fn head_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectHead> {
        let client = self.client(bucket)?;
        let meta = client
            .head(&object_path(key)?)
            .await
            .map_err(classify)?;

        Ok(ObjectHead {
            size: meta.size as u64,
            last_modified: Some(meta.last_modified),
            e_tag: meta.e_tag,
        })
    }

    async fn download_object(
        &self,
        bucket: &str,
        key: &str,
        dest: &Path,
    ) -> StoreResult<DownloadReceipt> {
        let client = self.client(bucket)?;
        let result = client
            .get(&object_path(key)?)
            .await
            .map_err(classify)?;

        write_stream(dest, result.into_stream()).await
    }

    fn store_name(&self) -> &'static str {
        "Amazon S3"
    }
}
