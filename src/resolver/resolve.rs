//! Read-through resolution of identifiers to cached files

use super::format::ImageFormat;
use super::image::{normalize_base_uri, ExtraInfo, ResolvedImage};
use super::inflight::InFlight;
use super::paths::{cache_path, decode_identifier};
use super::settings::ResolverSettings;
use crate::cache::LocalCache;
use crate::error::{ResolverError, ResolverResult};
use crate::remote::{RemoteStore, StoreError, StoreResult};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Resolves identifiers to complete local copies of remote objects.
///
/// Holds no mutable state besides the optional in-flight registry, so one
/// instance can be shared across concurrent callers.
pub struct Resolver {
    settings: ResolverSettings,
    cache: LocalCache,
    store: Arc<dyn RemoteStore>,
    inflight: Option<InFlight>,
}

impl Resolver {
    /// Build a resolver, refusing a store that does not serve `source_root`'s scheme
    pub fn new(settings: ResolverSettings, store: Arc<dyn RemoteStore>) -> ResolverResult<Self> {
        if settings.scheme() != store.scheme() {
            let err = ResolverError::SourceRootScheme {
                source_root: settings.source_root().to_string(),
                expected: store.scheme().to_string(),
            };
            error!("{}", err);
            return Err(err);
        }

        debug!(
            "Resolver for {} (bucket {}, cache {})",
            settings.source_root(),
            settings.bucket(),
            settings.cache_root().display()
        );

        Ok(Self {
            cache: LocalCache::new(settings.cache_root()),
            inflight: settings.single_flight().then(InFlight::new),
            settings,
            store,
        })
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    pub fn store(&self) -> &dyn RemoteStore {
        self.store.as_ref()
    }

    /// Bucket or container named by `source_root`
    pub fn bucket(&self) -> &str {
        self.settings.bucket()
    }

    /// Remote key for an identifier
    pub fn remote_key(&self, ident: &str) -> String {
        self.settings.keys().remote_key(ident)
    }

    /// Local cache path for an identifier
    pub fn cache_path(&self, ident: &str) -> ResolverResult<PathBuf> {
        cache_path(self.settings.cache_root(), ident)
    }

    /// Whether a complete copy of `ident` is already cached
    pub async fn in_cache(&self, ident: &str) -> ResolverResult<bool> {
        let path = self.cache_path(ident)?;
        Ok(self.cache.contains(&path).await)
    }

    /// Check the cache, then the remote store.
    ///
    /// Returns `Ok(true)` or fails with `NotFound` / a remote-class error.
    pub async fn is_resolvable(&self, ident: &str) -> ResolverResult<bool> {
        if self.in_cache(ident).await? {
            debug!("Cache hit for {}", ident);
            return Ok(true);
        }

        let key = self.remote_key(ident);
        let outcome = self
            .bounded(&key, self.store.head_object(self.bucket(), &key))
            .await?;
        match outcome {
            Ok(head) => {
                debug!(
                    "Key {} exists ({} bytes, modified {:?}, etag {:?})",
                    key, head.size, head.last_modified, head.e_tag
                );
                Ok(true)
            }
            Err(e) => Err(self.store_failure(key, e)),
        }
    }

    /// Download `ident` into the cache and return its path.
    ///
    /// Bytes land in a staging file that is renamed into place only once the
    /// transfer completes; on any failure the staging file is removed.
    pub async fn copy_to_cache(&self, ident: &str) -> ResolverResult<PathBuf> {
        let key = self.remote_key(ident);
        let target = self.cache_path(ident)?;

        let _flight = match self.inflight {
            Some(ref inflight) => {
                let guard = inflight.acquire(&target).await;
                if self.cache.contains(&target).await {
                    debug!("{} populated by a concurrent caller", target.display());
                    return Ok(target);
                }
                Some(guard)
            }
            None => None,
        };

        let staged = self.cache.stage(&target).await?;
        let outcome = self
            .bounded(
                &key,
                self.store.download_object(self.bucket(), &key, staged.path()),
            )
            .await?;
        let receipt = match outcome {
            Ok(receipt) => receipt,
            Err(e) => return Err(self.store_failure(key, e)),
        };

        let path = staged.commit().await?;
        info!(
            "Downloaded key {} at: {} ({} bytes, sha256 {})",
            key,
            path.display(),
            receipt.bytes,
            receipt.sha256
        );
        Ok(path)
    }

    /// Resolve `ident` to a cached file, downloading it on first access
    pub async fn resolve(&self, ident: &str, base_uri: &str) -> ResolverResult<ResolvedImage> {
        self.is_resolvable(ident).await?;

        // NotFound wins over an unknown format, but nothing is downloaded
        // for an identifier that could never be served
        let format = ImageFormat::from_ident(
            &decode_identifier(ident),
            self.settings.default_format(),
        )?;

        // the cache may have been filled since the check above
        let src_path = if self.in_cache(ident).await? {
            self.cache_path(ident)?
        } else {
            self.copy_to_cache(ident).await?
        };

        let (size, modified) = self.cache.stat(&src_path).await?;

        Ok(ResolvedImage {
            ident: ident.to_string(),
            src_path,
            format,
            base_uri: normalize_base_uri(base_uri),
            extra: ExtraInfo { size, modified },
        })
    }

    /// Drop the cached copy of `ident`; the next resolve fetches it again
    pub async fn purge(&self, ident: &str) -> ResolverResult<bool> {
        let path = self.cache_path(ident)?;
        self.cache.remove(&path).await
    }

    /// Apply the configured timeout to a store call
    async fn bounded<T>(
        &self,
        key: &str,
        call: impl Future<Output = StoreResult<T>>,
    ) -> ResolverResult<StoreResult<T>> {
        let Some(limit) = self.settings.timeout() else {
            return Ok(call.await);
        };

        tokio::time::timeout(limit, call).await.map_err(|_| {
            let err = ResolverError::Timeout {
                key: key.to_string(),
                bucket: self.bucket().to_string(),
                secs: limit.as_secs(),
            };
            error!("{}", err);
            err
        })
    }

    /// Turn a store failure into the resolver taxonomy, logging it once
    fn store_failure(&self, key: String, err: StoreError) -> ResolverError {
        match err {
            StoreError::NotFound => {
                warn!("Key {} not found in bucket: {}.", key, self.bucket());
                ResolverError::NotFound {
                    key,
                    bucket: self.bucket().to_string(),
                }
            }
            StoreError::Backend(source) => {
                error!("Remote store error for key {}: {}", key, source);
                ResolverError::remote(key, self.bucket(), source)
            }
            StoreError::Write { path, source } => {
                error!("Failed writing {} for key {}: {}", path.display(), key, source);
                ResolverError::CacheWrite { path, source }
            }
        }
    }
}
