//! Identifier resolution
//!
//! Maps an opaque, URL-escaped identifier to a remote key and a cache path,
//! fetches the object on first access and hands back a `ResolvedImage`.
//!
//! # Resolve Flow
//!
//! ```text
//! resolve(ident)
//!   -> cached?            yes -> done
//!   -> head(remote key)   404 -> NotFound
//!                         err -> Remote
//!   -> format known?      no  -> UnknownFormat
//!   -> cached now?        yes -> done
//!   -> download to .part, rename into place -> done
//! ```

pub mod format;
pub mod image;
pub mod inflight;
pub mod paths;
mod resolve;
pub mod settings;

pub use format::ImageFormat;
pub use image::{normalize_base_uri, ExtraInfo, ResolvedImage};
pub use paths::{cache_path, decode_identifier, KeyMapper};
pub use resolve::Resolver;
pub use settings::ResolverSettings;

use crate::config::Config;
use crate::error::ResolverResult;
use crate::remote::S3Store;
use std::sync::Arc;

/// Build the production resolver (S3 backend) from loaded configuration
pub fn create_resolver(config: &Config) -> ResolverResult<Resolver> {
    let settings = ResolverSettings::from_config(&config.resolver)?;
    let store = S3Store::new(config.store.clone(), settings.timeout());
    Resolver::new(settings, Arc::new(store))
}
