//! s3-resolver - read-through image cache backed by S3
//!
//! Resolves opaque image identifiers to complete local files, fetching each
//! object from the remote store on first access and serving the cached copy
//! afterwards.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod remote;
pub mod resolver;
pub mod ui;

pub use error::{ErrorKind, ResolverError, ResolverResult};
pub use resolver::{ResolvedImage, Resolver, ResolverSettings};
