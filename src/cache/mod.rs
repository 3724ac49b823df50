//! Local read-through cache for source images
//!
//! Cached files mirror the remote key layout under a single root directory:
//! `cache_root/<decoded identifier>`. A regular file at that path is the only
//! cache-hit signal; there is no expiry, eviction or content validation.
//!
//! # Entry States
//!
//! | State | On disk | Description |
//! |-------|---------|-------------|
//! | Miss | nothing | Not yet fetched, or removed externally |
//! | Staging | `.<name>.<uuid>.part` sibling | Download in progress, never served |
//! | Complete | `<name>` | Renamed into place after a full download |
//!
//! Staging files are removed when a download fails or is dropped, so a
//! partially written image is never visible at the canonical path.

pub mod staged;
pub mod store;

pub use staged::StagedFile;
pub use store::{format_bytes, CacheUsage, LocalCache};
