//! Identifier to remote key and cache path mapping
//!
//! Both mappings are pure: the identifier is percent-decoded exactly once and
//! then joined onto the configured prefix or cache root.

use crate::error::{ResolverError, ResolverResult};
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

/// Percent-decode an identifier once.
///
/// Malformed escapes are kept verbatim, and an identifier whose escapes decode
/// to invalid UTF-8 is returned unchanged.
pub fn decode_identifier(ident: &str) -> Cow<'_, str> {
    match percent_decode_str(ident).decode_utf8() {
        Ok(decoded) => decoded,
        Err(_) => Cow::Borrowed(ident),
    }
}

/// Maps decoded identifiers to remote keys under a fixed prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMapper {
    prefix: String,
}

impl KeyMapper {
    /// Build a mapper from the path component of the source root.
    ///
    /// The leading `/` of a URL path is not part of an S3 key, so it is dropped.
    pub fn new(url_path: &str) -> Self {
        Self {
            prefix: url_path.trim_start_matches('/').to_string(),
        }
    }

    /// The key prefix, without a leading slash
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Remote key for an identifier: prefix + decoded identifier
    pub fn remote_key(&self, ident: &str) -> String {
        format!("{}{}", self.prefix, decode_identifier(ident))
    }
}

/// Local cache path for an identifier: cache root / decoded identifier.
///
/// Rejects identifiers that would land outside `cache_root`, and identifiers
/// whose `.` or empty segments would fold onto another identifier's path.
pub fn cache_path(cache_root: &Path, ident: &str) -> ResolverResult<PathBuf> {
    let decoded = decode_identifier(ident);
    let relative = Path::new(decoded.as_ref());

    if decoded.is_empty() {
        return Err(invalid(ident, "identifier is empty"));
    }
    if relative.has_root() {
        return Err(invalid(ident, "is an absolute path"));
    }

    // Path::components() normalizes `a//b` and `./a`, so check the raw segments
    for segment in decoded.split('/') {
        match segment {
            "" => return Err(invalid(ident, "contains an empty path segment")),
            "." => return Err(invalid(ident, "contains a '.' component")),
            ".." => return Err(invalid(ident, "contains a '..' component")),
            _ => {}
        }
    }

    for component in relative.components() {
        match component {
            Component::Normal(_) => {}
            Component::CurDir | Component::ParentDir => {
                return Err(invalid(ident, "contains a relative component"))
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid(ident, "is an absolute path"))
            }
        }
    }

    Ok(cache_root.join(relative))
}

fn invalid(ident: &str, reason: &str) -> ResolverError {
    ResolverError::InvalidIdentifier {
        ident: ident.to_string(),
        reason: reason.to_string(),
    }
}
