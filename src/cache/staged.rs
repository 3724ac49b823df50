//! Temporary download targets renamed into place on success

use crate::error::{ResolverError, ResolverResult};
use sha2::{Digest, Sha256};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

/// Suffix shared by all staging files
pub const STAGING_SUFFIX: &str = ".part";

/// A staging file next to its final cache path.
///
/// Dropping an uncommitted `StagedFile` deletes the staging file, which also
/// covers a cancelled download future.
#[derive(Debug)]
pub struct StagedFile {
    staging: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedFile {
    /// Reserve a unique staging path for `target` without touching the filesystem
    pub fn new(target: &Path) -> Self {
        let name = target
            .file_name()
            .map(staging_stem)
            .unwrap_or_else(|| OsString::from("object"));

        let mut staged_name = OsString::from(".");
        staged_name.push(&name);
        staged_name.push(format!(".{}{}", Uuid::new_v4().simple(), STAGING_SUFFIX));

        Self {
            staging: target.with_file_name(staged_name),
            target: target.to_path_buf(),
            committed: false,
        }
    }

    /// Where the download should be written
    pub fn path(&self) -> &Path {
        &self.staging
    }

    /// Final cache path
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Atomically move the staging file to its final path
    pub async fn commit(mut self) -> ResolverResult<PathBuf> {
        fs::rename(&self.staging, &self.target)
            .await
            .map_err(|e| ResolverError::CacheWrite {
                path: self.target.clone(),
                source: e,
            })?;
        self.committed = true;
        debug!("Committed {}", self.target.display());
        Ok(self.target.clone())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match std::fs::remove_file(&self.staging) {
            Ok(()) => debug!("Removed staging file {}", self.staging.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove staging file {}: {}",
                self.staging.display(),
                e
            ),
        }
    }
}

/// Longest file name kept verbatim in a staging name; the dot, uuid and
/// suffix add 39 bytes and most filesystems stop at 255
const MAX_STEM_BYTES: usize = 200;

/// Staging names embed the target name, hashed when it is too long to fit
fn staging_stem(name: &OsStr) -> OsString {
    let bytes = name.as_encoded_bytes();
    if bytes.len() <= MAX_STEM_BYTES {
        return name.to_os_string();
    }
    OsString::from(hex::encode(Sha256::digest(bytes)))
}

/// Whether a file name belongs to an in-progress download
pub fn is_staging_name(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(STAGING_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn staging_path_is_hidden_sibling() {
        let staged = StagedFile::new(Path::new("/tmp/cache/sub/dog.jpg"));
        let name = staged.path().file_name().unwrap().to_str().unwrap();

        assert_eq!(staged.path().parent(), Some(Path::new("/tmp/cache/sub")));
        assert!(name.starts_with(".dog.jpg."));
        assert!(is_staging_name(name));
    }

    #[test]
    fn staging_paths_are_unique() {
        let a = StagedFile::new(Path::new("/tmp/cache/dog.jpg"));
        let b = StagedFile::new(Path::new("/tmp/cache/dog.jpg"));
        assert_ne!(a.path(), b.path());
    }

    #[tokio::test]
    async fn commit_moves_into_place() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("dog.jpg");
        let staged = StagedFile::new(&target);
        std::fs::write(staged.path(), b"jpeg").unwrap();
        let staging = staged.path().to_path_buf();

        let path = staged.commit().await.unwrap();

        assert_eq!(path, target);
        assert_eq!(std::fs::read(&target).unwrap(), b"jpeg");
        assert!(!staging.exists());
    }

    #[test]
    fn drop_without_commit_removes_staging() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("dog.jpg");
        let staged = StagedFile::new(&target);
        std::fs::write(staged.path(), b"partial").unwrap();
        let staging = staged.path().to_path_buf();

        drop(staged);

        assert!(!staging.exists());
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn long_names_get_short_staging_names() {
        let temp = TempDir::new().unwrap();
        let name = format!("{}.jpg", "a".repeat(250));
        let target = temp.path().join(&name);
        let staged = StagedFile::new(&target);

        let staged_name = staged.path().file_name().unwrap().to_str().unwrap();
        assert!(staged_name.len() <= 255);
        assert!(is_staging_name(staged_name));
        assert_eq!(staged.target(), target.as_path());

        std::fs::write(staged.path(), b"jpeg").unwrap();
        let path = staged.commit().await.unwrap();
        assert_eq!(path, target);
        assert_eq!(std::fs::read(&target).unwrap(), b"jpeg");
    }
}
