//! File-based key-value store.
//!
//! Stores one file per key with a 2-level fan-out directory structure:
//! `{base_dir}/{hex[0..2]}/{hex[2..4]}/{hex}`.

use std::io::Write;
use std::path::{Path, PathBuf};

use mdag_types::Digest;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::KvStore;

/// File-based store with 2-level fan-out directory layout.
///
/// Writes are atomic: the value is written to a temporary file in the
/// target directory first, then renamed into place, so a reader never sees
/// a half-written value.
pub struct FsKvStore {
    base_dir: PathBuf,
    read_only: bool,
}

impl FsKvStore {
    /// Open a store rooted at the given directory, creating it if needed.
    pub fn open(base_dir: impl AsRef<Path>) -> StoreResult<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir).map_err(|e| StoreError::io(&base_dir, e))?;
        Ok(Self {
            base_dir,
            read_only: false,
        })
    }

    /// Open an existing store for reading. `put` fails with
    /// [`StoreError::ReadOnly`].
    pub fn open_read_only(base_dir: impl AsRef<Path>) -> StoreResult<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let meta = std::fs::metadata(&base_dir).map_err(|e| StoreError::io(&base_dir, e))?;
        if !meta.is_dir() {
            return Err(StoreError::io(
                &base_dir,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
            ));
        }
        Ok(Self {
            base_dir,
            read_only: true,
        })
    }

    /// Root directory of the store.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Full file path for a key.
    fn entry_path(&self, key: &Digest) -> PathBuf {
        let hex = key.to_hex();
        self.base_dir.join(&hex[0..2]).join(&hex[2..4]).join(&hex)
    }
}

impl KvStore for FsKvStore {
    fn has(&self, key: &Digest) -> StoreResult<bool> {
        let path = self.entry_path(key);
        match std::fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn put(&self, key: &Digest, value: &[u8]) -> StoreResult<()> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        let path = self.entry_path(key);
        let parent = path.parent().unwrap_or(&self.base_dir);
        std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;

        let mut tmp =
            tempfile::NamedTempFile::new_in(parent).map_err(|e| StoreError::io(parent, e))?;
        tmp.write_all(value)
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.persist(&path)
            .map_err(|e| StoreError::io(&path, e.error))?;

        debug!(key = %key.short_hex(), path = %path.display(), size = value.len(), "stored value to file");
        Ok(())
    }

    fn get(&self, key: &Digest) -> StoreResult<Option<Vec<u8>>> {
        let path = self.entry_path(key);
        match std::fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }
}

impl std::fmt::Debug for FsKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsKvStore")
            .field("base_dir", &self.base_dir)
            .field("read_only", &self.read_only)
            .finish()
    }
}
