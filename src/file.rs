//! The regular-file handle.

use std::ffi::OsStr;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::FsError;
use crate::kind::{sealed, PathCast, PathKind};
use crate::path::FsPath;

/// Create the parent directory chain of `path` if it is missing.
pub(crate) async fn ensure_parent(path: &Path) -> Result<(), FsError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| FsError::io(parent, e))?;
    }
    Ok(())
}

/// Resolve the destination for a copy or move: when `dst` is an existing
/// directory the source keeps its name inside it, otherwise `dst` is the
/// final path. A missing destination is fine; any other stat failure
/// propagates.
pub(crate) async fn resolve_target(
    dst: &Path,
    src_name: Option<&OsStr>,
) -> Result<PathBuf, FsError> {
    let dst_is_dir = match tokio::fs::metadata(dst).await {
        Ok(meta) => meta.is_dir(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => return Err(FsError::io(dst, e)),
    };
    Ok(match src_name {
        Some(name) if dst_is_dir => dst.join(name),
        _ => dst.to_path_buf(),
    })
}

/// A file-flavored path handle.
///
/// Adds content I/O on top of [`FsPath`] (reachable through deref). Text
/// reads go through a per-handle content cache; every mutating operation
/// drops both the content and metadata caches before touching the disk, so
/// a failed attempt never leaves a trusted cache behind.
#[derive(Debug, Clone)]
pub struct File {
    raw: FsPath,
    content: Option<String>,
}

impl File {
    /// Handle for `path`. No I/O; the file need not exist yet.
    pub fn new(path: impl AsRef<Path>) -> Self {
        File {
            raw: FsPath::new(path),
            content: None,
        }
    }

    /// True when the path exists *as a regular file*. A directory or
    /// special file at this path is `false`, not an error.
    pub async fn exists(&mut self) -> Result<bool, FsError> {
        self.raw.is_file().await
    }

    /// Read the file as UTF-8 text. Populates the content cache; repeated
    /// reads return the cached copy until a mutation invalidates it.
    pub async fn read(&mut self) -> Result<String, FsError> {
        if let Some(content) = &self.content {
            return Ok(content.clone());
        }
        let content = tokio::fs::read_to_string(self.raw.as_path())
            .await
            .map_err(|e| FsError::io(self.raw.as_path(), e))?;
        self.content = Some(content.clone());
        Ok(content)
    }

    /// Read the raw bytes. Never consults or populates the content cache.
    pub async fn read_bytes(&mut self) -> Result<Vec<u8>, FsError> {
        tokio::fs::read(self.raw.as_path())
            .await
            .map_err(|e| FsError::io(self.raw.as_path(), e))
    }

    /// Write `data`, creating parent directories first when
    /// `ensure_parent` is set. Both caches are dropped *before* the write:
    /// once an attempt has been made they cannot be trusted, whether or
    /// not it succeeded.
    pub async fn write(
        &mut self,
        data: impl AsRef<[u8]>,
        ensure_parents: bool,
    ) -> Result<(), FsError> {
        self.invalidate();
        if ensure_parents {
            ensure_parent(self.raw.as_path()).await?;
        }
        tokio::fs::write(self.raw.as_path(), data.as_ref())
            .await
            .map_err(|e| FsError::io(self.raw.as_path(), e))
    }

    /// Write `data` through a uniquely named temporary file in the same
    /// directory, renamed into place afterwards, so other processes never
    /// observe a partial file. The temporary file is removed when any step
    /// fails.
    pub async fn write_atomic(&mut self, data: impl AsRef<[u8]>) -> Result<(), FsError> {
        self.invalidate();
        ensure_parent(self.raw.as_path()).await?;
        let dir = match self.raw.as_path().parent() {
            Some(parent) => parent.to_path_buf(),
            // No parent: a bare relative name writes into the cwd.
            None => PathBuf::from("."),
        };
        let tmp = dir.join(format!(".tmp_write.{:012x}", rand::random::<u64>()));
        if let Err(e) = tokio::fs::write(&tmp, data.as_ref()).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(FsError::io(&tmp, e));
        }
        if let Err(e) = tokio::fs::rename(&tmp, self.raw.as_path()).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(FsError::io(self.raw.as_path(), e));
        }
        Ok(())
    }

    /// Append `data` to the existing file. A missing file is an error.
    pub async fn append(&mut self, data: impl AsRef<[u8]>) -> Result<(), FsError> {
        self.invalidate();
        let mut handle = tokio::fs::OpenOptions::new()
            .append(true)
            .open(self.raw.as_path())
            .await
            .map_err(|e| FsError::io(self.raw.as_path(), e))?;
        handle
            .write_all(data.as_ref())
            .await
            .map_err(|e| FsError::io(self.raw.as_path(), e))?;
        handle
            .flush()
            .await
            .map_err(|e| FsError::io(self.raw.as_path(), e))
    }

    /// Size in bytes, from the cached-or-fresh metadata record.
    pub async fn size(&mut self) -> Result<u64, FsError> {
        Ok(self.raw.stat().await?.len())
    }

    /// Delete the file. Fails when it does not exist.
    pub async fn remove(&mut self) -> Result<(), FsError> {
        debug!(path = %self.raw, "removing file");
        self.invalidate();
        tokio::fs::remove_file(self.raw.as_path())
            .await
            .map_err(|e| FsError::io(self.raw.as_path(), e))
    }

    /// Create an empty file, truncating any existing one. With
    /// `recursive` the whole parent chain is created; without it only the
    /// immediate parent (which tolerates already existing).
    pub async fn create(&mut self, recursive: bool) -> Result<(), FsError> {
        self.invalidate();
        if let Some(parent) = self.raw.as_path().parent() {
            if recursive {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| FsError::io(parent, e))?;
            } else if let Err(e) = tokio::fs::create_dir(parent).await {
                if e.kind() != std::io::ErrorKind::AlreadyExists {
                    return Err(FsError::io(parent, e));
                }
            }
        }
        tokio::fs::File::create(self.raw.as_path())
            .await
            .map_err(|e| FsError::io(self.raw.as_path(), e))?;
        Ok(())
    }

    /// Create the file only when it does not exist yet. Idempotent: an
    /// existing file is left untouched, content included.
    pub async fn ensure(&mut self) -> Result<(), FsError> {
        self.invalidate();
        ensure_parent(self.raw.as_path()).await?;
        tokio::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.raw.as_path())
            .await
            .map_err(|e| FsError::io(self.raw.as_path(), e))?;
        Ok(())
    }

    /// Copy the file's content to `target`. When `target` is an existing
    /// directory the copy keeps the source name inside it. The source
    /// handle is unchanged.
    pub async fn copy_to(&self, target: impl AsRef<Path>) -> Result<(), FsError> {
        let dest = resolve_target(target.as_ref(), self.raw.as_path().file_name()).await?;
        ensure_parent(&dest).await?;
        tokio::fs::copy(self.raw.as_path(), &dest)
            .await
            .map_err(|e| FsError::io(&dest, e))?;
        Ok(())
    }

    /// Atomically relocate the file to `target`. With `modifying` the
    /// handle follows to the destination; without it the handle stays a
    /// stale reference to the old path. Cross-device failures propagate
    /// verbatim, with no copy-and-remove fallback.
    pub async fn move_to(
        &mut self,
        target: impl AsRef<Path>,
        modifying: bool,
    ) -> Result<(), FsError> {
        let dest = resolve_target(target.as_ref(), self.raw.as_path().file_name()).await?;
        debug!(from = %self.raw, to = %dest.display(), "moving file");
        self.invalidate();
        ensure_parent(&dest).await?;
        tokio::fs::rename(self.raw.as_path(), &dest)
            .await
            .map_err(|e| FsError::io(self.raw.as_path(), e))?;
        if modifying {
            self.raw.set_path(dest);
        }
        Ok(())
    }

    /// Rename the file within its parent directory. Same `modifying`
    /// semantics as [`move_to`](File::move_to).
    pub async fn rename_to(&mut self, new_name: &str, modifying: bool) -> Result<(), FsError> {
        let dest = self.raw.with_name(new_name).into_path_buf();
        self.invalidate();
        tokio::fs::rename(self.raw.as_path(), &dest)
            .await
            .map_err(|e| FsError::io(self.raw.as_path(), e))?;
        if modifying {
            self.raw.set_path(dest);
        }
        Ok(())
    }

    /// Drop both the metadata and content caches.
    pub fn invalidate(&mut self) {
        self.raw.invalidate();
        self.content = None;
    }
}

impl Deref for File {
    type Target = FsPath;

    fn deref(&self) -> &FsPath {
        &self.raw
    }
}

impl DerefMut for File {
    fn deref_mut(&mut self) -> &mut FsPath {
        &mut self.raw
    }
}

impl sealed::Sealed for File {}

impl PathCast for File {
    const KIND: PathKind = PathKind::File;

    fn from_raw(raw: FsPath) -> Self {
        File { raw, content: None }
    }

    fn raw(&self) -> &FsPath {
        &self.raw
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl PartialEq for File {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for File {}
