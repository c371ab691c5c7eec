//! The directory handle: shallow and deep listing, tree walk, clear, and
//! recursive copy/move/remove.
//!
//! The deep listings fan out one concurrent scan per subdirectory and join
//! them per level before returning, so in-flight scans grow with directory
//! breadth (unbounded, an accepted non-goal). `walk` is the opposite:
//! strictly sequential, one branch at a time, visitor before recursion.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use futures::future::{join_all, try_join_all, BoxFuture, LocalBoxFuture};
use tracing::debug;

use crate::error::FsError;
use crate::file::{ensure_parent, resolve_target, File};
use crate::kind::{sealed, PathCast, PathKind};
use crate::path::FsPath;

/// One directory entry: a file or a subdirectory handle.
///
/// Entries that are neither regular files nor directories (sockets, FIFOs,
/// dangling symlinks) are skipped by the listings.
#[derive(Debug, Clone)]
pub enum Entry {
    File(File),
    Dir(Dir),
}

impl Entry {
    pub fn path(&self) -> &Path {
        match self {
            Entry::File(f) => f.as_path(),
            Entry::Dir(d) => d.as_path(),
        }
    }

    /// Final path segment.
    pub fn name(&self) -> Option<String> {
        match self {
            Entry::File(f) => f.basename(),
            Entry::Dir(d) => d.basename(),
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Entry::Dir(_))
    }
}

/// Scan one directory level, in whatever order the OS yields entries.
async fn scan_entries(path: &Path) -> Result<Vec<Entry>, FsError> {
    let mut reader = tokio::fs::read_dir(path)
        .await
        .map_err(|e| FsError::io(path, e))?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await.map_err(|e| FsError::io(path, e))? {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| FsError::io(entry.path(), e))?;
        if file_type.is_file() {
            entries.push(Entry::File(File::new(entry.path())));
        } else if file_type.is_dir() {
            entries.push(Entry::Dir(Dir::new(entry.path())));
        }
    }
    Ok(entries)
}

/// Recursive concurrent scan: files of this level first, then each
/// subdirectory followed by its own subtree (pre-order). Sibling subtrees
/// are scanned concurrently and merged in sibling order.
fn scan_tree(path: PathBuf) -> BoxFuture<'static, Result<Vec<Entry>, FsError>> {
    Box::pin(async move {
        let level = scan_entries(&path).await?;
        let (files, dirs): (Vec<Entry>, Vec<Entry>) =
            level.into_iter().partition(|e| !e.is_dir());
        let subtrees = try_join_all(
            dirs.iter()
                .map(|d| scan_tree(d.path().to_path_buf())),
        )
        .await?;
        let mut out = files;
        for (dir, subtree) in dirs.into_iter().zip(subtrees) {
            out.push(dir);
            out.extend(subtree);
        }
        Ok(out)
    })
}

fn walk_inner<'v, F>(path: PathBuf, visit: &'v mut F) -> LocalBoxFuture<'v, Result<(), FsError>>
where
    F: for<'a> FnMut(&'a Entry) -> LocalBoxFuture<'a, Result<(), FsError>>,
{
    Box::pin(async move {
        for entry in scan_entries(&path).await? {
            visit(&entry).await?;
            if let Entry::Dir(dir) = &entry {
                walk_inner(dir.as_path().to_path_buf(), &mut *visit).await?;
            }
        }
        Ok(())
    })
}

/// A directory-flavored path handle.
#[derive(Debug, Clone)]
pub struct Dir {
    raw: FsPath,
}

impl Dir {
    /// Handle for `path`. No I/O; the directory need not exist yet.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Dir {
            raw: FsPath::new(path),
        }
    }

    /// True when the path exists *as a directory*.
    pub async fn exists(&mut self) -> Result<bool, FsError> {
        self.raw.is_dir().await
    }

    /// Immediate children, files and directories alike, in OS scan order
    /// (not sorted; callers wanting determinism sort the result).
    pub async fn list(&self) -> Result<Vec<Entry>, FsError> {
        scan_entries(self.raw.as_path()).await
    }

    /// Immediate child files.
    pub async fn list_files(&self) -> Result<Vec<File>, FsError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter_map(|e| match e {
                Entry::File(f) => Some(f),
                Entry::Dir(_) => None,
            })
            .collect())
    }

    /// Immediate child directories.
    pub async fn list_dirs(&self) -> Result<Vec<Dir>, FsError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter_map(|e| match e {
                Entry::Dir(d) => Some(d),
                Entry::File(_) => None,
            })
            .collect())
    }

    /// Every entry in the subtree. Subdirectories are scanned
    /// concurrently; a directory always appears before its descendants.
    pub async fn list_deep(&self) -> Result<Vec<Entry>, FsError> {
        scan_tree(self.raw.as_path().to_path_buf()).await
    }

    /// Every file in the subtree.
    pub async fn list_files_deep(&self) -> Result<Vec<File>, FsError> {
        Ok(self
            .list_deep()
            .await?
            .into_iter()
            .filter_map(|e| match e {
                Entry::File(f) => Some(f),
                Entry::Dir(_) => None,
            })
            .collect())
    }

    /// Every directory in the subtree (the root itself is not included).
    pub async fn list_dirs_deep(&self) -> Result<Vec<Dir>, FsError> {
        Ok(self
            .list_deep()
            .await?
            .into_iter()
            .filter_map(|e| match e {
                Entry::Dir(d) => Some(d),
                Entry::File(_) => None,
            })
            .collect())
    }

    /// Depth-first pre-order traversal. The visitor runs once per entry;
    /// recursion into a subdirectory starts only after the visitor call
    /// for that subdirectory has returned, so exactly one branch is in
    /// flight at any time. A visitor error aborts the traversal.
    pub async fn walk<F>(&self, mut visit: F) -> Result<(), FsError>
    where
        F: for<'a> FnMut(&'a Entry) -> LocalBoxFuture<'a, Result<(), FsError>>,
    {
        walk_inner(self.raw.as_path().to_path_buf(), &mut visit).await
    }

    /// Remove every immediate child (directories recursively) without
    /// removing the directory itself. Child removals run concurrently and
    /// all are attempted; the first failure, if any, is returned.
    pub async fn clear(&mut self) -> Result<(), FsError> {
        debug!(path = %self.raw, "clearing directory");
        self.raw.invalidate();
        let entries = self.list().await?;
        let removals = entries.into_iter().map(|entry| async move {
            match entry {
                Entry::File(f) => tokio::fs::remove_file(f.as_path())
                    .await
                    .map_err(|e| FsError::io(f.as_path(), e)),
                Entry::Dir(d) => tokio::fs::remove_dir_all(d.as_path())
                    .await
                    .map_err(|e| FsError::io(d.as_path(), e)),
            }
        });
        for result in join_all(removals).await {
            result?;
        }
        Ok(())
    }

    /// Recursively delete the directory and everything in it.
    pub async fn remove(&mut self) -> Result<(), FsError> {
        debug!(path = %self.raw, "removing directory");
        self.raw.invalidate();
        tokio::fs::remove_dir_all(self.raw.as_path())
            .await
            .map_err(|e| FsError::io(self.raw.as_path(), e))
    }

    /// Create the directory. With `recursive` the whole chain is created;
    /// without it the parent must already exist and an existing directory
    /// at this path is an error.
    pub async fn create(&mut self, recursive: bool) -> Result<(), FsError> {
        self.raw.invalidate();
        let result = if recursive {
            tokio::fs::create_dir_all(self.raw.as_path()).await
        } else {
            tokio::fs::create_dir(self.raw.as_path()).await
        };
        result.map_err(|e| FsError::io(self.raw.as_path(), e))
    }

    /// Create the directory chain only where missing. Idempotent.
    pub async fn ensure(&mut self) -> Result<(), FsError> {
        self.raw.invalidate();
        tokio::fs::create_dir_all(self.raw.as_path())
            .await
            .map_err(|e| FsError::io(self.raw.as_path(), e))
    }

    /// Recursively copy the subtree so that `target` becomes a replica of
    /// this directory. Unlike [`move_to`](Dir::move_to), an existing
    /// `target` is not treated as a parent: the content lands directly
    /// inside it. The copy itself is blocking work and runs on the
    /// blocking pool.
    pub async fn copy_to(&self, target: impl AsRef<Path>) -> Result<(), FsError> {
        let src = self.raw.as_path().to_path_buf();
        let dest = target.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dest)
            .await
            .map_err(|e| FsError::io(&dest, e))?;
        let dest_for_copy = dest.clone();
        let copied = tokio::task::spawn_blocking(move || {
            let mut options = fs_extra::dir::CopyOptions::new();
            options.content_only = true;
            options.buffer_size = 64 * 1024;
            fs_extra::dir::copy(&src, &dest_for_copy, &options)
        })
        .await
        .map_err(|e| FsError::io(&dest, std::io::Error::other(e)))?;
        copied.map_err(|e| FsError::io(&dest, std::io::Error::other(e)))?;
        Ok(())
    }

    /// Atomically relocate the whole subtree. When `target` is an
    /// existing directory the source keeps its name inside it. Same
    /// `modifying` semantics as the file handle; cross-device failures
    /// propagate verbatim.
    pub async fn move_to(
        &mut self,
        target: impl AsRef<Path>,
        modifying: bool,
    ) -> Result<(), FsError> {
        let dest = resolve_target(target.as_ref(), self.raw.as_path().file_name()).await?;
        debug!(from = %self.raw, to = %dest.display(), "moving directory");
        self.raw.invalidate();
        ensure_parent(&dest).await?;
        tokio::fs::rename(self.raw.as_path(), &dest)
            .await
            .map_err(|e| FsError::io(self.raw.as_path(), e))?;
        if modifying {
            self.raw.set_path(dest);
        }
        Ok(())
    }

    /// Rename the directory within its parent. Same `modifying`
    /// semantics as [`move_to`](Dir::move_to).
    pub async fn rename_to(&mut self, new_name: &str, modifying: bool) -> Result<(), FsError> {
        let dest = self.raw.with_name(new_name).into_path_buf();
        self.raw.invalidate();
        tokio::fs::rename(self.raw.as_path(), &dest)
            .await
            .map_err(|e| FsError::io(self.raw.as_path(), e))?;
        if modifying {
            self.raw.set_path(dest);
        }
        Ok(())
    }
}

impl Deref for Dir {
    type Target = FsPath;

    fn deref(&self) -> &FsPath {
        &self.raw
    }
}

impl DerefMut for Dir {
    fn deref_mut(&mut self) -> &mut FsPath {
        &mut self.raw
    }
}

impl sealed::Sealed for Dir {}

impl PathCast for Dir {
    const KIND: PathKind = PathKind::Directory;

    fn from_raw(raw: FsPath) -> Self {
        Dir { raw }
    }

    fn raw(&self) -> &FsPath {
        &self.raw
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl PartialEq for Dir {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Dir {}
