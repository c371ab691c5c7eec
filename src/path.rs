//! The generic path handle.
//!
//! `FsPath` wraps a lexically normalized `PathBuf` together with a single
//! metadata cache slot. All path algebra is pure: it never touches the
//! filesystem and always returns new independent values. The stat methods
//! are the only I/O here and go through the cache slot; mutating operations
//! on the specialized handles clear that slot before touching the disk.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Component, Path, PathBuf};

use crate::error::FsError;
use crate::kind::{sealed, PathCast, PathKind};
use crate::meta::Metadata;

/// Lexically normalize a path: drop `.` segments, resolve `..` against
/// preceding normal segments, and collapse separators. No filesystem
/// access, so symlinks are not resolved.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::Prefix(p) => out.push(p.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` at the root stays at the root.
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                // Leading `..` on a relative path is kept.
                _ => out.push(".."),
            },
            Component::Normal(c) => out.push(c),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// A generic path handle: a normalized path plus one metadata cache slot.
///
/// Construction performs no I/O; the underlying entity may or may not
/// exist. The cache is per-handle: two handles for the same path share
/// nothing and can observe different stale states.
#[derive(Debug, Clone)]
pub struct FsPath {
    path: PathBuf,
    meta: Option<Metadata>,
}

impl FsPath {
    /// Create a handle for `path`, normalizing it first.
    pub fn new(path: impl AsRef<Path>) -> Self {
        FsPath {
            path: normalize(path.as_ref()),
            meta: None,
        }
    }

    /// The normalized path.
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.path
    }

    /// A new handle for the same path with an empty cache.
    pub(crate) fn fresh(&self) -> FsPath {
        FsPath {
            path: self.path.clone(),
            meta: None,
        }
    }

    /// Retarget the handle after a rename or move in `modifying` mode.
    pub(crate) fn set_path(&mut self, path: PathBuf) {
        self.path = normalize(&path);
        self.meta = None;
    }

    // ---- pure path algebra ----

    /// Append a segment. Chaining joins is associative with OS join
    /// semantics; an absolute segment replaces the path entirely, as with
    /// `Path::join`.
    pub fn join(&self, segment: impl AsRef<Path>) -> FsPath {
        FsPath::new(self.path.join(segment))
    }

    /// The parent directory, or `None` at a filesystem root.
    pub fn parent(&self) -> Option<FsPath> {
        self.path.parent().map(FsPath::new)
    }

    /// Express this path relative to `base`, lexically.
    ///
    /// Returns `None` when no lexical answer exists (one side absolute,
    /// the other relative, or a `..` in `base` that cannot be matched).
    pub fn relative_to(&self, base: impl AsRef<Path>) -> Option<FsPath> {
        let base = normalize(base.as_ref());
        if self.path.is_absolute() != base.is_absolute() {
            return None;
        }
        // A normalized path only carries `CurDir` when it is just ".",
        // and a lone "." contributes nothing to the walk.
        let mut own = self
            .path
            .components()
            .filter(|c| !matches!(c, Component::CurDir));
        let mut other = base
            .components()
            .filter(|c| !matches!(c, Component::CurDir));
        let mut comps: Vec<Component> = Vec::new();
        loop {
            match (own.next(), other.next()) {
                (None, None) => break,
                (Some(a), None) => {
                    comps.push(a);
                    comps.extend(own.by_ref());
                    break;
                }
                (None, Some(_)) => comps.push(Component::ParentDir),
                (Some(a), Some(b)) if comps.is_empty() && a == b => {}
                (Some(_), Some(Component::ParentDir)) => return None,
                (Some(a), Some(_)) => {
                    comps.push(Component::ParentDir);
                    for _ in other.by_ref() {
                        comps.push(Component::ParentDir);
                    }
                    comps.push(a);
                    comps.extend(own.by_ref());
                    break;
                }
            }
        }
        Some(FsPath::new(
            comps.iter().map(|c| c.as_os_str()).collect::<PathBuf>(),
        ))
    }

    /// Make the path absolute against the process working directory.
    /// Already-absolute paths come back unchanged (fresh handle).
    pub fn resolve(&self) -> Result<FsPath, FsError> {
        if self.path.is_absolute() {
            return Ok(self.fresh());
        }
        let cwd = std::env::current_dir().map_err(|e| FsError::io(&self.path, e))?;
        Ok(FsPath::new(cwd.join(&self.path)))
    }

    /// Replace the extension (without the dot).
    pub fn with_extension(&self, ext: impl AsRef<str>) -> FsPath {
        FsPath::new(self.path.with_extension(ext.as_ref()))
    }

    /// Replace the final path segment.
    pub fn with_name(&self, name: impl AsRef<str>) -> FsPath {
        FsPath::new(self.path.with_file_name(name.as_ref()))
    }

    /// Final path segment, if any.
    pub fn basename(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    }

    /// Final segment without its extension.
    pub fn stem(&self) -> Option<String> {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
    }

    /// Extension of the final segment, without the dot.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|n| n.to_string_lossy().into_owned())
    }

    pub fn is_absolute(&self) -> bool {
        self.path.is_absolute()
    }

    // ---- metadata ----

    /// Stat the path, following symlinks. At most one OS call per cache
    /// lifetime; the cached record is returned until [`invalidate`] or a
    /// mutating operation clears it.
    ///
    /// [`invalidate`]: FsPath::invalidate
    pub async fn stat(&mut self) -> Result<Metadata, FsError> {
        if let Some(meta) = &self.meta {
            return Ok(meta.clone());
        }
        let meta: Metadata = tokio::fs::metadata(&self.path)
            .await
            .map_err(|e| FsError::io(&self.path, e))?
            .into();
        self.meta = Some(meta.clone());
        Ok(meta)
    }

    /// Stat the path without following symlinks. Shares the cache slot
    /// with [`stat`](FsPath::stat); whichever ran last owns it.
    pub async fn lstat(&mut self) -> Result<Metadata, FsError> {
        if let Some(meta) = &self.meta {
            return Ok(meta.clone());
        }
        let meta: Metadata = tokio::fs::symlink_metadata(&self.path)
            .await
            .map_err(|e| FsError::io(&self.path, e))?
            .into();
        self.meta = Some(meta.clone());
        Ok(meta)
    }

    /// Drop the cached metadata record.
    pub fn invalidate(&mut self) {
        self.meta = None;
    }

    /// True when the path exists and is a regular file. A missing path is
    /// `false`, never an error; any other OS failure propagates.
    pub async fn is_file(&mut self) -> Result<bool, FsError> {
        match self.stat().await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// True when the path exists and is a directory. Same NotFound
    /// translation as [`is_file`](FsPath::is_file).
    pub async fn is_dir(&mut self) -> Result<bool, FsError> {
        match self.stat().await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl sealed::Sealed for FsPath {}

impl PathCast for FsPath {
    const KIND: PathKind = PathKind::Generic;

    fn from_raw(raw: FsPath) -> Self {
        raw
    }

    fn raw(&self) -> &FsPath {
        self
    }
}

impl fmt::Display for FsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl PartialEq for FsPath {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for FsPath {}

impl Hash for FsPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl AsRef<Path> for FsPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}
