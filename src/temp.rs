//! The self-cleaning temporary directory.

use std::fmt;
use std::future::Future;
use std::ops::{Deref, DerefMut};

use tracing::error;

use crate::dir::Dir;
use crate::error::FsError;
use crate::kind::{sealed, PathCast, PathKind};
use crate::path::FsPath;

/// A directory handle under the OS temporary root with a random unique
/// name. Construction performs no I/O; the directory only exists while a
/// [`with_scope`](TempDir::with_scope) body runs.
#[derive(Debug, Clone)]
pub struct TempDir {
    dir: Dir,
}

impl TempDir {
    pub fn new() -> Self {
        Self::with_prefix("fspath")
    }

    /// Pick a fresh `<temp root>/<prefix>-<random>` path.
    pub fn with_prefix(prefix: &str) -> Self {
        let name = format!("{prefix}-{:012x}", rand::random::<u64>());
        TempDir {
            dir: Dir::new(std::env::temp_dir().join(name)),
        }
    }

    /// Scoped acquisition: create the directory, run `body` with an owned
    /// directory handle for it, and remove the directory recursively on
    /// every exit path before returning.
    ///
    /// A body failure never suppresses the cleanup attempt. When cleanup
    /// itself fails after a successful body, that failure is the result;
    /// after a failed body the cleanup failure is reported at error level
    /// and the body's error wins. The temporary handle is consumed, so
    /// nothing can touch the path after cleanup.
    pub async fn with_scope<T, F, Fut>(mut self, body: F) -> Result<T, FsError>
    where
        F: FnOnce(Dir) -> Fut,
        Fut: Future<Output = Result<T, FsError>>,
    {
        self.dir.create(true).await?;
        let result = body(self.dir.clone()).await;
        let cleanup = tokio::fs::remove_dir_all(self.dir.as_path()).await;
        self.dir.invalidate();
        match (result, cleanup) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(FsError::io(self.dir.as_path(), e)),
            (Err(body_err), Ok(())) => Err(body_err),
            (Err(body_err), Err(cleanup_err)) => {
                error!(
                    path = %self.dir,
                    cleanup = %cleanup_err,
                    "temporary directory cleanup failed after scope error"
                );
                Err(body_err)
            }
        }
    }
}

impl Default for TempDir {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for TempDir {
    type Target = Dir;

    fn deref(&self) -> &Dir {
        &self.dir
    }
}

impl DerefMut for TempDir {
    fn deref_mut(&mut self) -> &mut Dir {
        &mut self.dir
    }
}

impl sealed::Sealed for TempDir {}

impl PathCast for TempDir {
    const KIND: PathKind = PathKind::Temporary;

    fn from_raw(raw: FsPath) -> Self {
        TempDir {
            dir: Dir::from_raw(raw),
        }
    }

    fn raw(&self) -> &FsPath {
        PathCast::raw(&self.dir)
    }
}

impl fmt::Display for TempDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir)
    }
}
