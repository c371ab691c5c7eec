use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::kind::PathKind;

/// Errors produced by path handles and filesystem operations.
#[derive(Error, Debug)]
pub enum FsError {
    /// Underlying OS failure, surfaced verbatim with the path it hit.
    #[error("I/O error at `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Checked cast between incompatible path flavors.
    #[error("cannot cast {from} path `{path}` to {to}")]
    TypeMismatch {
        path: PathBuf,
        from: PathKind,
        to: PathKind,
    },

    /// Malformed structured-data payload.
    #[error("failed to decode `{path}`: {source}")]
    Deserialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be encoded for a structured-data file.
    #[error("failed to encode value for `{path}`: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl FsError {
    /// Wrap an OS error with the path the operation was applied to.
    pub(crate) fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        FsError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// True when the error is a NotFound condition from the OS.
    ///
    /// The existence and type predicates translate this case to `false`;
    /// every other caller propagates it.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FsError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound
        )
    }
}
