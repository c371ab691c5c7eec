//! The structured-data file handle: a file whose content is a serialized
//! JSON value rather than raw text.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::FsError;
use crate::file::File;
use crate::kind::{sealed, PathCast, PathKind};
use crate::path::FsPath;

/// A file handle with typed JSON read/write on top of [`File`].
#[derive(Debug, Clone)]
pub struct JsonFile {
    file: File,
}

impl JsonFile {
    /// Handle for `path`. No I/O; the file need not exist yet.
    pub fn new(path: impl AsRef<Path>) -> Self {
        JsonFile {
            file: File::new(path),
        }
    }

    /// Read and deserialize the content. A malformed payload is a
    /// [`FsError::Deserialize`]; the codec only checks that the text
    /// parses, never a schema.
    pub async fn read<T: DeserializeOwned>(&mut self) -> Result<T, FsError> {
        let text = self.file.read().await?;
        serde_json::from_str(&text).map_err(|e| FsError::Deserialize {
            path: self.file.as_path().to_path_buf(),
            source: e,
        })
    }

    /// Serialize `value` and write it, reusing the file write contract
    /// (parents ensured, caches invalidated before the attempt). Composite
    /// values (objects and arrays) are pretty-printed, scalars compact.
    pub async fn write<T: Serialize>(&mut self, value: &T) -> Result<(), FsError> {
        let tree = serde_json::to_value(value).map_err(|e| FsError::Serialize {
            path: self.file.as_path().to_path_buf(),
            source: e,
        })?;
        let text = if tree.is_object() || tree.is_array() {
            serde_json::to_string_pretty(&tree)
        } else {
            serde_json::to_string(&tree)
        }
        .map_err(|e| FsError::Serialize {
            path: self.file.as_path().to_path_buf(),
            source: e,
        })?;
        self.file.write(text, true).await
    }

    /// Create the file with an empty-object payload (`{}`) rather than an
    /// empty byte stream, truncating any existing content. Parent handling
    /// matches [`File::create`].
    pub async fn create(&mut self, recursive: bool) -> Result<(), FsError> {
        self.file.create(recursive).await?;
        self.file.write(b"{}", false).await
    }
}

impl Deref for JsonFile {
    type Target = File;

    fn deref(&self) -> &File {
        &self.file
    }
}

impl DerefMut for JsonFile {
    fn deref_mut(&mut self) -> &mut File {
        &mut self.file
    }
}

impl sealed::Sealed for JsonFile {}

impl PathCast for JsonFile {
    const KIND: PathKind = PathKind::Structured;

    fn from_raw(raw: FsPath) -> Self {
        JsonFile {
            file: File::from_raw(raw),
        }
    }

    fn raw(&self) -> &FsPath {
        PathCast::raw(&self.file)
    }
}

impl fmt::Display for JsonFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file)
    }
}

impl PartialEq for JsonFile {
    fn eq(&self, other: &Self) -> bool {
        self.file == other.file
    }
}

impl Eq for JsonFile {}
