use std::time::SystemTime;

/// Snapshot of a filesystem entity's attributes from one stat call.
///
/// Read-only and replaced wholesale on refresh; a handle never patches an
/// individual field of a cached record.
#[derive(Debug, Clone)]
pub struct Metadata {
    len: u64,
    is_file: bool,
    is_dir: bool,
    is_symlink: bool,
    modified: Option<SystemTime>,
    accessed: Option<SystemTime>,
    created: Option<SystemTime>,
}

impl Metadata {
    /// Size in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when the entity is a regular file.
    pub fn is_file(&self) -> bool {
        self.is_file
    }

    /// True when the entity is a directory.
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// True when the record was taken from a symlink itself (lstat).
    pub fn is_symlink(&self) -> bool {
        self.is_symlink
    }

    /// Last modification time, when the platform reports one.
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    /// Last access time, when the platform reports one.
    pub fn accessed(&self) -> Option<SystemTime> {
        self.accessed
    }

    /// Creation time, when the platform reports one.
    pub fn created(&self) -> Option<SystemTime> {
        self.created
    }
}

impl From<std::fs::Metadata> for Metadata {
    fn from(meta: std::fs::Metadata) -> Self {
        Metadata {
            len: meta.len(),
            is_file: meta.is_file(),
            is_dir: meta.is_dir(),
            is_symlink: meta.file_type().is_symlink(),
            modified: meta.modified().ok(),
            accessed: meta.accessed().ok(),
            created: meta.created().ok(),
        }
    }
}
