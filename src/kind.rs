//! Path flavors and the checked casting discipline.
//!
//! Every handle carries one of a closed set of kinds. Casting between
//! handles is a pure lookup over (current kind, requested kind): the
//! file-flavored kinds (`File`, `Structured`) and the directory-flavored
//! kinds (`Directory`, `Temporary`) refuse to cast into each other, while
//! `Generic` casts freely in both directions. The cast never inspects the
//! filesystem and never renames or moves anything.

use std::fmt;

use crate::error::FsError;
use crate::path::FsPath;

/// The capability-set tag of a path handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    Generic,
    File,
    Directory,
    Structured,
    Temporary,
}

impl PathKind {
    fn is_file_flavored(self) -> bool {
        matches!(self, PathKind::File | PathKind::Structured)
    }

    fn is_dir_flavored(self) -> bool {
        matches!(self, PathKind::Directory | PathKind::Temporary)
    }

    /// Compatibility table for checked casts.
    ///
    /// Rejects exactly the file-flavored ↔ directory-flavored pairs;
    /// everything involving `Generic`, identity and within-flavor casts
    /// succeed.
    pub fn can_cast(self, to: PathKind) -> bool {
        !(self.is_file_flavored() && to.is_dir_flavored()
            || self.is_dir_flavored() && to.is_file_flavored())
    }
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PathKind::Generic => "generic",
            PathKind::File => "file",
            PathKind::Directory => "directory",
            PathKind::Structured => "structured-file",
            PathKind::Temporary => "temporary-directory",
        };
        f.write_str(name)
    }
}

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// Casting between the handle types.
///
/// Implemented by all five handles. `cast` consults the
/// [`PathKind::can_cast`] table and returns a new handle sharing the same
/// normalized path with fresh caches; `cast_unchecked` skips the table for
/// callers that have already established the invariant (for example after a
/// successful `is_file` check).
pub trait PathCast: sealed::Sealed + Sized {
    /// The flavor of this handle type.
    const KIND: PathKind;

    #[doc(hidden)]
    fn from_raw(raw: FsPath) -> Self;

    #[doc(hidden)]
    fn raw(&self) -> &FsPath;

    /// The flavor of this handle.
    fn kind(&self) -> PathKind {
        Self::KIND
    }

    /// Checked cast into another flavor.
    fn cast<T: PathCast>(&self) -> Result<T, FsError> {
        if Self::KIND.can_cast(T::KIND) {
            Ok(self.cast_unchecked())
        } else {
            Err(FsError::TypeMismatch {
                path: self.raw().as_path().to_path_buf(),
                from: Self::KIND,
                to: T::KIND,
            })
        }
    }

    /// Cast without consulting the compatibility table. Never fails.
    fn cast_unchecked<T: PathCast>(&self) -> T {
        T::from_raw(self.raw().fresh())
    }
}

#[cfg(test)]
mod tests {
    use super::PathKind::*;

    #[test]
    fn generic_casts_to_everything() {
        for to in [Generic, File, Directory, Structured, Temporary] {
            assert!(Generic.can_cast(to), "generic -> {to}");
            assert!(to.can_cast(Generic), "{to} -> generic");
        }
    }

    #[test]
    fn file_flavors_refuse_dir_flavors() {
        for from in [File, Structured] {
            for to in [Directory, Temporary] {
                assert!(!from.can_cast(to), "{from} -> {to}");
                assert!(!to.can_cast(from), "{to} -> {from}");
            }
        }
    }

    #[test]
    fn within_flavor_casts_succeed() {
        assert!(File.can_cast(Structured));
        assert!(Structured.can_cast(File));
        assert!(Directory.can_cast(Temporary));
        assert!(Temporary.can_cast(Directory));
        for k in [Generic, File, Directory, Structured, Temporary] {
            assert!(k.can_cast(k), "{k} -> {k}");
        }
    }
}
