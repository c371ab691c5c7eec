//! Typed async handles for filesystem paths.
//!
//! A [`FsPath`] is an in-memory value: a lexically normalized path plus a
//! single cached metadata slot. The specialized flavors ([`File`],
//! [`Dir`], [`JsonFile`] and [`TempDir`]) are capability-restricted views
//! of the same path string, reached through the checked [`PathCast`]
//! casting table (a directory flavor never casts to a file flavor and vice
//! versa). Construction never touches the disk; all I/O methods are async
//! and surface OS failures verbatim, except that the existence predicates
//! translate NotFound to `false`.

pub mod dir;
pub mod error;
pub mod file;
pub mod json;
pub mod kind;
pub mod meta;
pub mod path;
pub mod temp;

pub use crate::dir::{Dir, Entry};
pub use crate::error::FsError;
pub use crate::file::File;
pub use crate::json::JsonFile;
pub use crate::kind::{PathCast, PathKind};
pub use crate::meta::Metadata;
pub use crate::path::FsPath;
pub use crate::temp::TempDir;
