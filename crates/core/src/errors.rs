//! Filesystem error taxonomy shared by the command handlers.

use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// The target of the operation does not exist
    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),

    /// The target of a create is already present
    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    /// Permission, disk or any other provider-level failure
    #[error("I/O failure on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Classifies an `io::Error` raised while operating on `path`.
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => FsError::NotFound(path.to_path_buf()),
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists(path.to_path_buf()),
            _ => FsError::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound(_))
    }
}
