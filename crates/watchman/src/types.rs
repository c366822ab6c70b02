use cmdwatch_core::errors::FsError;
use std::path::PathBuf;

/// What the notification source reported for the command file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// The file was (re)created, e.g. by an editor's atomic save
    Created,
    Modified,
    /// Synthetic change used to run the content present at startup
    Startup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub kind: ChangeKind,
    pub file_path: PathBuf,
}

impl WatchEvent {
    pub fn modified(file_path: impl Into<PathBuf>) -> Self {
        Self {
            kind: ChangeKind::Modified,
            file_path: file_path.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Processing,
    Terminated,
}

/// Result of handling one change, as reported to the log and to outcome subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created(PathBuf),
    AlreadyExists(PathBuf),
    Deleted(PathBuf),
    NotFound(PathBuf),
    Renamed { from: PathBuf, to: PathBuf },
    /// The source of a rename is gone, most likely renamed by an earlier notification
    AlreadyRenamed { from: PathBuf, to: PathBuf },
    Appended { path: PathBuf, bytes: usize },
    DuplicateAppend(PathBuf),
    /// No known command prefix
    Ignored,
    /// The command file content could not be turned into a command
    Rejected(String),
    Failed(String),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChangeError {
    #[error("cannot read command file: {0}")]
    Read(#[from] FsError),

    #[error("command file {} is not valid UTF-8: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: std::str::Utf8Error,
    },
}
