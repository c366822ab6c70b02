//! File operations behind the four commands.
//!
//! Every handler turns its filesystem errors into an [`Outcome`] and logs it,
//! so a failing command never stops the watch loop.

use crate::command::Command;
use crate::types::Outcome;
use cmdwatch_core::errors::FsError;
use cmdwatch_core::path_utils;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

pub struct FileOps {
    base_dir: PathBuf,
    /// Content of the last successful append, guards against duplicate notifications
    last_appended: Option<String>,
}

impl FileOps {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            last_appended: None,
        }
    }

    pub fn last_appended(&self) -> Option<&str> {
        self.last_appended.as_deref()
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        path_utils::resolve(&self.base_dir, &path.to_string_lossy())
    }

    pub async fn apply(&mut self, command: &Command) -> Outcome {
        match command {
            Command::Create { path } => self.create(path).await,
            Command::Delete { path } => self.delete(path).await,
            Command::Rename { from, to } => self.rename(from, to).await,
            Command::Append { path, content } => self.append(path, content).await,
            Command::Unrecognized(text) => {
                debug!("🤷 No command in {:?}", text);
                Outcome::Ignored
            }
        }
    }

    pub async fn create(&self, path: &Path) -> Outcome {
        let target = self.resolve(path);
        match create_file(&target).await {
            Ok(()) => {
                info!("✨ A new file {} was created", target.display());
                Outcome::Created(target)
            }
            Err(FsError::AlreadyExists(target)) => {
                info!("📄 The file {} already exists", target.display());
                Outcome::AlreadyExists(target)
            }
            Err(e) => {
                error!("❌ Create failed: {}", e);
                Outcome::Failed(e.to_string())
            }
        }
    }

    pub async fn delete(&self, path: &Path) -> Outcome {
        let target = self.resolve(path);
        let result = fs::remove_file(&target).await.map_err(|e| FsError::from_io(&target, e));
        match result {
            Ok(()) => {
                info!("🗑️ Deleted {}", target.display());
                Outcome::Deleted(target)
            }
            Err(FsError::NotFound(target)) => {
                warn!("File {} does not exist", target.display());
                Outcome::NotFound(target)
            }
            Err(e) => {
                error!("❌ Delete failed: {}", e);
                Outcome::Failed(e.to_string())
            }
        }
    }

    pub async fn rename(&self, from: &Path, to: &Path) -> Outcome {
        let from = self.resolve(from);
        let to = self.resolve(to);
        let result = fs::rename(&from, &to).await.map_err(|e| FsError::from_io(&from, e));
        match result {
            Ok(()) => {
                info!("🏷️ Renamed {} to {}", from.display(), to.display());
                Outcome::Renamed { from, to }
            }
            Err(e) if e.is_not_found() => {
                // NotFound also covers a missing destination directory
                if matches!(fs::try_exists(&from).await, Ok(false)) {
                    warn!("File {} is gone, it was renamed already", from.display());
                    return Outcome::AlreadyRenamed { from, to };
                }
                let e = FsError::NotFound(to.parent().unwrap_or(&to).to_path_buf());
                error!("❌ Rename of {} failed: {}", from.display(), e);
                Outcome::Failed(e.to_string())
            }
            Err(e) => {
                error!("❌ Rename failed: {}", e);
                Outcome::Failed(e.to_string())
            }
        }
    }

    pub async fn append(&mut self, path: &Path, content: &str) -> Outcome {
        let target = self.resolve(path);
        if self.last_appended.as_deref() == Some(content) {
            debug!("Skipping repeated append to {}", target.display());
            return Outcome::DuplicateAppend(target);
        }

        match append_to_file(&target, content).await {
            Ok(bytes) => {
                self.last_appended = Some(content.to_string());
                info!("✍️ Appended {} bytes to {}", bytes, target.display());
                Outcome::Appended { path: target, bytes }
            }
            Err(e) => {
                error!("❌ Append failed: {}", e);
                Outcome::Failed(e.to_string())
            }
        }
    }
}

/// Creates an empty file unless a readable one is already there.
async fn create_file(target: &Path) -> Result<(), FsError> {
    match fs::File::open(target).await {
        Ok(existing) => {
            drop(existing);
            return Err(FsError::AlreadyExists(target.to_path_buf()));
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(FsError::from_io(target, e)),
    }

    OpenOptions::new()
        .write(true)
        .create(true)
        .open(target)
        .await
        .map_err(|e| FsError::from_io(target, e))?;
    Ok(())
}

async fn append_to_file(target: &Path, content: &str) -> Result<usize, FsError> {
    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(target)
        .await
        .map_err(|e| FsError::from_io(target, e))?;

    file.write_all(content.as_bytes())
        .await
        .map_err(|e| FsError::from_io(target, e))?;
    file.flush().await.map_err(|e| FsError::from_io(target, e))?;
    Ok(content.len())
}
