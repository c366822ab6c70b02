use crate::{ChangeError, Command, Outcome, Watchman, types::WatchEvent};
use cmdwatch_core::errors::FsError;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

impl Watchman {
    /// Process a single change - read the command file and run its command
    pub async fn process_event(&self, event: &WatchEvent) -> Result<Outcome, ChangeError> {
        let buffer = read_command_file(&event.file_path).await?;
        let text = std::str::from_utf8(&buffer).map_err(|source| ChangeError::Decode {
            path: event.file_path.clone(),
            source,
        })?;

        info!("📜 Command file content: {:?}", text);

        let command = match Command::parse(text) {
            Ok(command) => command,
            Err(e) => {
                warn!("⚠️ Rejected command: {}", e);
                return Ok(Outcome::Rejected(e.to_string()));
            }
        };

        let outcome = self.ops.lock().await.apply(&command).await;
        Ok(outcome)
    }
}

/// Reads the whole file into a buffer sized from its metadata.
/// A file that shrank between stat and read yields the bytes actually read.
async fn read_command_file(path: &Path) -> Result<Vec<u8>, FsError> {
    let mut file = File::open(path).await.map_err(|e| FsError::from_io(path, e))?;
    let size = file
        .metadata()
        .await
        .map_err(|e| FsError::from_io(path, e))?
        .len() as usize;

    let mut buffer = vec![0u8; size];
    let mut filled = 0;
    while filled < buffer.len() {
        let n = file
            .read(&mut buffer[filled..])
            .await
            .map_err(|e| FsError::from_io(path, e))?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    buffer.truncate(filled);

    Ok(buffer)
}
