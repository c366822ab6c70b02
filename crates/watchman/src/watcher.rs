use crate::{ChangeKind, Watchman, types::WatchEvent};
use anyhow::Context;
use notify::{Event, RecursiveMode, Watcher};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Raw notifications buffered between the notify thread and the forwarding loop
const NOTIFY_CAPACITY: usize = 100;

impl Watchman {
    /// Start watching the command file until `shutdown` fires or the notification source ends
    pub async fn start(self: Arc<Self>, shutdown: CancellationToken) -> anyhow::Result<()> {
        let watch_dir = self.watch_dir().to_path_buf();
        info!("👀 Watchman: Starting observation of {:?}", self.command_file);

        if !self.command_file.exists() {
            warn!("👀 Watchman: {:?} does not exist yet, waiting for it", self.command_file);
        }

        let (tx, mut rx) = tokio::sync::mpsc::channel(NOTIFY_CAPACITY);

        // notify delivers from its own thread
        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    let _ = tx.blocking_send(event);
                }
                Err(e) => error!("👀 Watchman notification error: {}", e),
            }
        })
        .context("Failed to create watcher")?;

        // Editors that save atomically replace the file, so watch its directory
        watcher
            .watch(&watch_dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch directory {:?}", watch_dir))?;

        let worker = tokio::spawn({
            let watchman = self.clone();
            let shutdown = shutdown.clone();
            async move { watchman.process_queue(shutdown).await }
        });

        if self.process_existing && self.command_file.exists() {
            let event = WatchEvent {
                kind: ChangeKind::Startup,
                file_path: self.command_file.clone(),
            };
            if let Err(e) = self.notify_change(event) {
                error!("👀 Watchman: startup change was not queued: {}", e);
            }
        }

        info!("👀 Watchman: Ready and watching.");

        loop {
            let event = tokio::select! {
                _ = shutdown.cancelled() => break,
                event = rx.recv() => match event {
                    Some(event) => event,
                    None => {
                        warn!("👀 Watchman: notification source closed");
                        break;
                    }
                },
            };

            let Some(kind) = Self::change_kind(&event.kind) else {
                continue;
            };

            // One notification per event, even if several paths point at the file
            if let Some(path) = event.paths.into_iter().find(|p| !self.should_ignore(p)) {
                info!("👀 File changed! ({:?})", kind);
                if let Err(e) = self.notify_change(WatchEvent { kind, file_path: path }) {
                    error!("👀 Watchman: change was not queued: {}", e);
                }
            }
        }

        drop(watcher);
        shutdown.cancel();
        worker.await.context("change queue worker panicked")?;

        Ok(())
    }
}
