//! Command-file Watchman
//!
//! Watches one file and turns each change of its content into a file operation.
//!
//! This module is organized into:
//! - types: Core data structures (WatchEvent, WatchState, Outcome)
//! - command: The command grammar
//! - ops: File operations behind the commands
//! - ignore: Filtering of raw filesystem notifications
//! - queue: Change queue and its single worker
//! - processing: Reading and handling one change
//! - watcher: Filesystem watching

mod types;
pub mod command;
pub mod ops;
mod ignore;
mod queue;
mod processing;
mod watcher;

// Re-export public types
pub use command::{Command, ParseError};
pub use ops::FileOps;
pub use types::{ChangeError, ChangeKind, Outcome, WatchEvent, WatchState};

use cmdwatch_core::config::AppConfig;
use cmdwatch_emitter::{EventEmitter, listener};
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tracing::info;

/// Event name used on the Watchman's emitter for every command file change.
pub const CHANGE_EVENT: &str = "change";

const OUTCOME_CAPACITY: usize = 64;

/// Watchman - command file observer that dispatches file operations
pub struct Watchman {
    pub command_file: PathBuf,
    pub process_existing: bool,
    emitter: EventEmitter<WatchEvent>,
    queue_rx: Mutex<Option<mpsc::UnboundedReceiver<WatchEvent>>>,
    ops: Mutex<FileOps>,
    state: watch::Sender<WatchState>,
    outcomes: broadcast::Sender<Outcome>,
}

impl Watchman {
    pub fn new(config: &AppConfig) -> Self {
        let mut watchman = Self::with_paths(config.command_path(), config.base_path());
        watchman.process_existing = config.process_existing;
        watchman
    }

    pub fn with_paths(command_file: impl Into<PathBuf>, base_dir: impl Into<PathBuf>) -> Self {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(WatchState::Idle);
        let (outcomes, _) = broadcast::channel(OUTCOME_CAPACITY);

        let emitter = EventEmitter::new();
        emitter.on(
            CHANGE_EVENT,
            listener(move |event: &WatchEvent| {
                queue_tx
                    .send(event.clone())
                    .map_err(|_| anyhow::anyhow!("change queue is closed"))
            }),
        );

        let watchman = Self {
            command_file: command_file.into(),
            process_existing: false,
            emitter,
            queue_rx: Mutex::new(Some(queue_rx)),
            ops: Mutex::new(FileOps::new(base_dir)),
            state,
            outcomes,
        };

        info!("👀 Watchman initialized for {:?}", watchman.command_file);
        watchman
    }

    /// The dispatcher carrying change notifications. Extra listeners may be attached.
    pub fn emitter(&self) -> &EventEmitter<WatchEvent> {
        &self.emitter
    }

    pub fn state(&self) -> WatchState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<WatchState> {
        self.state.subscribe()
    }

    /// Every handled change publishes its outcome here.
    pub fn subscribe_outcomes(&self) -> broadcast::Receiver<Outcome> {
        self.outcomes.subscribe()
    }

    fn watch_dir(&self) -> &Path {
        match self.command_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}
