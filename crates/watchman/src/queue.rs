use crate::{CHANGE_EVENT, ChangeError, Outcome, WatchState, Watchman, types::WatchEvent};
use cmdwatch_emitter::EmitError;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

impl Watchman {
    /// Signal a change of the command file through the emitter
    pub fn notify_change(&self, event: WatchEvent) -> Result<(), EmitError> {
        self.emitter.emit(CHANGE_EVENT, &event)?;
        Ok(())
    }

    /// Single worker draining the change queue in FIFO order.
    ///
    /// Each change is processed to completion before the next one is taken.
    /// Changes already queued when `shutdown` fires are still processed.
    pub async fn process_queue(&self, shutdown: CancellationToken) {
        let Some(mut rx) = self.queue_rx.lock().await.take() else {
            warn!("👀 Watchman: change queue already has a worker");
            return;
        };

        loop {
            let event = tokio::select! {
                biased;
                Some(event) = rx.recv() => event,
                _ = shutdown.cancelled() => break,
            };

            self.state.send_replace(WatchState::Processing);
            let outcome = match self.process_event(&event).await {
                Ok(outcome) => outcome,
                Err(e @ ChangeError::Decode { .. }) => {
                    warn!("⚠️ Watchman: {}", e);
                    Outcome::Rejected(e.to_string())
                }
                Err(e) => {
                    error!("Watchman Error processing {:?}: {}", event.file_path, e);
                    Outcome::Failed(e.to_string())
                }
            };
            // Nobody listening is fine
            let _ = self.outcomes.send(outcome);
            self.state.send_replace(WatchState::Idle);
        }

        *self.queue_rx.lock().await = Some(rx);
        self.state.send_replace(WatchState::Terminated);
        info!("👀 Watchman: change queue stopped");
    }
}
