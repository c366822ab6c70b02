//! Named-event publish/subscribe registry
//!
//! Delivery is synchronous, in subscription order, on the caller's thread.
//! `emit` works on a snapshot of the listener sequence taken before the first
//! call, so listeners subscribed while an emit is running are only seen by
//! later emits. The registry lock is released before any listener runs, which
//! lets listeners subscribe, unsubscribe or emit themselves.
//!
//! A listener returning `Err` stops the dispatch: the listeners after it are
//! not invoked and the error is handed back to the caller of `emit`. Panics
//! unwind through `emit` untouched. There is no isolation between listeners.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Opaque listener handle. Identity is the allocation, compared with `Arc::ptr_eq`.
pub type Listener<A> = Arc<dyn Fn(&A) -> anyhow::Result<()> + Send + Sync>;

/// Wraps a closure into a [`Listener`] handle.
pub fn listener<A, F>(f: F) -> Listener<A>
where
    F: Fn(&A) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("listener #{index} for '{event}' failed: {source}")]
    Listener {
        event: String,
        index: usize,
        #[source]
        source: anyhow::Error,
    },
}

/// Event dispatcher with an owned registry.
///
/// Names present in the registry always map to a non-empty sequence.
pub struct EventEmitter<A> {
    // Vec keeps first-subscription order of the names
    events: Mutex<Vec<(String, Vec<Listener<A>>)>>,
}

impl<A> EventEmitter<A> {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// Appends `listener` to the sequence of `event`.
    pub fn on(&self, event: &str, listener: Listener<A>) -> &Self {
        let mut events = self.events.lock();
        match events.iter_mut().find(|(name, _)| name == event) {
            Some((_, listeners)) => listeners.push(listener),
            None => events.push((event.to_string(), vec![listener])),
        }
        self
    }

    /// Invokes every listener of `event` with `args`, in subscription order.
    pub fn emit(&self, event: &str, args: &A) -> Result<&Self, EmitError> {
        let snapshot = self.listeners(event);
        if snapshot.is_empty() {
            debug!("No listeners for '{}'", event);
            return Ok(self);
        }

        for (index, listener) in snapshot.iter().enumerate() {
            listener(args).map_err(|source| EmitError::Listener {
                event: event.to_string(),
                index,
                source,
            })?;
        }

        Ok(self)
    }

    /// Removes the first listener of `event` that is the same handle as `listener`.
    pub fn off(&self, event: &str, listener: &Listener<A>) -> &Self {
        let mut events = self.events.lock();
        if let Some(slot) = events.iter().position(|(name, _)| name == event) {
            let listeners = &mut events[slot].1;
            if let Some(pos) = listeners.iter().position(|l| Arc::ptr_eq(l, listener)) {
                listeners.remove(pos);
            }
            if listeners.is_empty() {
                events.remove(slot);
            }
        }
        self
    }

    /// Drops the whole sequence of `event`.
    pub fn remove_all_listeners(&self, event: &str) -> &Self {
        self.events.lock().retain(|(name, _)| name != event);
        self
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.events
            .lock()
            .iter()
            .find(|(name, _)| name == event)
            .map_or(0, |(_, listeners)| listeners.len())
    }

    /// Registered names in order of first subscription. A name that was
    /// removed and subscribed again moves to the end.
    pub fn event_names(&self) -> Vec<String> {
        self.events.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    /// Current listeners of `event`, cloned out of the registry.
    pub fn listeners(&self, event: &str) -> Vec<Listener<A>> {
        self.events
            .lock()
            .iter()
            .find(|(name, _)| name == event)
            .map(|(_, listeners)| listeners.clone())
            .unwrap_or_default()
    }
}

impl<A> Default for EventEmitter<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for EventEmitter<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let events = self.events.lock();
        f.debug_map()
            .entries(events.iter().map(|(name, listeners)| (name, listeners.len())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    fn recorder(log: &Arc<StdMutex<Vec<&'static str>>>, tag: &'static str) -> Listener<()> {
        let log = log.clone();
        listener(move |_| {
            log.lock().unwrap().push(tag);
            Ok(())
        })
    }

    #[test]
    fn listeners_run_in_subscription_order() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let emitter = EventEmitter::new();
        emitter
            .on("event", recorder(&log, "listener 1"))
            .on("event", recorder(&log, "listener 2"))
            .on("event", recorder(&log, "listener 3"));

        emitter.emit("event", &()).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["listener 1", "listener 2", "listener 3"]);
    }

    #[test]
    fn args_reach_every_listener() {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let emitter: EventEmitter<(u32, String)> = EventEmitter::new();
        for _ in 0..2 {
            let seen = seen.clone();
            emitter.on(
                "data",
                listener(move |(n, s): &(u32, String)| {
                    seen.lock().unwrap().push(format!("{n}:{s}"));
                    Ok(())
                }),
            );
        }

        emitter.emit("data", &(7, "x".to_string())).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["7:x", "7:x"]);
    }

    #[test]
    fn emit_without_listeners_is_a_no_op() {
        let emitter: EventEmitter<()> = EventEmitter::new();
        assert!(emitter.emit("nothing", &()).is_ok());
        assert!(emitter.event_names().is_empty());
    }

    #[test]
    fn listener_count_tracks_subscriptions() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let emitter = EventEmitter::new();
        let a = recorder(&log, "a");
        let b = recorder(&log, "b");

        assert_eq!(emitter.listener_count("e"), 0);
        emitter.on("e", a.clone()).on("e", b.clone());
        assert_eq!(emitter.listener_count("e"), 2);
        emitter.off("e", &a);
        assert_eq!(emitter.listener_count("e"), 1);
        emitter.off("e", &b);
        assert_eq!(emitter.listener_count("e"), 0);
        assert!(emitter.event_names().is_empty());
    }

    #[test]
    fn off_removes_one_match_per_call() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let emitter = EventEmitter::new();
        let a = recorder(&log, "a");
        emitter.on("e", a.clone()).on("e", a.clone());

        emitter.off("e", &a);
        assert_eq!(emitter.listener_count("e"), 1);
        emitter.off("e", &a);
        assert_eq!(emitter.listener_count("e"), 0);
        assert!(!emitter.event_names().contains(&"e".to_string()));
    }

    #[test]
    fn off_matches_identity_not_behaviour() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let emitter = EventEmitter::new();
        let a = recorder(&log, "same");
        let twin = recorder(&log, "same");
        emitter.on("e", a.clone());

        emitter.off("e", &twin);
        assert_eq!(emitter.listener_count("e"), 1);
        emitter.off("other", &a);
        assert_eq!(emitter.listener_count("e"), 1);
    }

    #[test]
    fn remove_all_listeners_drops_the_name() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let emitter = EventEmitter::new();
        emitter
            .on("a", recorder(&log, "1"))
            .on("a", recorder(&log, "2"))
            .on("b", recorder(&log, "3"));

        emitter.remove_all_listeners("a").remove_all_listeners("missing");
        assert_eq!(emitter.listener_count("a"), 0);
        assert_eq!(emitter.event_names(), vec!["b".to_string()]);
    }

    #[test]
    fn event_names_follow_first_subscription() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let emitter = EventEmitter::new();
        emitter
            .on("first", recorder(&log, "1"))
            .on("second", recorder(&log, "2"))
            .on("first", recorder(&log, "3"));
        assert_eq!(emitter.event_names(), vec!["first", "second"]);

        emitter.remove_all_listeners("first").on("first", recorder(&log, "4"));
        assert_eq!(emitter.event_names(), vec!["second", "first"]);
    }

    #[test]
    fn failing_listener_aborts_the_rest() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let emitter = EventEmitter::new();
        emitter
            .on("e", recorder(&log, "before"))
            .on("e", listener(|_| anyhow::bail!("boom")))
            .on("e", recorder(&log, "after"));

        let err = emitter.emit("e", &()).unwrap_err();
        let EmitError::Listener { event, index, .. } = &err;
        assert_eq!(event, "e");
        assert_eq!(*index, 1);
        assert!(err.to_string().contains("boom"));
        assert_eq!(*log.lock().unwrap(), vec!["before"]);
    }

    #[test]
    #[should_panic(expected = "listener panic")]
    fn panicking_listener_unwinds_through_emit() {
        let emitter: EventEmitter<()> = EventEmitter::new();
        emitter.on("e", listener(|_| panic!("listener panic")));
        let _ = emitter.emit("e", &());
    }

    #[test]
    fn listener_added_during_emit_waits_for_next_emit() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let emitter: Arc<EventEmitter<()>> = Arc::new(EventEmitter::new());

        let late = recorder(&log, "late");
        let weak = Arc::downgrade(&emitter);
        let log_first = log.clone();
        emitter.on(
            "e",
            listener(move |_| {
                log_first.lock().unwrap().push("first");
                if let Some(emitter) = weak.upgrade() {
                    emitter.on("e", late.clone());
                }
                Ok(())
            }),
        );

        emitter.emit("e", &()).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["first"]);
        assert_eq!(emitter.listener_count("e"), 2);

        log.lock().unwrap().clear();
        emitter.emit("e", &()).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["first", "late"]);
    }
}
