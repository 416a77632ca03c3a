//! Progress notifications
//!
//! `TranslateEvents` is a small publish/subscribe list owned by the manager
//! for its whole lifetime. Messages are plain strings and are delivered
//! synchronously to every listener subscribed at the moment of firing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

type Listener = Arc<dyn Fn(&str) + Send + Sync>;
type ListenerList = Mutex<Vec<(u64, Listener)>>;

#[derive(Default)]
pub struct TranslateEvents {
    listeners: Arc<ListenerList>,
    next_id: AtomicU64,
}

impl TranslateEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`; keep the returned handle to unsubscribe later
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(listener)));
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Deliver `message` to all current listeners, in subscription order
    pub fn fire(&self, message: &str) {
        // Snapshot so a listener may unsubscribe while being called
        let snapshot: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in snapshot {
            listener(message);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl std::fmt::Debug for TranslateEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslateEvents")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Handle returned by [`TranslateEvents::subscribe`]
///
/// Dropping the handle keeps the listener registered.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    listeners: Weak<ListenerList>,
}

impl Subscription {
    /// Remove the listener. No-op if the event source is already gone.
    pub fn unsubscribe(self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .retain(|(id, _)| *id != self.id);
        }
    }
}
