//! EventBus - host-side listeners keyed by event name

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use ocular_api::EventCallback;

use crate::events::invoke_isolated;

/// Ordered listener lists per event name.
///
/// [`send`](Self::send) snapshots the listeners and calls them with no lock
/// held, so a listener may register listeners or send further events.
pub struct EventBus {
    listeners: RwLock<HashMap<String, Vec<EventCallback>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
        }
    }

    /// Append a listener for `event_name`
    pub fn register(&self, event_name: &str, callback: EventCallback) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(event_name.to_string())
            .or_default()
            .push(callback);
    }

    /// Invoke every listener of `event_name`. Returns how many ran.
    ///
    /// A panicking listener is logged and skipped.
    pub fn send(&self, event_name: &str, payload: &str) -> usize {
        let snapshot: Vec<EventCallback> = match self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event_name)
        {
            Some(listeners) => listeners.clone(),
            None => return 0,
        };

        for listener in &snapshot {
            let result = invoke_isolated(|| {
                listener(event_name, payload);
                Ok(())
            });
            if let Err(detail) = result {
                tracing::error!(event = %event_name, %detail, "Event listener panicked");
            }
        }
        snapshot.len()
    }

    /// Number of listeners for `event_name`
    pub fn listener_count(&self, event_name: &str) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event_name)
            .map_or(0, Vec::len)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
