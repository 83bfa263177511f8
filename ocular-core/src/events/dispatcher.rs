//! EventDispatcher - routes host events to plugin handlers
//!
//! Registrations are kept per event name in registration order. Dispatch
//! snapshots the handler list and invokes it with no lock held, so a handler
//! may subscribe, unsubscribe or raise further events without deadlocking.
//! Every invocation goes through [`invoke_isolated`]: an `Err` or a panic
//! becomes a [`HandlerFault`] and delivery continues with the next handler.

use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use ocular_api::{HostProxy, PluginError, PluginInstanceId};

/// A subscribed event handler: `(event_name, payload)`
pub type Handler = Arc<dyn Fn(&str, &str) -> Result<(), PluginError> + Send + Sync>;

struct Registration {
    owner: PluginInstanceId,
    handler: Handler,
}

/// A handler failure caught at the dispatch boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFault {
    /// Event being delivered when the handler failed
    pub event: String,
    /// Plugin instance that owns the failing handler
    pub owner: PluginInstanceId,
    /// Error message or panic payload
    pub detail: String,
}

impl fmt::Display for HandlerFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Exception in event '{}': {}", self.event, self.detail)
    }
}

/// Outcome of one [`EventDispatcher::dispatch`] call
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Number of handlers invoked
    pub delivered: usize,
    /// Handlers that failed, in invocation order
    pub faults: Vec<HandlerFault>,
}

impl DispatchReport {
    /// True if every invoked handler succeeded
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }
}

/// Registration table shared by every adapter of one host
pub struct EventDispatcher {
    table: RwLock<HashMap<String, Vec<Registration>>>,
    /// Hosts already forwarding each event name via `subscribe_host`
    bridged: Mutex<HashMap<String, Vec<Weak<dyn HostProxy>>>>,
}

impl EventDispatcher {
    /// Create an empty dispatcher
    pub fn new() -> Self {
        Self {
            table: RwLock::new(HashMap::new()),
            bridged: Mutex::new(HashMap::new()),
        }
    }

    /// Register `handler` for `event_name` on behalf of `owner`.
    ///
    /// Registering the same name twice from one instance keeps both
    /// handlers; each fires independently.
    pub fn subscribe(
        &self,
        owner: PluginInstanceId,
        event_name: &str,
        handler: Handler,
    ) -> Result<(), PluginError> {
        if event_name.is_empty() {
            return Err(PluginError::invalid_argument(
                "event name must not be empty",
            ));
        }

        self.table
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(event_name.to_string())
            .or_default()
            .push(Registration { owner, handler });

        tracing::debug!(event = %event_name, plugin = %owner, "Handler registered");
        Ok(())
    }

    /// Deliver an event to every handler registered under `event_name`.
    ///
    /// Handlers run in registration order. Unknown event names are a no-op.
    pub fn dispatch(&self, event_name: &str, payload: &str) -> DispatchReport {
        let snapshot: Vec<(PluginInstanceId, Handler)> = {
            let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
            match table.get(event_name) {
                Some(registrations) => registrations
                    .iter()
                    .map(|r| (r.owner, r.handler.clone()))
                    .collect(),
                None => return DispatchReport::default(),
            }
        };

        let mut report = DispatchReport::default();
        for (owner, handler) in snapshot {
            report.delivered += 1;
            if let Err(detail) = invoke_isolated(|| handler(event_name, payload)) {
                report.faults.push(HandlerFault {
                    event: event_name.to_string(),
                    owner,
                    detail,
                });
            }
        }
        report
    }

    /// Remove every registration owned by `owner`. Returns how many were removed.
    pub fn unsubscribe_all(&self, owner: PluginInstanceId) -> usize {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let mut removed = 0;

        table.retain(|_, registrations| {
            let before = registrations.len();
            registrations.retain(|r| r.owner != owner);
            removed += before - registrations.len();
            !registrations.is_empty()
        });

        if removed > 0 {
            tracing::debug!(plugin = %owner, removed, "Handlers unregistered");
        }
        removed
    }

    /// Number of handlers registered for `event_name`
    pub fn handler_count(&self, event_name: &str) -> usize {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event_name)
            .map_or(0, Vec::len)
    }

    /// Number of handlers owned by `owner` across all events
    pub fn registrations_of(&self, owner: PluginInstanceId) -> usize {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .flatten()
            .filter(|r| r.owner == owner)
            .count()
    }

    /// Event names with at least one handler, sorted
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Returns `true` exactly once per event name and host: the first
    /// caller is responsible for subscribing the dispatcher on that host.
    pub(crate) fn claim_bridge(&self, event_name: &str, host: &Arc<dyn HostProxy>) -> bool {
        let target = Arc::as_ptr(host).cast::<()>();
        let mut bridged = self.bridged.lock().unwrap_or_else(PoisonError::into_inner);
        let hosts = bridged.entry(event_name.to_string()).or_default();
        if hosts.iter().any(|h| h.as_ptr().cast::<()>() == target) {
            return false;
        }
        hosts.push(Arc::downgrade(host));
        true
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one handler invocation, converting an error or a panic into a
/// description of the failure.
pub fn invoke_isolated<F>(f: F) -> Result<(), String>
where
    F: FnOnce() -> Result<(), PluginError>,
{
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(panic) => Err(panic_message(panic.as_ref())),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic: handler panicked".to_string()
    }
}
