//! ScriptAdapter - the per-plugin handle onto the host
//!
//! One adapter exists per loaded plugin instance. It wraps the shared
//! [`HostProxy`] and [`EventDispatcher`] and scopes everything the plugin
//! does to its [`PluginInstanceId`]: handler registrations, timers, and the
//! cleanup performed by [`ScriptAdapter::shutdown`].
//!
//! The first subscription to an event name through a given host installs a
//! bridge callback on that host. The bridge dispatches to every plugin handler and logs each
//! fault at ERROR through the host. It holds the dispatcher weakly, so the
//! host may own it without keeping the dispatcher alive.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use ocular_api::event::TIMER;
use ocular_api::{
    EventCallback, HostProxy, LogLevel, PluginError, PluginInstanceId, TimerCallback,
    TimerHandle,
};

use crate::events::{EventDispatcher, HandlerFault, invoke_isolated};

struct AdapterInner {
    instance: PluginInstanceId,
    name: String,
    host: Arc<dyn HostProxy>,
    dispatcher: Arc<EventDispatcher>,
    timers: Mutex<BTreeSet<TimerHandle>>,
}

impl AdapterInner {
    fn timers(&self) -> MutexGuard<'_, BTreeSet<TimerHandle>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn report_fault(&self, fault: &HandlerFault) {
        tracing::debug!(plugin = %self.name, event = %fault.event, detail = %fault.detail, "Timer handler failed");
        self.host.log(LogLevel::Error, &fault.to_string());
    }
}

/// Per-plugin-instance adapter
#[derive(Clone)]
pub struct ScriptAdapter {
    inner: Arc<AdapterInner>,
}

impl ScriptAdapter {
    /// Create the adapter for one plugin instance
    pub fn new(
        instance: PluginInstanceId,
        name: impl Into<String>,
        host: Arc<dyn HostProxy>,
        dispatcher: Arc<EventDispatcher>,
    ) -> Self {
        Self {
            inner: Arc::new(AdapterInner {
                instance,
                name: name.into(),
                host,
                dispatcher,
                timers: Mutex::new(BTreeSet::new()),
            }),
        }
    }

    /// Instance this adapter acts for
    pub fn instance(&self) -> PluginInstanceId {
        self.inner.instance
    }

    /// Name of the plugin this adapter acts for
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Shared host handle
    pub fn host(&self) -> Arc<dyn HostProxy> {
        self.inner.host.clone()
    }

    /// Register `handler` for `event_name`.
    ///
    /// Fails with [`PluginError::InvalidArgument`] if `event_name` is empty.
    pub fn subscribe<F>(&self, event_name: &str, handler: F) -> Result<(), PluginError>
    where
        F: Fn(&str, &str) -> Result<(), PluginError> + Send + Sync + 'static,
    {
        self.inner
            .dispatcher
            .subscribe(self.inner.instance, event_name, Arc::new(handler))?;

        if self.inner.dispatcher.claim_bridge(event_name, &self.inner.host) {
            let bridge = bridge(Arc::downgrade(&self.inner.dispatcher), self.inner.host.clone());
            self.inner.host.subscribe_host(event_name, bridge);
        }
        Ok(())
    }

    /// Remove every handler this instance registered. Returns how many were removed.
    pub fn unsubscribe_all(&self) -> usize {
        self.inner.dispatcher.unsubscribe_all(self.inner.instance)
    }

    /// Log through the host
    pub fn log(&self, level: LogLevel, message: &str) {
        self.inner.host.log(level, message);
    }

    /// Log at INFO
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Log at WARN
    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    /// Log at ERROR
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    /// Raise an event on the host
    pub fn send(&self, event_name: &str, payload: &str) {
        self.inner.host.send_event(event_name, payload);
    }

    /// Ask the host to load another plugin
    pub fn load_plugin(&self, identifier: &str) -> bool {
        self.inner.host.load_plugin(identifier)
    }

    /// Ask the host to unload a plugin
    pub fn unload_plugin(&self, identifier: &str) -> bool {
        self.inner.host.unload_plugin(identifier)
    }

    pub fn get_data(&self, key: &str) -> Option<String> {
        self.inner.host.get_data(key)
    }

    pub fn set_data(&self, key: &str, value: &str) -> bool {
        self.inner.host.set_data(key, value)
    }

    pub fn has_data(&self, key: &str) -> bool {
        self.inner.host.has_data(key)
    }

    pub fn delete_data(&self, key: &str) -> bool {
        self.inner.host.delete_data(key)
    }

    /// Schedule `handler` on the host after `ms` milliseconds.
    ///
    /// The handler runs under the same isolation as event handlers; a
    /// failure is logged at ERROR as an exception in event `timer`. Timers
    /// still pending when the adapter shuts down are cancelled.
    pub fn set_timer<F>(&self, ms: u32, repeat: bool, handler: F) -> TimerHandle
    where
        F: Fn(TimerHandle) -> Result<(), PluginError> + Send + Sync + 'static,
    {
        let weak = Arc::downgrade(&self.inner);
        let callback: TimerCallback = Arc::new(move |handle: TimerHandle| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if !repeat {
                inner.timers().remove(&handle);
            }
            if let Err(detail) = invoke_isolated(|| handler(handle)) {
                inner.report_fault(&HandlerFault {
                    event: TIMER.to_string(),
                    owner: inner.instance,
                    detail,
                });
            }
        });

        let handle = self.inner.host.set_timer(ms, callback, repeat);
        self.inner.timers().insert(handle);
        tracing::debug!(plugin = %self.inner.name, timer = %handle, ms, repeat, "Timer scheduled");
        handle
    }

    /// Cancel a timer scheduled through this adapter
    pub fn cancel_timer(&self, handle: TimerHandle) -> bool {
        self.inner.timers().remove(&handle);
        self.inner.host.cancel_timer(handle)
    }

    /// Timers scheduled through this adapter that have not finished
    pub fn active_timers(&self) -> Vec<TimerHandle> {
        self.inner.timers().iter().copied().collect()
    }

    /// Drop every handler and cancel every pending timer of this instance.
    ///
    /// Safe to call more than once.
    pub fn shutdown(&self) {
        let removed = self.unsubscribe_all();
        let timers: Vec<TimerHandle> = std::mem::take(&mut *self.inner.timers())
            .into_iter()
            .collect();
        for handle in &timers {
            self.inner.host.cancel_timer(*handle);
        }
        tracing::debug!(
            plugin = %self.inner.name,
            instance = %self.inner.instance,
            handlers = removed,
            timers = timers.len(),
            "Adapter shut down"
        );
    }
}

impl std::fmt::Debug for ScriptAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptAdapter")
            .field("instance", &self.inner.instance)
            .field("name", &self.inner.name)
            .finish_non_exhaustive()
    }
}

fn bridge(dispatcher: Weak<EventDispatcher>, host: Arc<dyn HostProxy>) -> EventCallback {
    Arc::new(move |event_name: &str, payload: &str| {
        let Some(dispatcher) = dispatcher.upgrade() else {
            return;
        };
        let report = dispatcher.dispatch(event_name, payload);
        for fault in &report.faults {
            tracing::debug!(event = %fault.event, plugin = %fault.owner, detail = %fault.detail, "Handler failed");
            host.log(LogLevel::Error, &fault.to_string());
        }
    })
}
