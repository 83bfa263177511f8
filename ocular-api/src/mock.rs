//! Recording host for testing adapters and plugins
//!
//! RecordingHost implements [`HostProxy`] entirely in memory and records
//! every call so tests can assert on logs, plugin requests and raised
//! events. Events sent through it are delivered to its own subscribers,
//! and timers only fire when a test calls [`RecordingHost::fire_timer`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::host::HostProxy;
use crate::types::{EventCallback, LogLevel, TimerCallback, TimerHandle};

struct ScheduledTimer {
    callback: TimerCallback,
    repeat: bool,
}

/// In-memory [`HostProxy`] that records every interaction
pub struct RecordingHost {
    logs: Mutex<Vec<(LogLevel, String)>>,
    subscriptions: Mutex<Vec<(String, EventCallback)>>,
    sent: Mutex<Vec<(String, String)>>,
    loads: Mutex<Vec<String>>,
    unloads: Mutex<Vec<String>>,
    data: Mutex<HashMap<String, String>>,
    timers: Mutex<HashMap<u64, ScheduledTimer>>,
    next_timer: AtomicU64,
    load_result: AtomicBool,
    unload_result: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RecordingHost {
    /// Create a host whose load/unload requests succeed
    pub fn new() -> Self {
        Self {
            logs: Mutex::new(Vec::new()),
            subscriptions: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            loads: Mutex::new(Vec::new()),
            unloads: Mutex::new(Vec::new()),
            data: Mutex::new(HashMap::new()),
            timers: Mutex::new(HashMap::new()),
            next_timer: AtomicU64::new(1),
            load_result: AtomicBool::new(true),
            unload_result: AtomicBool::new(true),
        }
    }

    /// Set what `load_plugin` returns from now on
    pub fn set_load_result(&self, ok: bool) {
        self.load_result.store(ok, Ordering::SeqCst);
    }

    /// Set what `unload_plugin` returns from now on
    pub fn set_unload_result(&self, ok: bool) {
        self.unload_result.store(ok, Ordering::SeqCst);
    }

    /// Raise an event as the host would, invoking every subscribed callback
    pub fn raise(&self, event_name: &str, payload: &str) {
        let callbacks: Vec<EventCallback> = lock(&self.subscriptions)
            .iter()
            .filter(|(name, _)| name == event_name)
            .map(|(_, cb)| cb.clone())
            .collect();

        for callback in callbacks {
            callback(event_name, payload);
        }
    }

    /// Fire a scheduled timer once. Returns `false` if it is not scheduled.
    pub fn fire_timer(&self, handle: TimerHandle) -> bool {
        let callback = {
            let mut timers = lock(&self.timers);
            let Some(timer) = timers.get(&handle.get()) else {
                return false;
            };
            let callback = timer.callback.clone();
            if !timer.repeat {
                timers.remove(&handle.get());
            }
            callback
        };

        callback(handle);
        true
    }

    /// All log lines so far
    pub fn logs(&self) -> Vec<(LogLevel, String)> {
        lock(&self.logs).clone()
    }

    /// Messages logged at `level`
    pub fn logs_at(&self, level: LogLevel) -> Vec<String> {
        lock(&self.logs)
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Forget recorded log lines
    pub fn clear_logs(&self) {
        lock(&self.logs).clear();
    }

    /// Events raised through `send_event`
    pub fn sent_events(&self) -> Vec<(String, String)> {
        lock(&self.sent).clone()
    }

    /// Identifiers passed to `load_plugin`
    pub fn loads(&self) -> Vec<String> {
        lock(&self.loads).clone()
    }

    /// Identifiers passed to `unload_plugin`
    pub fn unloads(&self) -> Vec<String> {
        lock(&self.unloads).clone()
    }

    /// Event names passed to `subscribe_host`, in call order
    pub fn subscribed_events(&self) -> Vec<String> {
        lock(&self.subscriptions)
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Handles of timers that are still scheduled
    pub fn active_timers(&self) -> Vec<TimerHandle> {
        let mut handles: Vec<_> = lock(&self.timers)
            .keys()
            .copied()
            .map(TimerHandle::new)
            .collect();
        handles.sort();
        handles
    }
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostProxy for RecordingHost {
    fn log(&self, level: LogLevel, message: &str) {
        lock(&self.logs).push((level, message.to_string()));
    }

    fn subscribe_host(&self, event_name: &str, callback: EventCallback) {
        lock(&self.subscriptions).push((event_name.to_string(), callback));
    }

    fn send_event(&self, event_name: &str, payload: &str) {
        lock(&self.sent).push((event_name.to_string(), payload.to_string()));
        self.raise(event_name, payload);
    }

    fn load_plugin(&self, identifier: &str) -> bool {
        lock(&self.loads).push(identifier.to_string());
        self.load_result.load(Ordering::SeqCst)
    }

    fn unload_plugin(&self, identifier: &str) -> bool {
        lock(&self.unloads).push(identifier.to_string());
        self.unload_result.load(Ordering::SeqCst)
    }

    fn get_data(&self, key: &str) -> Option<String> {
        lock(&self.data).get(key).cloned()
    }

    fn set_data(&self, key: &str, value: &str) -> bool {
        lock(&self.data).insert(key.to_string(), value.to_string());
        true
    }

    fn has_data(&self, key: &str) -> bool {
        lock(&self.data).contains_key(key)
    }

    fn delete_data(&self, key: &str) -> bool {
        lock(&self.data).remove(key).is_some()
    }

    fn set_timer(&self, _ms: u32, callback: TimerCallback, repeat: bool) -> TimerHandle {
        let id = self.next_timer.fetch_add(1, Ordering::SeqCst);
        lock(&self.timers).insert(id, ScheduledTimer { callback, repeat });
        TimerHandle::new(id)
    }

    fn cancel_timer(&self, handle: TimerHandle) -> bool {
        lock(&self.timers).remove(&handle.get()).is_some()
    }
}
