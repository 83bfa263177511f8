//! HostProxy - the adapter's view of the host process

use crate::types::{EventCallback, LogLevel, TimerCallback, TimerHandle};

/// Capabilities the host exposes to plugin adapters.
///
/// The adapter never assumes anything beyond what each method documents.
/// Failures are reported through return values; implementations must not
/// panic across this boundary.
pub trait HostProxy: Send + Sync {
    /// Write a line to the host's log sink. Fire-and-forget.
    fn log(&self, level: LogLevel, message: &str);

    /// Ask the host to invoke `callback(event_name, payload)` whenever it
    /// raises `event_name`.
    fn subscribe_host(&self, event_name: &str, callback: EventCallback);

    /// Raise an event on the host.
    fn send_event(&self, event_name: &str, payload: &str);

    /// Load the plugin named by `identifier`. `false` is a normal outcome.
    fn load_plugin(&self, identifier: &str) -> bool;

    /// Unload the plugin named by `identifier`. `false` is a normal outcome.
    fn unload_plugin(&self, identifier: &str) -> bool;

    /// Read a value from the host's key-value store
    fn get_data(&self, key: &str) -> Option<String>;

    /// Write a value to the host's key-value store
    fn set_data(&self, key: &str, value: &str) -> bool;

    /// Check whether a key exists
    fn has_data(&self, key: &str) -> bool;

    /// Remove a key; `false` if it was not present
    fn delete_data(&self, key: &str) -> bool;

    /// Schedule `callback` after `ms` milliseconds, repeating if `repeat`.
    fn set_timer(&self, ms: u32, callback: TimerCallback, repeat: bool) -> TimerHandle;

    /// Cancel a timer; `false` if the handle is unknown or already finished.
    fn cancel_timer(&self, handle: TimerHandle) -> bool;
}
