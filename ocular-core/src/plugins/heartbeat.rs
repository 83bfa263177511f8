use ocular_api::event::HEARTBEAT;
use ocular_api::{PluginError, PluginManifest, TimerHandle};

use super::Plugin;
use crate::adapter::ScriptAdapter;

/// Storage key holding the number of beats sent so far
pub const COUNT_KEY: &str = "heartbeat.count";

const DEFAULT_INTERVAL_MS: u32 = 1000;

/// Raises `heartbeat` with payload `1s` on a repeating timer and keeps a
/// running count in host storage.
#[derive(Debug)]
pub struct HeartbeatPlugin {
    interval_ms: u32,
    timer: Option<TimerHandle>,
}

impl HeartbeatPlugin {
    /// Beat every `interval_ms` instead of once a second
    pub fn with_interval(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            timer: None,
        }
    }

    /// Timer driving the beat, while loaded
    pub fn timer(&self) -> Option<TimerHandle> {
        self.timer
    }
}

impl Default for HeartbeatPlugin {
    fn default() -> Self {
        Self::with_interval(DEFAULT_INTERVAL_MS)
    }
}

impl Plugin for HeartbeatPlugin {
    fn manifest(&self) -> PluginManifest {
        PluginManifest::new("heartbeat", "1.0.0")
    }

    fn on_load(&mut self, adapter: &ScriptAdapter) -> Result<(), PluginError> {
        let this = adapter.clone();
        let handle = adapter.set_timer(self.interval_ms, true, move |_: TimerHandle| {
            let count = match this.get_data(COUNT_KEY) {
                Some(raw) => raw.parse::<u64>().map_err(|e| {
                    PluginError::handler(format!("corrupt {COUNT_KEY} value '{raw}': {e}"))
                })?,
                None => 0,
            };
            this.set_data(COUNT_KEY, &(count + 1).to_string());
            this.send(HEARTBEAT, "1s");
            Ok(())
        });
        self.timer = Some(handle);
        Ok(())
    }

    fn on_unload(&mut self) -> Result<(), PluginError> {
        self.timer = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventDispatcher;
    use ocular_api::mock::RecordingHost;
    use ocular_api::{HostProxy, LogLevel, PluginInstanceId};
    use std::sync::Arc;

    fn load(host: &Arc<RecordingHost>) -> (ScriptAdapter, HeartbeatPlugin) {
        let adapter = ScriptAdapter::new(
            PluginInstanceId::new(1),
            "heartbeat",
            host.clone(),
            Arc::new(EventDispatcher::new()),
        );
        let mut plugin = HeartbeatPlugin::default();
        plugin.on_load(&adapter).unwrap();
        (adapter, plugin)
    }

    #[test]
    fn test_each_beat_sends_event_and_counts() {
        let host = Arc::new(RecordingHost::new());
        let (_adapter, plugin) = load(&host);
        let timer = plugin.timer().unwrap();

        host.fire_timer(timer);
        host.fire_timer(timer);

        assert_eq!(host.get_data(COUNT_KEY).as_deref(), Some("2"));
        assert_eq!(
            host.sent_events(),
            vec![
                (HEARTBEAT.to_string(), "1s".to_string()),
                (HEARTBEAT.to_string(), "1s".to_string()),
            ]
        );
    }

    #[test]
    fn test_corrupt_count_is_reported_not_fatal() {
        let host = Arc::new(RecordingHost::new());
        let (_adapter, plugin) = load(&host);
        host.set_data(COUNT_KEY, "many");

        assert!(host.fire_timer(plugin.timer().unwrap()));

        let errors = host.logs_at(LogLevel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Exception in event 'timer': Handler failed: corrupt"));
        assert!(host.sent_events().is_empty());
    }

    #[test]
    fn test_shutdown_stops_the_beat() {
        let host = Arc::new(RecordingHost::new());
        let (adapter, mut plugin) = load(&host);
        let timer = plugin.timer().unwrap();

        plugin.on_unload().unwrap();
        adapter.shutdown();

        assert!(!host.fire_timer(timer));
        assert!(plugin.timer().is_none());
    }
}
