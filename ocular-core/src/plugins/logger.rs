use ocular_api::event::{CHAT_MESSAGE, CONFIG_LOADED, HEARTBEAT, ON_KEY, PLUGIN_LOADED};
use ocular_api::{PluginError, PluginManifest};

use super::Plugin;
use crate::adapter::ScriptAdapter;

/// Events the logger records
pub const LOGGED_EVENTS: [&str; 5] = [
    ON_KEY,
    HEARTBEAT,
    CHAT_MESSAGE,
    PLUGIN_LOADED,
    CONFIG_LOADED,
];

/// Logs `event=<name> payload=<payload>` for each event in [`LOGGED_EVENTS`]
#[derive(Debug, Default)]
pub struct LoggerPlugin;

impl Plugin for LoggerPlugin {
    fn manifest(&self) -> PluginManifest {
        PluginManifest::new("logger", "1.0.0")
    }

    fn on_load(&mut self, adapter: &ScriptAdapter) -> Result<(), PluginError> {
        for event_name in LOGGED_EVENTS {
            let this = adapter.clone();
            adapter.subscribe(event_name, move |event: &str, payload: &str| {
                this.info(&format!("event={event} payload={payload}"));
                Ok(())
            })?;
        }
        Ok(())
    }
}
