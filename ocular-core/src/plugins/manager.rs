use ocular_api::event::{LOAD_PLUGIN, UNLOAD_PLUGIN};
use ocular_api::{PluginError, PluginManifest};

use super::Plugin;
use crate::adapter::ScriptAdapter;

/// Loads and unloads plugins named in `loadPlugin` / `unloadPlugin` events
#[derive(Debug, Default)]
pub struct ManagerPlugin;

impl Plugin for ManagerPlugin {
    fn manifest(&self) -> PluginManifest {
        PluginManifest::new("manager", "1.0.0")
    }

    fn on_load(&mut self, adapter: &ScriptAdapter) -> Result<(), PluginError> {
        let this = adapter.clone();
        adapter.subscribe(LOAD_PLUGIN, move |_: &str, identifier: &str| {
            this.info(&format!("Loading plugin: {identifier}"));
            if !this.load_plugin(identifier) {
                this.error(&format!("Failed to load plugin: {identifier}"));
            }
            Ok(())
        })?;

        let this = adapter.clone();
        adapter.subscribe(UNLOAD_PLUGIN, move |_: &str, identifier: &str| {
            this.info(&format!("Unloading plugin: {identifier}"));
            if !this.unload_plugin(identifier) {
                this.error(&format!("Failed to unload plugin: {identifier}"));
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventDispatcher;
    use ocular_api::mock::RecordingHost;
    use ocular_api::{LogLevel, PluginInstanceId};
    use std::sync::Arc;

    #[test]
    fn test_requests_are_forwarded_and_failures_logged() {
        let host = Arc::new(RecordingHost::new());
        let adapter = ScriptAdapter::new(
            PluginInstanceId::new(1),
            "manager",
            host.clone(),
            Arc::new(EventDispatcher::new()),
        );
        ManagerPlugin.on_load(&adapter).unwrap();
        host.set_unload_result(false);

        host.raise(LOAD_PLUGIN, "echo");
        host.raise(UNLOAD_PLUGIN, "ghost");

        assert_eq!(host.loads(), vec!["echo"]);
        assert_eq!(host.unloads(), vec!["ghost"]);
        assert_eq!(
            host.logs_at(LogLevel::Error),
            vec!["Failed to unload plugin: ghost".to_string()]
        );
        adapter.shutdown();
    }
}
