use ocular_api::event::CONFIG_LOADED;
use ocular_api::{PluginError, PluginManifest};

use super::Plugin;
use crate::adapter::ScriptAdapter;

/// Storage key read for the announced message
pub const MESSAGE_KEY: &str = "config.message";

const DEFAULT_MESSAGE: &str = "default";

/// Announces `Config message: <message>` via `configLoaded` when loaded.
///
/// The message comes from host storage under [`MESSAGE_KEY`].
#[derive(Debug, Default)]
pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn manifest(&self) -> PluginManifest {
        PluginManifest::new("config", "1.0.0")
    }

    fn on_load(&mut self, adapter: &ScriptAdapter) -> Result<(), PluginError> {
        let message = adapter
            .get_data(MESSAGE_KEY)
            .unwrap_or_else(|| DEFAULT_MESSAGE.to_string());
        adapter.send(CONFIG_LOADED, &format!("Config message: {message}"));
        Ok(())
    }
}
