use ocular_api::event::CONSOLE_INPUT;
use ocular_api::{PluginError, PluginManifest, PluginPriority};

use super::Plugin;
use crate::adapter::ScriptAdapter;
use crate::console::CommandDispatcher;

/// Routes `consoleInput` lines to the [`CommandDispatcher`].
///
/// Loads after regular plugins so `list` sees everything autoloaded.
#[derive(Debug, Default)]
pub struct ConsolePlugin;

impl Plugin for ConsolePlugin {
    fn manifest(&self) -> PluginManifest {
        PluginManifest::new("console", "1.0.0").with_priority(PluginPriority::Later)
    }

    fn on_load(&mut self, adapter: &ScriptAdapter) -> Result<(), PluginError> {
        let console = CommandDispatcher::new(adapter.host());
        adapter.subscribe(CONSOLE_INPUT, move |_: &str, line: &str| {
            console.execute(line);
            Ok(())
        })
    }
}
