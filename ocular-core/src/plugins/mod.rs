//! Plugin trait and the built-in plugins
//!
//! A plugin is a unit the host can load by name. On load it receives its own
//! [`ScriptAdapter`] and uses it to subscribe to events, schedule timers and
//! talk back to the host. Everything registered through the adapter is torn
//! down by the host when the plugin is unloaded.
//!
//! Built-ins:
//!
//! - [`ConsolePlugin`]: runs `consoleInput` lines through the command dispatcher
//! - [`EchoPlugin`]: answers `chatMessage` with `chatReply`
//! - [`LoggerPlugin`]: logs a fixed set of events
//! - [`HeartbeatPlugin`]: raises `heartbeat` once a second
//! - [`ManagerPlugin`]: loads and unloads plugins on request events
//! - [`ConfigPlugin`]: announces the configured message via `configLoaded`

mod config;
mod console;
mod echo;
mod heartbeat;
mod logger;
mod manager;

pub use config::ConfigPlugin;
pub use console::ConsolePlugin;
pub use echo::EchoPlugin;
pub use heartbeat::HeartbeatPlugin;
pub use logger::LoggerPlugin;
pub use manager::ManagerPlugin;

use ocular_api::{PluginError, PluginManifest};

use crate::adapter::ScriptAdapter;

/// A loadable plugin unit
pub trait Plugin: Send {
    /// Static metadata: name, version, priority, dependencies
    fn manifest(&self) -> PluginManifest;

    /// Called once after the host creates the plugin's adapter.
    ///
    /// Returning an error aborts the load; anything registered so far is
    /// rolled back.
    fn on_load(&mut self, adapter: &ScriptAdapter) -> Result<(), PluginError>;

    /// Called before the plugin's handlers and timers are removed
    fn on_unload(&mut self) -> Result<(), PluginError> {
        Ok(())
    }
}
