//! Well-known event names shared by the host and the built-in plugins.

/// Host → adapter: one line typed at the operator console
pub const CONSOLE_INPUT: &str = "consoleInput";

/// Adapter → host: ask for the list of loaded plugins
pub const REQUEST_PLUGIN_LIST: &str = "requestPluginList";

/// Host → adapter: JSON array answering [`REQUEST_PLUGIN_LIST`]
pub const PLUGIN_LIST: &str = "pluginList";

/// Host → adapter: a plugin finished loading (payload = plugin name)
pub const PLUGIN_LOADED: &str = "pluginLoaded";

/// Host → adapter: a plugin was unloaded (payload = plugin name)
pub const PLUGIN_UNLOADED: &str = "pluginUnloaded";

/// Host → adapter: one iteration of the host main loop
pub const TICK: &str = "tick";

/// Name under which timer callbacks are reported
pub const TIMER: &str = "timer";

/// Request to load a plugin (payload = identifier)
pub const LOAD_PLUGIN: &str = "loadPlugin";

/// Request to unload a plugin (payload = identifier)
pub const UNLOAD_PLUGIN: &str = "unloadPlugin";

/// Periodic liveness signal
pub const HEARTBEAT: &str = "heartbeat";

/// Chat line sent to plugins
pub const CHAT_MESSAGE: &str = "chatMessage";

/// Reply to a [`CHAT_MESSAGE`]
pub const CHAT_REPLY: &str = "chatReply";

/// Raw key press
pub const ON_KEY: &str = "onKey";

/// Raised by the config plugin with the configured message
pub const CONFIG_LOADED: &str = "configLoaded";
