use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use ocular_core::PluginHostConfig;

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawOcularConfig {
    #[serde(default)]
    pub plugins: RawPluginsConfig,

    #[serde(default)]
    pub runtime: RawRuntimeConfig,

    /// Entries seeded into host storage
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

/// Plugins section as stored in TOML
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawPluginsConfig {
    /// Plugins loaded at startup
    pub autoload: Option<Vec<String>>,
}

/// Runtime section as stored in TOML
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawRuntimeConfig {
    /// Main loop period in milliseconds
    pub tick_ms: Option<u64>,

    /// Raise `tick` every iteration
    pub emit_tick: Option<bool>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OcularConfig {
    #[serde(default)]
    pub plugins: PluginsConfig,

    #[serde(default)]
    pub runtime: RuntimeConfig,

    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PluginsConfig {
    /// Plugins loaded at startup
    pub autoload: Vec<String>,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            autoload: default_autoload(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuntimeConfig {
    /// Main loop period in milliseconds
    pub tick_ms: u64,

    /// Raise `tick` every iteration
    pub emit_tick: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            emit_tick: true,
        }
    }
}

impl RuntimeConfig {
    /// Main loop period
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Host settings for this runtime section
    pub fn host_config(&self) -> PluginHostConfig {
        PluginHostConfig {
            tick_interval: self.tick_interval(),
            emit_tick: self.emit_tick,
        }
    }
}

/// Default main loop period
pub const DEFAULT_TICK_MS: u64 = 16;

/// Plugins loaded when no configuration names any
pub fn default_autoload() -> Vec<String> {
    vec!["console".to_string()]
}
