//! Plugin host error types

use thiserror::Error;

/// Errors that can occur while loading or unloading plugins
#[derive(Error, Debug)]
pub enum HostError {
    /// No catalog entry matches the identifier
    #[error("Plugin '{name}' not found")]
    NotFound { name: String },

    /// The plugin already has a live instance
    #[error("Plugin '{name}' is already loaded")]
    AlreadyLoaded { name: String },

    /// Unload requested for a plugin that is not loaded
    #[error("Plugin '{name}' is not loaded")]
    NotLoaded { name: String },

    /// API version mismatch between host and plugin
    #[error("API version mismatch: host expects {expected}, plugin has {found}")]
    ApiVersionMismatch { expected: u32, found: u32 },

    /// Required dependencies form a cycle
    #[error("Dependency cycle: {chain}")]
    DependencyCycle { chain: String },

    /// A required dependency could not be loaded
    #[error("Plugin '{plugin}' requires '{dependency}': {source}")]
    DependencyFailed {
        plugin: String,
        dependency: String,
        #[source]
        source: Box<HostError>,
    },

    /// `on_load` returned an error or panicked
    #[error("Plugin '{name}' failed to initialize: {reason}")]
    InitFailed { name: String, reason: String },

    /// Serializing host state failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
