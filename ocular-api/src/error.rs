//! Error types for plugin authors

use thiserror::Error;

/// Errors that plugins and the adapter surface to plugin code
#[derive(Error, Debug)]
pub enum PluginError {
    /// A caller passed an argument the adapter refuses (e.g. an empty event name)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A handler failed while processing an event
    #[error("Handler failed: {0}")]
    Handler(String),

    /// A host operation reported failure
    #[error("Host operation '{operation}' failed for '{target}'")]
    HostOperation {
        /// Operation name, e.g. `load_plugin`
        operation: &'static str,
        /// What the operation was applied to
        target: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Custom error with message
    #[error("{0}")]
    Custom(String),
}

impl PluginError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a handler error
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }

    /// Create a custom error with a message
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
