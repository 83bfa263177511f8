//! Plugin types and metadata structures

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Callback the host invokes when it raises an event: `(event_name, payload)`
pub type EventCallback = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// Callback the host invokes when a timer fires
pub type TimerCallback = Arc<dyn Fn(TimerHandle) + Send + Sync>;

/// Severity passed through to the host's logging sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Informational message
    Info,
    /// Recoverable problem
    Warn,
    /// Failure that was contained
    Error,
}

impl LogLevel {
    /// Wire name of the level (`INFO`, `WARN`, `ERROR`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INFO" => Ok(Self::Info),
            "WARN" => Ok(Self::Warn),
            "ERROR" => Ok(Self::Error),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

/// Identity of one loaded plugin instance, issued by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PluginInstanceId(u64);

impl PluginInstanceId {
    /// Wrap a raw instance number
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw instance number
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PluginInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque timer identifier owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Wrap a raw timer id
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw timer id
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Load ordering hint used when autoloading a batch of plugins
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PluginPriority {
    /// Loaded before everything else
    First,
    /// Regular plugins
    #[default]
    Default,
    /// Loaded after regular plugins (e.g. the console)
    Later,
}

/// Whether a dependency must be present for the plugin to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    /// Loaded before the dependent plugin; failure aborts the load
    Required,
    /// Informational only
    Optional,
}

/// A plugin this plugin depends on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Identifier of the dependency
    pub name: String,
    /// Required or optional
    pub kind: DependencyKind,
}

impl Dependency {
    /// A dependency that must load first
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DependencyKind::Required,
        }
    }

    /// A dependency that is not loaded automatically
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DependencyKind::Optional,
        }
    }
}

/// Plugin manifest containing metadata about the plugin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Plugin name (used for identification)
    pub name: String,
    /// Plugin version (semver)
    pub version: String,
    /// API version this plugin was built against
    pub api_version: u32,
    /// Autoload ordering
    #[serde(default)]
    pub priority: PluginPriority,
    /// Plugins that must (or may) be loaded alongside this one
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl PluginManifest {
    /// Manifest with the given name and version and default everything else
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// Builder: set the priority
    #[must_use]
    pub fn with_priority(mut self, priority: PluginPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Builder: add a dependency
    #[must_use]
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Names of the dependencies that must load first
    pub fn required_dependencies(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .iter()
            .filter(|d| d.kind == DependencyKind::Required)
            .map(|d| d.name.as_str())
    }
}

impl Default for PluginManifest {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: "0.0.1".to_string(),
            api_version: crate::API_VERSION,
            priority: PluginPriority::default(),
            dependencies: Vec::new(),
        }
    }
}
