//! PluginCatalog - the plugins a host knows how to construct
//!
//! Identifiers are resolved by exact name first, then by file stem, so
//! `echo`, `echo.dll` and `plugins/echo.so` all name the same entry.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use ocular_api::PluginManifest;

use crate::plugins::{
    ConfigPlugin, ConsolePlugin, EchoPlugin, HeartbeatPlugin, LoggerPlugin, ManagerPlugin, Plugin,
};

/// Constructs a fresh plugin instance
pub type PluginFactory = Arc<dyn Fn() -> Box<dyn Plugin> + Send + Sync>;

/// Name-keyed plugin factories
#[derive(Clone, Default)]
pub struct PluginCatalog {
    entries: BTreeMap<String, PluginFactory>,
}

impl PluginCatalog {
    /// An empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding every built-in plugin
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        catalog
            .register("config", || Box::new(ConfigPlugin))
            .register("console", || Box::new(ConsolePlugin))
            .register("echo", || Box::new(EchoPlugin))
            .register("heartbeat", || Box::new(HeartbeatPlugin::default()))
            .register("logger", || Box::new(LoggerPlugin))
            .register("manager", || Box::new(ManagerPlugin));
        catalog
    }

    /// Add or replace the factory for `name`
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Plugin> + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), Arc::new(factory));
        self
    }

    /// Catalog name an identifier refers to, if any
    pub fn resolve(&self, identifier: &str) -> Option<&str> {
        if let Some((name, _)) = self.entries.get_key_value(identifier) {
            return Some(name.as_str());
        }
        let stem = Path::new(identifier).file_stem()?.to_str()?;
        self.entries.get_key_value(stem).map(|(name, _)| name.as_str())
    }

    /// Build a new instance of the plugin `identifier` refers to
    pub fn instantiate(&self, identifier: &str) -> Option<Box<dyn Plugin>> {
        let name = self.resolve(identifier)?;
        self.entries.get(name).map(|factory| factory())
    }

    /// Manifest of the plugin `identifier` refers to
    pub fn manifest(&self, identifier: &str) -> Option<PluginManifest> {
        self.instantiate(identifier).map(|plugin| plugin.manifest())
    }

    /// Every manifest in the catalog, sorted by name
    pub fn manifests(&self) -> Vec<PluginManifest> {
        self.entries.values().map(|factory| factory().manifest()).collect()
    }

    /// Catalog names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocular_api::PluginPriority;

    #[test]
    fn test_builtins_are_registered() {
        let catalog = PluginCatalog::with_builtins();
        assert_eq!(
            catalog.names(),
            vec!["config", "console", "echo", "heartbeat", "logger", "manager"]
        );
    }

    #[test]
    fn test_resolve_by_name_and_file_stem() {
        let catalog = PluginCatalog::with_builtins();
        assert_eq!(catalog.resolve("echo"), Some("echo"));
        assert_eq!(catalog.resolve("echo.dll"), Some("echo"));
        assert_eq!(catalog.resolve("plugins/echo.so"), Some("echo"));
        assert_eq!(catalog.resolve("Echo.dll"), None);
        assert_eq!(catalog.resolve("missing.dll"), None);
        assert_eq!(catalog.resolve(""), None);
    }

    #[test]
    fn test_manifest_lookup() {
        let catalog = PluginCatalog::with_builtins();
        let manifest = catalog.manifest("console.dll").unwrap();
        assert_eq!(manifest.name, "console");
        assert_eq!(manifest.priority, PluginPriority::Later);
        assert_eq!(catalog.manifests().len(), catalog.len());
    }
}
