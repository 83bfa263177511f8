//! PluginHost - in-process reference host
//!
//! Owns the event bus, storage and timers, loads plugins from a
//! [`PluginCatalog`] and gives each one a [`ScriptAdapter`]. Adapters talk to
//! the host through a [`HostLink`] that holds the host weakly, so nothing a
//! plugin registers keeps the host alive.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

use ocular_api::event::{PLUGIN_LIST, PLUGIN_LOADED, PLUGIN_UNLOADED, REQUEST_PLUGIN_LIST, TICK};
use ocular_api::{
    API_VERSION, EventCallback, HostProxy, LogLevel, PluginInstanceId, PluginManifest,
    TimerCallback, TimerHandle,
};

use super::bus::EventBus;
use super::catalog::PluginCatalog;
use super::error::HostError;
use super::storage::Storage;
use super::timers::TimerManager;
use crate::adapter::ScriptAdapter;
use crate::events::{EventDispatcher, invoke_isolated};
use crate::plugins::Plugin;

/// Configuration for PluginHost
#[derive(Debug, Clone)]
pub struct PluginHostConfig {
    /// Main loop period, also reported as the `tick` payload
    pub tick_interval: Duration,
    /// Raise `tick` on every [`PluginHost::tick`]
    pub emit_tick: bool,
}

impl Default for PluginHostConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(16),
            emit_tick: true,
        }
    }
}

/// Information about a loaded plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    /// Plugin name from its manifest
    pub name: String,
    /// Plugin version
    pub version: String,
    /// Identifier the plugin was loaded with
    pub identifier: String,
    /// When the load finished
    pub loaded_at: DateTime<Utc>,
}

/// A loaded plugin with its runtime state
struct LoadedPlugin {
    identifier: String,
    manifest: PluginManifest,
    plugin: Box<dyn Plugin>,
    adapter: ScriptAdapter,
    loaded_at: DateTime<Utc>,
}

impl LoadedPlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            name: self.manifest.name.clone(),
            version: self.manifest.version.clone(),
            identifier: self.identifier.clone(),
            loaded_at: self.loaded_at,
        }
    }
}

/// The plugin host manages loading, unloading, and event delivery
pub struct PluginHost {
    config: PluginHostConfig,
    catalog: PluginCatalog,
    bus: EventBus,
    storage: Storage,
    timers: TimerManager,
    dispatcher: Arc<EventDispatcher>,
    /// Loaded plugins, in load order
    plugins: Mutex<Vec<LoadedPlugin>>,
    next_instance: AtomicU64,
    /// Handle given to every adapter
    link: Arc<dyn HostProxy>,
}

impl PluginHost {
    /// Create a host that can load the plugins in `catalog`
    pub fn new(config: PluginHostConfig, catalog: PluginCatalog) -> Arc<Self> {
        let host = Arc::new_cyclic(|this: &Weak<Self>| Self {
            config,
            catalog,
            bus: EventBus::new(),
            storage: Storage::new(),
            timers: TimerManager::new(),
            dispatcher: Arc::new(EventDispatcher::new()),
            plugins: Mutex::new(Vec::new()),
            next_instance: AtomicU64::new(1),
            link: Arc::new(HostLink { host: this.clone() }),
        });

        let weak = Arc::downgrade(&host);
        host.bus.register(
            REQUEST_PLUGIN_LIST,
            Arc::new(move |_: &str, _: &str| {
                if let Some(host) = weak.upgrade() {
                    host.answer_plugin_list();
                }
            }),
        );

        tracing::debug!(plugins = host.catalog.len(), "Plugin host created");
        host
    }

    fn plugins(&self) -> MutexGuard<'_, Vec<LoadedPlugin>> {
        self.plugins.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &PluginHostConfig {
        &self.config
    }

    pub fn catalog(&self) -> &PluginCatalog {
        &self.catalog
    }

    /// Dispatcher shared by every adapter of this host
    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }

    /// Load the plugin `identifier` refers to, with its required dependencies.
    ///
    /// On failure nothing loaded by this call stays loaded.
    pub fn load(&self, identifier: &str) -> Result<PluginInfo, HostError> {
        let mut chain = Vec::new();
        let mut loaded = Vec::new();

        match self.load_inner(identifier, &mut chain, &mut loaded) {
            Ok(info) => Ok(info),
            Err(e) => {
                for name in loaded.iter().rev() {
                    if let Err(rollback) = self.unload(name) {
                        tracing::warn!(plugin = %name, error = %rollback, "Rollback unload failed");
                    }
                }
                Err(e)
            }
        }
    }

    fn load_inner(
        &self,
        identifier: &str,
        chain: &mut Vec<String>,
        loaded: &mut Vec<String>,
    ) -> Result<PluginInfo, HostError> {
        let name = self
            .catalog
            .resolve(identifier)
            .ok_or_else(|| HostError::NotFound {
                name: identifier.to_string(),
            })?
            .to_string();

        if chain.contains(&name) {
            chain.push(name);
            return Err(HostError::DependencyCycle {
                chain: chain.join(" -> "),
            });
        }
        if self.is_loaded(&name) {
            return Err(HostError::AlreadyLoaded { name });
        }

        let Some(mut plugin) = self.catalog.instantiate(&name) else {
            return Err(HostError::NotFound { name });
        };
        let manifest = plugin.manifest();
        if manifest.api_version != API_VERSION {
            return Err(HostError::ApiVersionMismatch {
                expected: API_VERSION,
                found: manifest.api_version,
            });
        }

        chain.push(name.clone());
        for dependency in &manifest.dependencies {
            let dep = dependency.name.as_str();
            if !manifest.required_dependencies().any(|required| required == dep) {
                tracing::debug!(plugin = %name, dependency = %dep, "Skipping optional dependency");
                continue;
            }
            let dep_name = self.catalog.resolve(dep).unwrap_or(dep);
            if self.is_loaded(dep_name) {
                continue;
            }
            tracing::debug!(plugin = %name, dependency = %dep, "Loading dependency");
            self.load_inner(dep, chain, loaded)
                .map_err(|source| HostError::DependencyFailed {
                    plugin: name.clone(),
                    dependency: dep.to_string(),
                    source: Box::new(source),
                })?;
        }
        chain.pop();

        let instance = PluginInstanceId::new(self.next_instance.fetch_add(1, Ordering::SeqCst));
        let adapter = ScriptAdapter::new(
            instance,
            name.clone(),
            self.link.clone(),
            self.dispatcher.clone(),
        );

        if let Err(reason) = invoke_isolated(|| plugin.on_load(&adapter)) {
            adapter.shutdown();
            tracing::error!(plugin = %name, error = %reason, "Plugin failed to initialize");
            return Err(HostError::InitFailed { name, reason });
        }

        let entry = LoadedPlugin {
            identifier: identifier.to_string(),
            manifest,
            plugin,
            adapter,
            loaded_at: Utc::now(),
        };
        let info = entry.info();

        {
            let mut plugins = self.plugins();
            if plugins.iter().any(|p| p.manifest.name == name) {
                drop(plugins);
                entry.adapter.shutdown();
                return Err(HostError::AlreadyLoaded { name });
            }
            plugins.push(entry);
        }
        loaded.push(name.clone());

        tracing::info!(plugin = %name, version = %info.version, instance = %instance, "Loaded plugin");
        self.bus.send(PLUGIN_LOADED, &name);
        Ok(info)
    }

    /// Unload a plugin by name or by the identifier it was loaded with
    pub fn unload(&self, identifier: &str) -> Result<PluginInfo, HostError> {
        let resolved = self.catalog.resolve(identifier);
        let mut entry = {
            let mut plugins = self.plugins();
            let position = plugins.iter().position(|p| {
                p.identifier == identifier
                    || p.manifest.name == identifier
                    || Some(p.manifest.name.as_str()) == resolved
            });
            match position {
                Some(index) => plugins.remove(index),
                None => {
                    return Err(HostError::NotLoaded {
                        name: identifier.to_string(),
                    });
                }
            }
        };

        let name = entry.manifest.name.clone();
        if let Err(reason) = invoke_isolated(|| entry.plugin.on_unload()) {
            tracing::warn!(plugin = %name, error = %reason, "Plugin on_unload returned error");
        }
        entry.adapter.shutdown();

        tracing::info!(plugin = %name, "Unloaded plugin");
        self.bus.send(PLUGIN_UNLOADED, &name);
        Ok(entry.info())
    }

    /// Load a batch of plugins, lowest priority first.
    ///
    /// Identifiers of equal priority keep their given order. Failures are
    /// logged and skipped. Returns the plugins that loaded.
    pub fn load_all<S: AsRef<str>>(&self, identifiers: &[S]) -> Vec<PluginInfo> {
        let mut ordered: Vec<(&str, _)> = identifiers
            .iter()
            .map(|id| {
                let id = id.as_ref();
                let priority = self
                    .catalog
                    .manifest(id)
                    .map(|m| m.priority)
                    .unwrap_or_default();
                (id, priority)
            })
            .collect();
        ordered.sort_by_key(|(_, priority)| *priority);

        let mut loaded = Vec::new();
        for (identifier, _) in ordered {
            match self.load(identifier) {
                Ok(info) => loaded.push(info),
                Err(HostError::AlreadyLoaded { name }) => {
                    tracing::debug!(plugin = %name, "Plugin already loaded, skipping");
                }
                Err(e) => {
                    tracing::error!(plugin = %identifier, error = %e, "Failed to load plugin");
                }
            }
        }
        loaded
    }

    /// Unload every plugin, most recently loaded first
    pub fn shutdown(&self) {
        let names: Vec<String> = self
            .plugins()
            .iter()
            .rev()
            .map(|p| p.manifest.name.clone())
            .collect();

        for name in names {
            if let Err(e) = self.unload(&name) {
                tracing::debug!(plugin = %name, error = %e, "Plugin already gone during shutdown");
            }
        }
    }

    /// One main loop iteration: fire due timers, then raise `tick`
    pub fn tick(&self) {
        self.tick_at(Instant::now());
    }

    /// [`tick`](Self::tick) with an explicit clock reading
    pub fn tick_at(&self, now: Instant) {
        self.timers.fire_due(now);
        if self.config.emit_tick {
            let payload = format!("{}ms", self.config.tick_interval.as_millis());
            self.bus.send(TICK, &payload);
        }
    }

    /// Loaded plugins in load order
    pub fn list(&self) -> Vec<PluginInfo> {
        self.plugins().iter().map(LoadedPlugin::info).collect()
    }

    /// Whether a plugin with this manifest name is loaded
    pub fn is_loaded(&self, name: &str) -> bool {
        self.plugins().iter().any(|p| p.manifest.name == name)
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins().len()
    }

    /// Pre-populate storage
    pub fn seed_data<'a, I>(&self, entries: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (key, value) in entries {
            self.storage.set(key, value);
        }
    }

    /// Number of live timers
    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    /// Serialize the loaded plugin list as the `pluginList` payload
    pub fn plugin_list_json(&self) -> Result<String, HostError> {
        Ok(serde_json::to_string(&self.list())?)
    }

    fn answer_plugin_list(&self) {
        let plugins = self.list();
        if plugins.is_empty() {
            tracing::info!("No plugins loaded");
        } else {
            for plugin in &plugins {
                tracing::info!(
                    plugin = %plugin.name,
                    version = %plugin.version,
                    identifier = %plugin.identifier,
                    "Loaded plugin"
                );
            }
        }

        match self.plugin_list_json() {
            Ok(payload) => {
                self.bus.send(PLUGIN_LIST, &payload);
            }
            Err(e) => tracing::error!(error = %e, "Failed to serialize plugin list"),
        }
    }
}

fn emit_log(level: LogLevel, message: &str) {
    match level {
        LogLevel::Info => tracing::info!(target: "ocular::plugin", "{message}"),
        LogLevel::Warn => tracing::warn!(target: "ocular::plugin", "{message}"),
        LogLevel::Error => tracing::error!(target: "ocular::plugin", "{message}"),
    }
}

impl HostProxy for PluginHost {
    fn log(&self, level: LogLevel, message: &str) {
        emit_log(level, message);
    }

    fn subscribe_host(&self, event_name: &str, callback: EventCallback) {
        self.bus.register(event_name, callback);
    }

    fn send_event(&self, event_name: &str, payload: &str) {
        self.bus.send(event_name, payload);
    }

    fn load_plugin(&self, identifier: &str) -> bool {
        match self.load(identifier) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(plugin = %identifier, error = %e, "Plugin load request failed");
                false
            }
        }
    }

    fn unload_plugin(&self, identifier: &str) -> bool {
        match self.unload(identifier) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(plugin = %identifier, error = %e, "Plugin unload request failed");
                false
            }
        }
    }

    fn get_data(&self, key: &str) -> Option<String> {
        self.storage.get(key)
    }

    fn set_data(&self, key: &str, value: &str) -> bool {
        self.storage.set(key, value)
    }

    fn has_data(&self, key: &str) -> bool {
        self.storage.has(key)
    }

    fn delete_data(&self, key: &str) -> bool {
        self.storage.remove(key)
    }

    fn set_timer(&self, ms: u32, callback: TimerCallback, repeat: bool) -> TimerHandle {
        self.timers.add(ms, callback, repeat)
    }

    fn cancel_timer(&self, handle: TimerHandle) -> bool {
        self.timers.cancel(handle)
    }
}

/// [`HostProxy`] handed to adapters. Every call is a no-op once the host is gone.
struct HostLink {
    host: Weak<PluginHost>,
}

impl HostProxy for HostLink {
    fn log(&self, level: LogLevel, message: &str) {
        emit_log(level, message);
    }

    fn subscribe_host(&self, event_name: &str, callback: EventCallback) {
        if let Some(host) = self.host.upgrade() {
            host.subscribe_host(event_name, callback);
        }
    }

    fn send_event(&self, event_name: &str, payload: &str) {
        if let Some(host) = self.host.upgrade() {
            host.send_event(event_name, payload);
        }
    }

    fn load_plugin(&self, identifier: &str) -> bool {
        self.host
            .upgrade()
            .is_some_and(|host| host.load_plugin(identifier))
    }

    fn unload_plugin(&self, identifier: &str) -> bool {
        self.host
            .upgrade()
            .is_some_and(|host| host.unload_plugin(identifier))
    }

    fn get_data(&self, key: &str) -> Option<String> {
        self.host.upgrade().and_then(|host| host.get_data(key))
    }

    fn set_data(&self, key: &str, value: &str) -> bool {
        self.host
            .upgrade()
            .is_some_and(|host| host.set_data(key, value))
    }

    fn has_data(&self, key: &str) -> bool {
        self.host.upgrade().is_some_and(|host| host.has_data(key))
    }

    fn delete_data(&self, key: &str) -> bool {
        self.host.upgrade().is_some_and(|host| host.delete_data(key))
    }

    fn set_timer(&self, ms: u32, callback: TimerCallback, repeat: bool) -> TimerHandle {
        match self.host.upgrade() {
            Some(host) => host.set_timer(ms, callback, repeat),
            None => TimerHandle::new(0),
        }
    }

    fn cancel_timer(&self, handle: TimerHandle) -> bool {
        self.host
            .upgrade()
            .is_some_and(|host| host.cancel_timer(handle))
    }
}
