//! End-to-end tests for the reference PluginHost
//!
//! Plugins are loaded from a catalog, driven through host events exactly as
//! the CLI drives them, and observed through host-side listeners.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use ocular_api::event::{
    CHAT_MESSAGE, CHAT_REPLY, CONFIG_LOADED, CONSOLE_INPUT, HEARTBEAT, LOAD_PLUGIN, PLUGIN_LIST,
    PLUGIN_UNLOADED, TICK,
};
use ocular_api::{Dependency, HostProxy, PluginError, PluginManifest};
use ocular_core::plugins::Plugin;
use ocular_core::{HostError, PluginCatalog, PluginHost, PluginHostConfig, ScriptAdapter};

type Captured = Arc<Mutex<Vec<String>>>;

fn capture(host: &PluginHost, event_name: &str) -> Captured {
    let seen: Captured = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    host.subscribe_host(
        event_name,
        Arc::new(move |_: &str, payload: &str| {
            sink.lock().unwrap().push(payload.to_string());
        }),
    );
    seen
}

fn builtin_host() -> Arc<PluginHost> {
    PluginHost::new(PluginHostConfig::default(), PluginCatalog::with_builtins())
}

/// Subscribes, then refuses to finish loading
struct Broken;

impl Plugin for Broken {
    fn manifest(&self) -> PluginManifest {
        PluginManifest::new("broken", "0.1.0")
    }

    fn on_load(&mut self, adapter: &ScriptAdapter) -> Result<(), PluginError> {
        adapter.subscribe(CHAT_MESSAGE, |_: &str, _: &str| Ok(()))?;
        adapter.set_timer(10, true, |_| Ok(()));
        Err(PluginError::custom("missing resource"))
    }
}

/// Panics on every chat message
struct Grumpy;

impl Plugin for Grumpy {
    fn manifest(&self) -> PluginManifest {
        PluginManifest::new("grumpy", "0.1.0")
    }

    fn on_load(&mut self, adapter: &ScriptAdapter) -> Result<(), PluginError> {
        adapter.subscribe(CHAT_MESSAGE, |_: &str, _: &str| -> Result<(), PluginError> {
            panic!("not talking today")
        })
    }
}

/// Requires whatever name it is given
struct Needs(&'static str, &'static str);

impl Plugin for Needs {
    fn manifest(&self) -> PluginManifest {
        PluginManifest::new(self.0, "0.1.0").with_dependency(Dependency::required(self.1))
    }

    fn on_load(&mut self, _adapter: &ScriptAdapter) -> Result<(), PluginError> {
        Ok(())
    }
}

#[test]
fn console_loads_plugins_and_answers_list() {
    let host = builtin_host();
    let lists = capture(&host, PLUGIN_LIST);
    host.load("console.dll").unwrap();

    host.send_event(CONSOLE_INPUT, "load echo.dll");
    host.send_event(CONSOLE_INPUT, "list");

    assert!(host.is_loaded("echo"));
    let lists = lists.lock().unwrap();
    assert_eq!(lists.len(), 1);
    let json: serde_json::Value = serde_json::from_str(&lists[0]).unwrap();
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["console", "echo"]);
}

#[test]
fn echo_replies_until_unloaded() {
    let host = builtin_host();
    let replies = capture(&host, CHAT_REPLY);
    host.load("echo").unwrap();

    host.send_event(CHAT_MESSAGE, "hi");
    host.unload("echo").unwrap();
    host.send_event(CHAT_MESSAGE, "anyone?");

    assert_eq!(*replies.lock().unwrap(), vec!["Echo: hi"]);
    assert_eq!(host.dispatcher().handler_count(CHAT_MESSAGE), 0);
}

#[test]
fn heartbeat_fires_on_tick_and_stops_on_unload() {
    let host = builtin_host();
    let beats = capture(&host, HEARTBEAT);
    let start = Instant::now();
    host.load("heartbeat").unwrap();
    assert_eq!(host.pending_timers(), 1);

    host.tick_at(start + Duration::from_millis(500));
    host.tick_at(start + Duration::from_secs(2));

    assert_eq!(*beats.lock().unwrap(), vec!["1s"]);
    assert_eq!(host.get_data("heartbeat.count").as_deref(), Some("1"));

    host.unload("heartbeat").unwrap();
    assert_eq!(host.pending_timers(), 0);
    host.tick_at(start + Duration::from_secs(10));
    assert_eq!(beats.lock().unwrap().len(), 1);
}

#[test]
fn tick_reports_interval() {
    let host = PluginHost::new(
        PluginHostConfig {
            tick_interval: Duration::from_millis(25),
            emit_tick: true,
        },
        PluginCatalog::new(),
    );
    let ticks = capture(&host, TICK);

    host.tick();

    assert_eq!(*ticks.lock().unwrap(), vec!["25ms"]);
}

#[test]
fn load_all_orders_by_priority() {
    let host = builtin_host();

    let loaded = host.load_all(&["console", "missing.dll", "logger", "echo"]);

    let names: Vec<String> = loaded.into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["logger", "echo", "console"]);
}

#[test]
fn failed_init_rolls_back_registrations_and_timers() {
    let mut catalog = PluginCatalog::with_builtins();
    catalog.register("broken", || Box::new(Broken));
    let host = PluginHost::new(PluginHostConfig::default(), catalog);

    let err = host.load("broken").unwrap_err();

    assert!(matches!(err, HostError::InitFailed { .. }));
    assert!(err.to_string().contains("missing resource"));
    assert!(!host.is_loaded("broken"));
    assert_eq!(host.dispatcher().handler_count(CHAT_MESSAGE), 0);
    assert_eq!(host.pending_timers(), 0);
}

#[test]
fn panicking_plugin_does_not_stop_echo() {
    let mut catalog = PluginCatalog::with_builtins();
    catalog.register("grumpy", || Box::new(Grumpy));
    let host = PluginHost::new(PluginHostConfig::default(), catalog);
    let replies = capture(&host, CHAT_REPLY);

    host.load_all(&["grumpy", "echo"]);
    host.send_event(CHAT_MESSAGE, "hello");

    assert_eq!(*replies.lock().unwrap(), vec!["Echo: hello"]);
    assert!(host.is_loaded("grumpy"));
}

#[test]
fn dependency_cycle_loads_nothing() {
    let mut catalog = PluginCatalog::new();
    catalog
        .register("a", || Box::new(Needs("a", "b")))
        .register("b", || Box::new(Needs("b", "a")));
    let host = PluginHost::new(PluginHostConfig::default(), catalog);

    let err = host.load("a").unwrap_err();

    assert!(err.to_string().contains("Dependency cycle: a -> b -> a"));
    assert_eq!(host.plugin_count(), 0);
}

#[test]
fn missing_dependency_rolls_back_loaded_ones() {
    let mut catalog = PluginCatalog::with_builtins();
    catalog
        .register("top", || Box::new(Needs("top", "middle")))
        .register("middle", || Box::new(Needs("middle", "nowhere")));
    let host = PluginHost::new(PluginHostConfig::default(), catalog);

    let err = host.load("top").unwrap_err();

    assert!(matches!(err, HostError::DependencyFailed { .. }));
    assert_eq!(host.plugin_count(), 0);
}

#[test]
fn manager_loads_on_request_event() {
    let host = builtin_host();
    host.load("manager").unwrap();

    host.send_event(LOAD_PLUGIN, "logger.dll");
    host.send_event(LOAD_PLUGIN, "ghost.dll");

    assert!(host.is_loaded("logger"));
    assert_eq!(host.plugin_count(), 2);
}

#[test]
fn config_plugin_reads_seeded_message() {
    let host = builtin_host();
    let announced = capture(&host, CONFIG_LOADED);
    host.seed_data([("config.message", "from toml")]);

    host.load("config").unwrap();

    assert_eq!(*announced.lock().unwrap(), vec!["Config message: from toml"]);
}

#[test]
fn shutdown_unloads_in_reverse_order() {
    let host = builtin_host();
    let unloaded = capture(&host, PLUGIN_UNLOADED);
    host.load_all(&["echo", "logger", "console"]);

    host.shutdown();

    assert_eq!(*unloaded.lock().unwrap(), vec!["console", "logger", "echo"]);
    assert_eq!(host.plugin_count(), 0);
}

#[test]
fn plugin_can_unload_itself_from_a_handler() {
    let host = builtin_host();
    host.load_all(&["console", "echo"]);

    host.send_event(CONSOLE_INPUT, "unload console");
    host.send_event(CONSOLE_INPUT, "unload echo");

    assert!(!host.is_loaded("console"));
    assert!(host.is_loaded("echo"));
}
