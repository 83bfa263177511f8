//! ocular-core: event dispatch and console control for ocular plugins
//!
//! This crate provides the adapter that sits between a host process and its
//! plugins:
//!
//! - **Event dispatch** - [`EventDispatcher`] routes host-raised events to
//!   plugin handlers and contains their failures
//! - **Script adapter** - [`ScriptAdapter`] is the per-plugin handle that
//!   scopes subscriptions and timers to one plugin instance
//! - **Console** - [`CommandDispatcher`] runs `help`, `load`, `unload` and
//!   `list` typed by an operator
//! - **Reference host** - [`PluginHost`] with an event bus, storage, timers
//!   and a catalog of built-in [`plugins`]
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use ocular_api::{LogLevel, PluginInstanceId, mock::RecordingHost};
//! use ocular_core::{EventDispatcher, ScriptAdapter};
//!
//! let host = Arc::new(RecordingHost::new());
//! let adapter = ScriptAdapter::new(
//!     PluginInstanceId::new(1),
//!     "greeter",
//!     host.clone(),
//!     Arc::new(EventDispatcher::new()),
//! );
//!
//! let greeter = adapter.clone();
//! adapter
//!     .subscribe("chatMessage", move |_event, payload| {
//!         greeter.info(&format!("hello, {payload}"));
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! host.raise("chatMessage", "operator");
//! assert_eq!(host.logs_at(LogLevel::Info), vec!["hello, operator".to_string()]);
//! adapter.shutdown();
//! ```
//!
//! # Architecture
//!
//! ```text
//! host raises event ──► bridge callback ──► EventDispatcher
//!                                              │ snapshot, invoke_isolated
//!                          ┌───────────────────┼───────────────────┐
//!                          ▼                   ▼                   ▼
//!                    plugin handler     console handler      plugin handler
//!                                              │
//!                                       CommandDispatcher ──► HostProxy
//! ```

pub mod adapter;
pub mod console;
pub mod events;
pub mod host;
pub mod plugins;

// Re-export key types for convenience
pub use adapter::ScriptAdapter;
pub use console::{CommandDispatcher, CommandError, ConsoleCommand};
pub use events::{DispatchReport, EventDispatcher, HandlerFault};
pub use host::{HostError, PluginCatalog, PluginHost, PluginHostConfig, PluginInfo};
pub use plugins::Plugin;
