//! Reference in-process host
//!
//! - [`PluginHost`]: loads plugins from a [`PluginCatalog`], implements
//!   [`HostProxy`](ocular_api::HostProxy), answers `requestPluginList`
//! - [`EventBus`], [`Storage`], [`TimerManager`]: the host services behind
//!   the proxy
//! - [`HostError`]: load and unload failures
//!
//! # Example
//!
//! ```
//! use ocular_core::host::{PluginCatalog, PluginHost, PluginHostConfig};
//!
//! let host = PluginHost::new(PluginHostConfig::default(), PluginCatalog::with_builtins());
//! host.load_all(&["console", "echo.dll"]);
//! assert_eq!(host.plugin_count(), 2);
//!
//! host.tick();
//! host.shutdown();
//! assert_eq!(host.plugin_count(), 0);
//! ```

mod bus;
mod catalog;
mod error;
mod runtime;
mod storage;
mod timers;

pub use bus::EventBus;
pub use catalog::{PluginCatalog, PluginFactory};
pub use error::HostError;
pub use runtime::{PluginHost, PluginHostConfig, PluginInfo};
pub use storage::Storage;
pub use timers::TimerManager;
