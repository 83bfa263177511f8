//! ocular-api - Host proxy contract for ocular plugin adapters
//!
//! This crate defines the boundary between a host process and the
//! per-plugin scripting adapter: the [`HostProxy`] trait the adapter calls,
//! the identifiers and metadata types that cross that boundary, and the
//! error type plugin code sees.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use ocular_api::{HostProxy, LogLevel, mock::RecordingHost};
//!
//! let host = Arc::new(RecordingHost::new());
//! host.log(LogLevel::Info, "plugin ready");
//! assert_eq!(host.logs_at(LogLevel::Info), vec!["plugin ready".to_string()]);
//! ```

pub mod error;
pub mod event;
pub mod host;
pub mod mock;
pub mod types;

pub use error::PluginError;
pub use host::HostProxy;
pub use types::*;

/// Current plugin API version.
pub const API_VERSION: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_version_is_set() {
        assert_eq!(API_VERSION, 1);
    }

    #[test]
    fn test_host_proxy_is_object_safe() {
        // This compiles only if HostProxy is object-safe
        fn _takes_shared_host(_: std::sync::Arc<dyn HostProxy>) {}
    }

    #[test]
    fn test_manifest_default_has_correct_api_version() {
        let manifest = PluginManifest::default();
        assert_eq!(manifest.api_version, API_VERSION);
    }
}
