use super::types::{
    DEFAULT_TICK_MS, OcularConfig, PluginsConfig, RawOcularConfig, RawPluginsConfig,
    RawRuntimeConfig, RuntimeConfig, default_autoload,
};
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

/// File name of the project configuration
pub const PROJECT_CONFIG_FILE: &str = "ocular.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user, then project, then `explicit`)
    ///
    /// Missing user and project files are skipped; a missing explicit file
    /// is an error.
    pub fn load(explicit: Option<&Path>) -> Result<OcularConfig> {
        let mut raw = RawOcularConfig::default();

        // Layer 1: User config
        let user_path = Self::user_config_path();
        if user_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(&user_path)?);
        }

        // Layer 2: Project config
        let project_path = Self::project_config_path();
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(&project_path)?);
        }

        // Layer 3: --config
        if let Some(path) = explicit {
            raw = Self::merge_raw(raw, Self::read_raw(path)?);
        }

        Self::finalize(raw)
    }

    /// Get user config path
    pub fn user_config_path() -> PathBuf {
        ocular_paths::user_config_file()
    }

    /// Get project config path
    /// Can be overridden with OCULAR_PROJECT_CONFIG_DIR env var (useful for isolated tests)
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("OCULAR_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join(PROJECT_CONFIG_FILE)
        } else {
            PathBuf::from(PROJECT_CONFIG_FILE)
        }
    }

    fn read_raw(path: &Path) -> Result<RawOcularConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawOcularConfig, overlay: RawOcularConfig) -> RawOcularConfig {
        let mut data = base.data;
        data.extend(overlay.data);

        RawOcularConfig {
            plugins: RawPluginsConfig {
                autoload: overlay.plugins.autoload.or(base.plugins.autoload),
            },
            runtime: RawRuntimeConfig {
                tick_ms: overlay.runtime.tick_ms.or(base.runtime.tick_ms),
                emit_tick: overlay.runtime.emit_tick.or(base.runtime.emit_tick),
            },
            data,
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawOcularConfig) -> Result<OcularConfig> {
        let tick_ms = raw.runtime.tick_ms.unwrap_or(DEFAULT_TICK_MS);
        if tick_ms == 0 {
            bail!("runtime.tick_ms must be greater than zero");
        }

        Ok(OcularConfig {
            plugins: PluginsConfig {
                autoload: raw.plugins.autoload.unwrap_or_else(default_autoload),
            },
            runtime: RuntimeConfig {
                tick_ms,
                emit_tick: raw.runtime.emit_tick.unwrap_or(true),
            },
            data: raw.data,
        })
    }
}
