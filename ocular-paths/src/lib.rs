//! XDG Base Directory paths for ocular.
//!
//! The CLI uses XDG paths on every platform rather than platform-native
//! locations, so `~/.config/ocular` is the same place on Linux and macOS.

use std::path::PathBuf;

/// File name of the user configuration inside [`config_dir`]
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Get the ocular config directory.
///
/// Returns `$XDG_CONFIG_HOME/ocular` if set, otherwise `~/.config/ocular`.
///
/// # Examples
///
/// ```
/// use ocular_paths::config_dir;
///
/// let config = config_dir();
/// assert!(config.ends_with("ocular"));
/// ```
pub fn config_dir() -> PathBuf {
    config_dir_from(std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from), dirs::home_dir())
}

/// Path of the user configuration file
pub fn user_config_file() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

fn config_dir_from(xdg_config: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    match (xdg_config, home) {
        (Some(xdg), _) if !xdg.as_os_str().is_empty() => xdg.join("ocular"),
        (_, Some(home)) => home.join(".config/ocular"),
        _ => PathBuf::from(".config/ocular"),
    }
}
