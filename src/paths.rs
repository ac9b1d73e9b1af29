//! Filesystem locations used by reviewbot
//!
//! ```text
//! $XDG_CONFIG_HOME/reviewbot/
//! └── config.toml               # API endpoint, reviewer identity, per-project values
//! ```

use std::path::PathBuf;

/// Directory name under the user config directory
const CONFIG_DIR: &str = "reviewbot";

/// Config filename
const CONFIG_FILE: &str = "config.toml";

/// Get the user config directory.
///
/// Returns `$XDG_CONFIG_HOME/reviewbot/` (or the platform equivalent),
/// falling back to `~/.config/reviewbot/`.
#[must_use]
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join(CONFIG_DIR)
}

/// Get the default config file path.
#[must_use]
pub fn default_config() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}
