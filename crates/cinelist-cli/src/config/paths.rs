//! Config file location.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

/// Application directory under the config home.
const APP_DIR: &str = "cinelist";

/// Config file name.
const CONFIG_FILE: &str = "config.toml";

/// Resolves the config file path.
///
/// In order of precedence:
/// - `{dir}/config.toml` when `dir` is given,
/// - `$XDG_CONFIG_HOME/cinelist/config.toml` when that variable is set to an absolute path,
/// - `$HOME/.config/cinelist/config.toml`.
///
/// # Errors
///
/// Returns an error if no directory is given and neither `XDG_CONFIG_HOME`
/// nor `HOME` is usable.
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join(CONFIG_FILE));
    }
    let xdg_config_home = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
    let home = std::env::var_os("HOME").map(PathBuf::from);
    default_config_path(xdg_config_home.as_deref(), home.as_deref())
}

/// Picks the default config path from the environment values.
///
/// Relative or empty `XDG_CONFIG_HOME` values are ignored, as the XDG base
/// directory rules require.
fn default_config_path(xdg_config_home: Option<&Path>, home: Option<&Path>) -> Result<PathBuf> {
    if let Some(config_home) = xdg_config_home.filter(|p| p.is_absolute()) {
        return Ok(config_home.join(APP_DIR).join(CONFIG_FILE));
    }
    match home.filter(|p| !p.as_os_str().is_empty()) {
        Some(home) => Ok(home.join(".config").join(APP_DIR).join(CONFIG_FILE)),
        None => bail!("neither XDG_CONFIG_HOME nor HOME is set; pass --dir"),
    }
}
