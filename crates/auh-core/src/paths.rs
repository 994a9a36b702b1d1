//! Filesystem locations

use dirs::{cache_dir, config_dir};
use std::path::PathBuf;

/// Config file location: `$AUH_CONFIG`, else `<config dir>/auh/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    if let Ok(val) = std::env::var("AUH_CONFIG") {
        return Some(PathBuf::from(val));
    }
    config_dir().map(|d| d.join("auh").join("config.toml"))
}

/// Default build root: `<cache dir>/auh/build`
pub fn default_build_dir() -> Option<PathBuf> {
    cache_dir().map(|d| d.join("auh").join("build"))
}
