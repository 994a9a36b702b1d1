//! Runtime configuration.
//!
//! Read from a TOML file (see [`paths::config_path`](crate::paths::config_path));
//! every key is optional and falls back to the documented default. The CLI
//! layers its flags on top with the `with_*` methods.
//!
//! ```toml
//! registry_url = "https://aur.archlinux.org"
//! mirror_url = "https://github.com/archlinux/aur"
//! build_dir = "/home/me/.cache/auh/build"
//! max_concurrent = 4
//! probe_timeout_secs = 10
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Default registry base URL.
pub const DEFAULT_REGISTRY_URL: &str = "https://aur.archlinux.org";

/// Default mirror monorepo; each package lives on a branch named after it.
pub const DEFAULT_MIRROR_URL: &str = "https://github.com/archlinux/aur";

/// Default number of packages acquired at once.
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;

/// Settings shared by every command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Registry base URL: liveness endpoint, RPC root and clone prefix.
    pub registry_url: String,
    /// Mirror base URL, without the `.git` suffix.
    pub mirror_url: String,
    /// Root under which per-package working directories are created.
    pub build_dir: PathBuf,
    /// Concurrency cap for the scheduler.
    pub max_concurrent: usize,
    /// Timeout for the liveness probe.
    pub probe_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            mirror_url: DEFAULT_MIRROR_URL.to_string(),
            build_dir: crate::paths::default_build_dir()
                .unwrap_or_else(|| std::env::temp_dir().join("auh-build")),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load from the default location. A missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match crate::paths::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                });
            }
        };
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    fn parse(text: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(text)?;
        config.normalize();
        Ok(config)
    }

    /// Override the registry URL.
    pub fn with_registry_url(mut self, url: impl Into<String>) -> Self {
        self.registry_url = url.into();
        self.normalize();
        self
    }

    /// Override the mirror URL.
    pub fn with_mirror_url(mut self, url: impl Into<String>) -> Self {
        self.mirror_url = url.into();
        self.normalize();
        self
    }

    /// Override the concurrency cap.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self.normalize();
        self
    }

    /// Override the build root.
    pub fn with_build_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.build_dir = dir.into();
        self
    }

    /// Probe timeout as a [`Duration`].
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// `<registry_url>/<name>.git`
    pub fn registry_clone_url(&self, name: &str) -> String {
        format!("{}/{name}.git", self.registry_url)
    }

    /// `<mirror_url>.git`
    pub fn mirror_clone_url(&self) -> String {
        format!("{}.git", self.mirror_url)
    }

    fn normalize(&mut self) {
        while self.registry_url.ends_with('/') {
            self.registry_url.pop();
        }
        while self.mirror_url.ends_with('/') {
            self.mirror_url.pop();
        }
        if let Some(stripped) = self.mirror_url.strip_suffix(".git") {
            self.mirror_url = stripped.to_string();
        }
        self.max_concurrent = self.max_concurrent.max(1);
    }
}
