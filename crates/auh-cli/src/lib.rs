//! auh - parallel installer for community package recipes
//!
//! Builds packages from the community registry with the system build tool,
//! several at a time, and falls back to the mirror when the registry is down.
//!
//! # Configuration
//!
//! ```text
//! $AUH_CONFIG or ~/.config/auh/config.toml   settings (all optional)
//! ~/.cache/auh/build/                        per-package working directories
//! ```

pub mod cmd;
pub mod ui;

use clap::{Parser, Subcommand, ValueEnum};

use auh_core::{BackendPreference, Config};

/// Command line arguments.
#[derive(Debug, Parser)]
#[command(name = "auh")]
#[command(author, version, about = "auh - build and install community packages in parallel")]
pub struct Cli {
    /// Registry base URL
    #[arg(long, global = true, env = "AUH_REGISTRY_URL")]
    pub registry_url: Option<String>,

    /// Mirror repository URL (without .git)
    #[arg(long, global = true, env = "AUH_MIRROR_URL")]
    pub mirror_url: Option<String>,

    /// Maximum number of packages built at once
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,

    /// Operation to run.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Apply command line overrides on top of the file configuration.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(url) = &self.registry_url {
            config = config.with_registry_url(url);
        }
        if let Some(url) = &self.mirror_url {
            config = config.with_mirror_url(url);
        }
        if let Some(jobs) = self.jobs {
            config = config.with_max_concurrent(jobs);
        }
        config
    }
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build and install packages
    Install {
        /// Package name(s)
        #[arg(required = true)]
        packages: Vec<String>,
        /// Where to fetch recipes from
        #[arg(long, value_enum, default_value_t = BackendArg::Auto)]
        backend: BackendArg,
    },
    /// Install packages from the mirror only
    #[command(hide = true)]
    Installg {
        /// Package name(s)
        #[arg(required = true)]
        packages: Vec<String>,
    },
    /// Remove installed packages
    Remove {
        /// Package name(s)
        #[arg(required = true)]
        packages: Vec<String>,
        /// Also remove unneeded dependencies and saved configuration
        #[arg(long, short = 'a')]
        autoremove: bool,
    },
    /// Upgrade the system, or rebuild the named packages
    Update {
        /// Specific packages to update (or the whole system if empty)
        packages: Vec<String>,
    },
    /// Clear the package cache
    Clean,
    /// List explicitly installed packages that come from the registry
    Sync,
}

/// Backend selection flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// Use the registry when reachable, the mirror otherwise
    Auto,
    /// Always use the registry
    Registry,
    /// Always use the mirror
    Mirror,
}

impl From<BackendArg> for BackendPreference {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Auto => Self::Auto,
            BackendArg::Registry => Self::Registry,
            BackendArg::Mirror => Self::Mirror,
        }
    }
}
