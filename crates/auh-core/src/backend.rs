//! Acquisition backends.
//!
//! A backend drives one package through its pipeline. Both implementations
//! share the same contract and terminal states:
//!
//! ```text
//! registry: CheckLocal ─► QueryExistence ─► Fetch ─► Build ─► Installed
//! mirror:   CheckLocal ─────────────────────► Fetch ─► Build ─► Installed
//!               │               │               │        │
//!        AlreadySatisfied    NotFound      FetchFailed  BuildFailed
//! ```
//!
//! Stages run strictly in order and a failing stage ends the pipeline. There
//! are no retries.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;
use tracing::debug;

use crate::config::Config;
use crate::error::PipelineError;
use crate::exec::CommandRunner;
use crate::local::LocalPackages;
use crate::name::PackageName;
use crate::registry::RegistryClient;
use crate::reporter::Reporter;
use crate::source::{BuildOptions, BuildTool, SourceFetcher};

/// Which source serves a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// The authoritative registry, one repository per package.
    Registry,
    /// The mirror monorepo, one branch per package.
    Mirror,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Registry => "registry",
            Self::Mirror => "mirror",
        })
    }
}

/// Successful terminal state of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquired {
    /// Already present locally; nothing was fetched or built.
    AlreadySatisfied,
    /// Fetched, built and installed.
    Installed,
}

impl Acquired {
    /// Status text shown next to the package name.
    pub fn describe(self) -> &'static str {
        match self {
            Self::AlreadySatisfied => "already installed",
            Self::Installed => "installed",
        }
    }
}

/// One way of turning a package name into an installed package.
///
/// Implementations are shared by every unit of a batch, so each call must
/// keep its on-disk state private to that call.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Source this backend fetches from.
    fn kind(&self) -> BackendKind;

    /// Run the full pipeline for one validated package.
    async fn acquire(
        &self,
        name: &PackageName,
        reporter: &dyn Reporter,
    ) -> Result<Acquired, PipelineError>;
}

/// Pipeline against the authoritative registry.
pub struct RegistryBackend {
    local: Arc<dyn LocalPackages>,
    registry: Arc<dyn RegistryClient>,
    fetcher: SourceFetcher,
    builder: BuildTool,
    config: Config,
}

impl fmt::Debug for RegistryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBackend")
            .field("registry_url", &self.config.registry_url)
            .field("build_dir", &self.config.build_dir)
            .finish_non_exhaustive()
    }
}

impl RegistryBackend {
    /// Backend fetching `<registry_url>/<name>.git` into `config.build_dir`.
    pub fn new(
        local: Arc<dyn LocalPackages>,
        registry: Arc<dyn RegistryClient>,
        runner: Arc<dyn CommandRunner>,
        config: &Config,
    ) -> Self {
        Self {
            local,
            registry,
            fetcher: SourceFetcher::new(runner.clone()),
            builder: BuildTool::new(runner),
            config: config.clone(),
        }
    }

    /// Fetch and build without the local or existence checks.
    ///
    /// Used by `update` when the repository install did not apply.
    pub async fn rebuild(
        &self,
        name: &PackageName,
        reporter: &dyn Reporter,
    ) -> Result<Acquired, PipelineError> {
        // Dropping the guard removes the directory on every return path.
        let scratch = scratch_dir(&self.config.build_dir, format!("auh-{name}-"))
            .await
            .map_err(|e| PipelineError::fetch(name.as_str(), e))?;
        let recipe = scratch.path().join(name.as_str());

        reporter.fetching(name);
        let clone = SourceFetcher::registry_command(
            &self.config.registry_clone_url(name.as_str()),
            &recipe,
        );
        self.fetcher.fetch(name, &clone).await?;

        reporter.building(name);
        self.builder
            .build_and_install(name, &recipe, BuildOptions::default())
            .await?;
        Ok(Acquired::Installed)
    }
}

/// Create a fresh working directory under `root`, unique to one unit.
///
/// Two units for the same package never share a directory, so neither can
/// remove the other's recipe while it is being built.
async fn scratch_dir(root: &Path, prefix: String) -> std::io::Result<TempDir> {
    tokio::fs::create_dir_all(root).await?;
    let root = root.to_path_buf();
    let dir = tokio::task::spawn_blocking(move || {
        tempfile::Builder::new().prefix(&prefix).tempdir_in(&root)
    })
    .await
    .map_err(std::io::Error::other)??;
    debug!(path = %dir.path().display(), "created working directory");
    Ok(dir)
}

#[async_trait]
impl Backend for RegistryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Registry
    }

    async fn acquire(
        &self,
        name: &PackageName,
        reporter: &dyn Reporter,
    ) -> Result<Acquired, PipelineError> {
        if self.local.is_installed(name).await {
            debug!(package = %name, "already installed");
            return Ok(Acquired::AlreadySatisfied);
        }

        let hits = self
            .registry
            .lookup(name)
            .await
            .map_err(|e| PipelineError::fetch(name.as_str(), e))?;
        if hits.is_empty() {
            return Err(PipelineError::NotFound(name.to_string()));
        }

        self.rebuild(name, reporter).await
    }
}

/// Pipeline against the mirror monorepo. Every package is a branch.
pub struct MirrorBackend {
    local: Arc<dyn LocalPackages>,
    fetcher: SourceFetcher,
    builder: BuildTool,
    mirror_url: String,
    build_dir: PathBuf,
}

impl fmt::Debug for MirrorBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MirrorBackend")
            .field("mirror_url", &self.mirror_url)
            .field("build_dir", &self.build_dir)
            .finish_non_exhaustive()
    }
}

impl MirrorBackend {
    /// Backend cloning single branches of the mirror into `config.build_dir`.
    pub fn new(
        local: Arc<dyn LocalPackages>,
        runner: Arc<dyn CommandRunner>,
        config: &Config,
    ) -> Self {
        Self {
            local,
            fetcher: SourceFetcher::new(runner.clone()),
            builder: BuildTool::new(runner),
            mirror_url: config.mirror_clone_url(),
            build_dir: config.build_dir.clone(),
        }
    }
}

#[async_trait]
impl Backend for MirrorBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Mirror
    }

    async fn acquire(
        &self,
        name: &PackageName,
        reporter: &dyn Reporter,
    ) -> Result<Acquired, PipelineError> {
        if self.local.is_installed(name).await {
            debug!(package = %name, "already installed");
            return Ok(Acquired::AlreadySatisfied);
        }

        // Dropping the guard removes the directory on every return path.
        let scratch = scratch_dir(&self.build_dir, format!("auh-mirror-{name}-"))
            .await
            .map_err(|e| PipelineError::fetch(name.as_str(), e))?;
        let recipe = scratch.path().join(name.as_str());

        reporter.fetching(name);
        let clone = SourceFetcher::mirror_command(name, &self.mirror_url, &recipe);
        self.fetcher.fetch(name, &clone).await?;

        reporter.building(name);
        self.builder
            .build_and_install(
                name,
                &recipe,
                BuildOptions {
                    skip_signature_check: true,
                },
            )
            .await?;
        Ok(Acquired::Installed)
    }
}
