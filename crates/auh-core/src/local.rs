//! Local package database.
//!
//! The system package manager owns the database; this module only invokes it
//! and interprets exit status. Any non-zero exit is a failure, specific codes
//! are not interpreted.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ExecError;
use crate::exec::{CommandRunner, CommandSpec, ProcessExit};
use crate::name::PackageName;

/// Queries and mutations of the system package database.
#[async_trait]
pub trait LocalPackages: Send + Sync {
    /// Whether `name` is present in the local database.
    async fn is_installed(&self, name: &PackageName) -> bool;

    /// Install `name` from the configured repositories.
    async fn install(&self, name: &PackageName) -> Result<ProcessExit, ExecError>;

    /// Remove `name`; with `purge_deps` also its unneeded dependencies and
    /// saved configuration.
    async fn remove(&self, name: &PackageName, purge_deps: bool) -> Result<ProcessExit, ExecError>;

    /// Full system upgrade.
    async fn upgrade_all(&self) -> Result<ProcessExit, ExecError>;

    /// Drop every cached package file.
    async fn clean_cache(&self) -> Result<ProcessExit, ExecError>;

    /// Names of explicitly installed packages.
    async fn list_explicit(&self) -> Result<Vec<String>, ExecError>;
}

/// [`LocalPackages`] backed by `pacman`.
#[derive(Clone)]
pub struct Pacman {
    runner: Arc<dyn CommandRunner>,
}

impl std::fmt::Debug for Pacman {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pacman").finish_non_exhaustive()
    }
}

impl Pacman {
    /// `pacman` launched through `runner`.
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn query(args: &[&str]) -> CommandSpec {
        CommandSpec::new("pacman").args(args.iter().copied())
    }

    fn privileged(args: &[&str]) -> CommandSpec {
        CommandSpec::new("sudo")
            .arg("pacman")
            .args(args.iter().copied())
    }
}

#[async_trait]
impl LocalPackages for Pacman {
    async fn is_installed(&self, name: &PackageName) -> bool {
        let cmd = Self::query(&["-Q", name.as_str()]).quiet();
        match self.runner.status(&cmd).await {
            Ok(exit) => exit.success(),
            Err(e) => {
                tracing::warn!(package = %name, error = %e, "local query failed, assuming not installed");
                false
            }
        }
    }

    async fn install(&self, name: &PackageName) -> Result<ProcessExit, ExecError> {
        self.runner
            .status(&Self::privileged(&["-S", "--noconfirm", name.as_str()]))
            .await
    }

    async fn remove(&self, name: &PackageName, purge_deps: bool) -> Result<ProcessExit, ExecError> {
        let flag = if purge_deps { "-Rsn" } else { "-R" };
        self.runner
            .status(&Self::privileged(&[flag, "--noconfirm", name.as_str()]))
            .await
    }

    async fn upgrade_all(&self) -> Result<ProcessExit, ExecError> {
        self.runner
            .status(&Self::privileged(&["-Syu", "--noconfirm"]))
            .await
    }

    async fn clean_cache(&self) -> Result<ProcessExit, ExecError> {
        self.runner
            .status(&Self::privileged(&["-Scc", "--noconfirm"]))
            .await
    }

    async fn list_explicit(&self) -> Result<Vec<String>, ExecError> {
        let out = self.runner.output(&Self::query(&["-Qeq"])).await?;
        if !out.exit.success() {
            // pacman exits 1 when the query matches nothing
            return Ok(Vec::new());
        }
        Ok(out
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }
}
