//! Recipe retrieval and the external build tool.

use std::path::Path;
use std::sync::Arc;

use crate::error::PipelineError;
use crate::exec::{CommandRunner, CommandSpec};
use crate::name::PackageName;

/// Options passed to the build tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Skip PGP signature verification of upstream sources.
    pub skip_signature_check: bool,
}

/// Clones package recipes with `git`.
#[derive(Clone)]
pub struct SourceFetcher {
    runner: Arc<dyn CommandRunner>,
}

impl std::fmt::Debug for SourceFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFetcher").finish_non_exhaustive()
    }
}

impl SourceFetcher {
    /// Fetcher launching `git` through `runner`.
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// `git clone <registry>/<name>.git <dest>`
    pub fn registry_command(clone_url: &str, dest: &Path) -> CommandSpec {
        git_clone()
            .arg(clone_url)
            .arg(dest.to_string_lossy())
    }

    /// `git clone --single-branch --branch <name> --depth=1 <mirror>.git <dest>`
    pub fn mirror_command(name: &PackageName, mirror_url: &str, dest: &Path) -> CommandSpec {
        git_clone()
            .args(["--single-branch", "--branch", name.as_str(), "--depth=1"])
            .arg(mirror_url)
            .arg(dest.to_string_lossy())
    }

    /// Run a clone command, mapping any failure to [`PipelineError::FetchFailed`].
    pub async fn fetch(&self, name: &PackageName, cmd: &CommandSpec) -> Result<(), PipelineError> {
        match self.runner.status(cmd).await {
            Ok(exit) if exit.success() => Ok(()),
            Ok(exit) => Err(PipelineError::fetch(name.as_str(), format!("git clone: {exit}"))),
            Err(e) => Err(PipelineError::fetch(name.as_str(), e)),
        }
    }
}

fn git_clone() -> CommandSpec {
    CommandSpec::new("git")
        .arg("clone")
        .env("GIT_TERMINAL_PROMPT", "0")
        .quiet()
}

/// Runs `makepkg` to build and install a fetched recipe.
#[derive(Clone)]
pub struct BuildTool {
    runner: Arc<dyn CommandRunner>,
}

impl std::fmt::Debug for BuildTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildTool").finish_non_exhaustive()
    }
}

impl BuildTool {
    /// Build tool launching `makepkg` through `runner`.
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// `makepkg -si --noconfirm [--skippgpcheck]`, run inside `dir`.
    pub fn command(dir: &Path, options: BuildOptions) -> CommandSpec {
        let mut cmd = CommandSpec::new("makepkg")
            .args(["-si", "--noconfirm"])
            .current_dir(dir);
        if options.skip_signature_check {
            cmd = cmd.arg("--skippgpcheck");
        }
        cmd
    }

    /// Build and install, mapping any failure to [`PipelineError::BuildFailed`].
    pub async fn build_and_install(
        &self,
        name: &PackageName,
        dir: &Path,
        options: BuildOptions,
    ) -> Result<(), PipelineError> {
        match self.runner.status(&Self::command(dir, options)).await {
            Ok(exit) if exit.success() => Ok(()),
            Ok(exit) => Err(PipelineError::build(name.as_str(), format!("makepkg: {exit}"))),
            Err(e) => Err(PipelineError::build(name.as_str(), e)),
        }
    }
}
