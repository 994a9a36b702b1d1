//! Remove, update, clean and sync.
//!
//! Thin sequential wrappers over the local package manager and the registry.
//! They share validation and outcome accounting with `install` but never go
//! through the scheduler.

use tracing::{debug, warn};

use crate::error::{ExecError, PipelineError};
use crate::exec::ProcessExit;
use crate::install::{Installer, finish, validate_all};
use crate::outcome::{BatchResult, Outcome, OutcomeAggregator};
use crate::registry::RegistryPackage;
use crate::reporter::Reporter;

/// Map a local package manager result to a pipeline result.
fn check_local(
    action: &'static str,
    name: &str,
    result: Result<ProcessExit, ExecError>,
) -> Result<(), PipelineError> {
    let reason = match result {
        Ok(exit) if exit.success() => return Ok(()),
        Ok(exit) => exit.to_string(),
        Err(e) => e.to_string(),
    };
    Err(PipelineError::Local {
        action,
        name: name.to_string(),
        reason,
    })
}

fn record(
    outcomes: &mut OutcomeAggregator,
    reporter: &dyn Reporter,
    name: &str,
    detail: &str,
    result: Result<(), PipelineError>,
) {
    match result {
        Ok(()) => {
            reporter.done(name, detail);
            outcomes.record_success();
        }
        Err(e) => {
            warn!(package = %name, error = %e, "operation failed");
            reporter.failed(name, &e.to_string());
            outcomes.record(&Outcome::Failed(e));
        }
    }
}

impl Installer {
    /// Remove packages. A package that is not installed is skipped, which
    /// counts as success.
    pub async fn remove(
        &self,
        raw_names: &[String],
        autoremove: bool,
        reporter: &dyn Reporter,
    ) -> BatchResult {
        let (valid, mut outcomes) = validate_all(raw_names, reporter);

        for name in valid {
            if !self.local.is_installed(&name).await {
                reporter.skipped(&name, "not installed; skipping");
                outcomes.record_success();
                continue;
            }
            reporter.working(&name, "removing");
            let result = check_local("remove", &name, self.local.remove(&name, autoremove).await);
            record(&mut outcomes, reporter, &name, "removed", result);
        }

        finish(outcomes, reporter)
    }

    /// Upgrade everything (no names) or the named packages.
    ///
    /// A named package that is installed is first reinstalled from the
    /// repositories; if that fails, or it is not installed at all, it is
    /// rebuilt from the registry.
    pub async fn update(&self, raw_names: &[String], reporter: &dyn Reporter) -> BatchResult {
        if raw_names.is_empty() {
            let mut outcomes = OutcomeAggregator::new();
            reporter.working("system", "upgrading");
            let result = check_local("upgrade", "system", self.local.upgrade_all().await);
            record(&mut outcomes, reporter, "system", "upgraded", result);
            return finish(outcomes, reporter);
        }

        let (valid, mut outcomes) = validate_all(raw_names, reporter);
        let backend = self.registry_backend();

        for name in valid {
            if self.local.is_installed(&name).await {
                reporter.working(&name, "upgrading");
                match check_local("install", &name, self.local.install(&name).await) {
                    Ok(()) => {
                        record(&mut outcomes, reporter, &name, "upgraded", Ok(()));
                        continue;
                    }
                    Err(e) => debug!(package = %name, error = %e, "repository install failed, rebuilding"),
                }
            }
            let result = backend.rebuild(&name, reporter).await.map(|_| ());
            record(&mut outcomes, reporter, &name, "rebuilt", result);
        }

        finish(outcomes, reporter)
    }

    /// Clear the package cache.
    pub async fn clean(&self, reporter: &dyn Reporter) -> BatchResult {
        let mut outcomes = OutcomeAggregator::new();
        reporter.working("cache", "cleaning");
        let result = check_local("clean", "cache", self.local.clean_cache().await);
        record(&mut outcomes, reporter, "cache", "cleaned", result);
        finish(outcomes, reporter)
    }

    /// Explicitly installed packages that also exist in the registry.
    ///
    /// One lookup per package, in order. Names that fail validation and
    /// lookups that error are skipped with a warning.
    pub async fn sync(&self, reporter: &dyn Reporter) -> Result<Vec<RegistryPackage>, ExecError> {
        let explicit = self.local.list_explicit().await?;
        if explicit.is_empty() {
            reporter.info("No explicitly installed packages found.");
            return Ok(Vec::new());
        }

        let mut hits = Vec::new();
        for raw in explicit {
            let Ok(name) = crate::PackageName::parse(&raw) else {
                warn!(name = %raw, "skipping unparseable local package name");
                reporter.warning(&format!("Skipping invalid package name: {raw}"));
                continue;
            };
            match self.registry.lookup(&name).await {
                Ok(found) => {
                    for pkg in found {
                        reporter.info(&format!("{} {}", pkg.name, pkg.version));
                        hits.push(pkg);
                    }
                }
                Err(e) => {
                    warn!(package = %name, error = %e, "registry lookup failed");
                    reporter.warning(&format!("Lookup failed for {name}: {e}"));
                }
            }
        }

        reporter.success(&format!("{} packages from the registry", hits.len()));
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::config::Config;
    use crate::install::Installer;
    use crate::probe::Liveness;
    use crate::test_support::{
        FakeLocal, FakeProbe, FakeRegistry, RecordingReporter, ScriptedRunner,
    };
    use tempfile::TempDir;

    fn installer(
        local: Arc<FakeLocal>,
        registry: Arc<FakeRegistry>,
        runner: Arc<ScriptedRunner>,
        build: &TempDir,
    ) -> Installer {
        Installer::new(
            local,
            registry,
            Arc::new(FakeProbe::new(Liveness::Up)),
            runner,
            Config::default()
                .with_registry_url("https://aur.example")
                .with_build_dir(build.path()),
        )
    }

    fn raw(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_remove_skips_missing_and_honours_autoremove() {
        let build = TempDir::new().unwrap();
        let local = Arc::new(FakeLocal::new().installed(&["yay"]));
        let inst = installer(
            local.clone(),
            Arc::new(FakeRegistry::new()),
            Arc::new(ScriptedRunner::new()),
            &build,
        );
        let reporter = RecordingReporter::new();

        let result = inst.remove(&raw(&["yay", "paru"]), true, &reporter).await;

        assert!(result.is_success());
        assert_eq!(result.succeeded, 2);
        assert!(local.calls().contains(&"remove yay --purge".to_string()));
        assert!(!local.calls().iter().any(|c| c.starts_with("remove paru")));
        assert_eq!(reporter.count("skipped paru"), 1);
    }

    #[tokio::test]
    async fn test_remove_failure_and_invalid_name() {
        let build = TempDir::new().unwrap();
        let local = Arc::new(FakeLocal::new().installed(&["yay"]).failing("yay"));
        let inst = installer(
            local,
            Arc::new(FakeRegistry::new()),
            Arc::new(ScriptedRunner::new()),
            &build,
        );
        let reporter = RecordingReporter::new();

        let result = inst.remove(&raw(&["yay", "x&y"]), false, &reporter).await;

        assert_eq!(result.failed, 1);
        assert_eq!(result.invalid, 1);
        assert_eq!(result.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_update_without_names_upgrades_system() {
        let build = TempDir::new().unwrap();
        let local = Arc::new(FakeLocal::new());
        let runner = Arc::new(ScriptedRunner::new());
        let inst = installer(local.clone(), Arc::new(FakeRegistry::new()), runner.clone(), &build);

        let result = inst.update(&[], &RecordingReporter::new()).await;

        assert!(result.is_success());
        assert_eq!(local.calls(), vec!["upgrade"]);
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_falls_back_to_rebuild() {
        let build = TempDir::new().unwrap();
        // "yay" installs from the repos; "paru" fails there; "aur-only" is not installed.
        let local = Arc::new(
            FakeLocal::new()
                .installed(&["yay", "paru"])
                .failing("paru"),
        );
        let runner = Arc::new(ScriptedRunner::new());
        let inst = installer(local.clone(), Arc::new(FakeRegistry::new()), runner.clone(), &build);
        let reporter = RecordingReporter::new();

        let result = inst
            .update(&raw(&["yay", "paru", "aur-only"]), &reporter)
            .await;

        assert!(result.is_success());
        assert_eq!(result.succeeded, 3);
        let cloned: Vec<String> = runner
            .calls()
            .iter()
            .filter(|c| c.program == "git")
            .map(|c| c.args[1].clone())
            .collect();
        assert_eq!(
            cloned,
            vec![
                "https://aur.example/paru.git",
                "https://aur.example/aur-only.git"
            ]
        );
        assert_eq!(reporter.count("done yay upgraded"), 1);
        assert_eq!(reporter.count("done paru rebuilt"), 1);
    }

    #[tokio::test]
    async fn test_clean() {
        let build = TempDir::new().unwrap();
        let local = Arc::new(FakeLocal::new().failing("*"));
        let inst = installer(
            local.clone(),
            Arc::new(FakeRegistry::new()),
            Arc::new(ScriptedRunner::new()),
            &build,
        );

        let result = inst.clean(&RecordingReporter::new()).await;
        assert_eq!(result.failed, 1);
        assert_eq!(local.calls(), vec!["clean"]);
    }

    #[tokio::test]
    async fn test_sync_cross_references_registry() {
        let build = TempDir::new().unwrap();
        let local = Arc::new(FakeLocal::new().explicit(&["base", "yay", "paru", "bad name"]));
        let registry = Arc::new(FakeRegistry::new().with(&["yay", "paru"]).broken("paru"));
        let inst = installer(
            local,
            registry.clone(),
            Arc::new(ScriptedRunner::new()),
            &build,
        );
        let reporter = RecordingReporter::new();

        let hits = inst.sync(&reporter).await.unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "yay");
        assert_eq!(registry.lookups(), vec!["base", "yay", "paru"]);
        assert_eq!(reporter.count("info yay 1.0-1"), 1);
        assert_eq!(reporter.count("success 1 packages"), 1);
        assert_eq!(
            reporter.count("warning Skipping invalid package name: bad name"),
            1
        );
        assert_eq!(reporter.count("warning Lookup failed for paru"), 1);
    }

    #[tokio::test]
    async fn test_sync_with_no_explicit_packages() {
        let build = TempDir::new().unwrap();
        let registry = Arc::new(FakeRegistry::new().with(&["yay"]));
        let inst = installer(
            Arc::new(FakeLocal::new()),
            registry.clone(),
            Arc::new(ScriptedRunner::new()),
            &build,
        );
        let reporter = RecordingReporter::new();

        let hits = inst.sync(&reporter).await.unwrap();

        assert!(hits.is_empty());
        assert!(registry.lookups().is_empty());
        assert_eq!(
            reporter.events(),
            vec!["info No explicitly installed packages found."]
        );
    }
}
