//! Batch installation.
//!
//! Validates the requested names, picks a backend once for the whole batch
//! and hands the surviving names to the [`TaskScheduler`].

use std::sync::Arc;

use tracing::info;

use crate::backend::{Backend, BackendKind, MirrorBackend, RegistryBackend};
use crate::config::Config;
use crate::error::RegistryError;
use crate::exec::{CommandRunner, TokioCommandRunner};
use crate::local::{LocalPackages, Pacman};
use crate::name::{PackageName, PackageRequest};
use crate::outcome::{BatchResult, Outcome, OutcomeAggregator};
use crate::probe::{HttpLivenessProbe, Liveness, LivenessProbe};
use crate::registry::{AurRpcClient, RegistryClient};
use crate::reporter::Reporter;
use crate::scheduler::TaskScheduler;

/// Backend requested by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendPreference {
    /// Probe the registry and fall back to the mirror when it is down.
    #[default]
    Auto,
    /// Always use the registry, without probing.
    Registry,
    /// Always use the mirror, without probing.
    Mirror,
}

/// Resolve a preference to a backend. Only `Auto` probes, and only once.
pub async fn select_backend(preference: BackendPreference, probe: &dyn LivenessProbe) -> BackendKind {
    match preference {
        BackendPreference::Registry => BackendKind::Registry,
        BackendPreference::Mirror => BackendKind::Mirror,
        BackendPreference::Auto => match probe.check().await {
            Liveness::Up => BackendKind::Registry,
            Liveness::Down => {
                info!("registry unreachable, using mirror for this batch");
                BackendKind::Mirror
            }
        },
    }
}

/// Entry point for every batch operation.
///
/// Holds the external collaborators behind traits; [`Installer::from_config`]
/// wires the real ones.
pub struct Installer {
    pub(crate) local: Arc<dyn LocalPackages>,
    pub(crate) registry: Arc<dyn RegistryClient>,
    pub(crate) probe: Arc<dyn LivenessProbe>,
    pub(crate) runner: Arc<dyn CommandRunner>,
    pub(crate) config: Config,
}

impl std::fmt::Debug for Installer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Installer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Installer {
    /// Installer over explicit collaborators.
    pub fn new(
        local: Arc<dyn LocalPackages>,
        registry: Arc<dyn RegistryClient>,
        probe: Arc<dyn LivenessProbe>,
        runner: Arc<dyn CommandRunner>,
        config: Config,
    ) -> Self {
        Self {
            local,
            registry,
            probe,
            runner,
            config,
        }
    }

    /// Wire `pacman`, the registry RPC, the HTTP probe and real processes.
    pub fn from_config(config: Config) -> Result<Self, RegistryError> {
        let runner: Arc<dyn CommandRunner> = Arc::new(TokioCommandRunner);
        let local = Arc::new(Pacman::new(runner.clone()));
        let registry = Arc::new(AurRpcClient::new(&config.registry_url)?);
        let probe = Arc::new(HttpLivenessProbe::new(
            &config.registry_url,
            config.probe_timeout(),
        )?);
        Ok(Self::new(local, registry, probe, runner, config))
    }

    /// Effective configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Registry pipeline sharing this installer's collaborators.
    pub fn registry_backend(&self) -> RegistryBackend {
        RegistryBackend::new(
            self.local.clone(),
            self.registry.clone(),
            self.runner.clone(),
            &self.config,
        )
    }

    /// Mirror pipeline sharing this installer's collaborators.
    pub fn mirror_backend(&self) -> MirrorBackend {
        MirrorBackend::new(self.local.clone(), self.runner.clone(), &self.config)
    }

    fn backend(&self, kind: BackendKind) -> Arc<dyn Backend> {
        match kind {
            BackendKind::Registry => Arc::new(self.registry_backend()),
            BackendKind::Mirror => Arc::new(self.mirror_backend()),
        }
    }

    /// Install a batch of packages.
    ///
    /// Invalid names are rejected up front without any external call. If no
    /// valid name remains the probe is skipped entirely.
    pub async fn install(
        &self,
        raw_names: &[String],
        preference: BackendPreference,
        reporter: Arc<dyn Reporter>,
    ) -> BatchResult {
        let (valid, mut outcomes) = validate_all(raw_names, reporter.as_ref());

        if !valid.is_empty() {
            let kind = select_backend(preference, self.probe.as_ref()).await;
            info!(backend = %kind, packages = valid.len(), "starting batch");

            let shown: Vec<String> = valid.iter().map(ToString::to_string).collect();
            reporter.prepare_batch(&shown, &kind.to_string());

            let scheduler = TaskScheduler::new(self.config.max_concurrent);
            outcomes.merge(scheduler.run(valid, self.backend(kind), reporter.clone()).await);
        }

        finish(outcomes, reporter.as_ref())
    }
}

/// Split raw names into valid ones and an aggregator holding the rejects.
pub(crate) fn validate_all(
    raw_names: &[String],
    reporter: &dyn Reporter,
) -> (Vec<PackageName>, OutcomeAggregator) {
    let mut outcomes = OutcomeAggregator::new();
    let mut valid = Vec::with_capacity(raw_names.len());
    for raw in raw_names {
        match PackageRequest::new(raw.as_str()).validate() {
            Ok(name) => valid.push(name),
            Err(e) => {
                tracing::warn!(name = %raw, reason = e.reason, "rejected package name");
                reporter.failed(raw, &format!("invalid name ({})", e.reason));
                outcomes.record(&Outcome::Invalid(e));
            }
        }
    }
    (valid, outcomes)
}

/// Report the summary line (if any) and close the batch.
pub(crate) fn finish(outcomes: OutcomeAggregator, reporter: &dyn Reporter) -> BatchResult {
    let result = outcomes.finish();
    if let Some(line) = result.summary() {
        reporter.error(&line);
    }
    result
}
