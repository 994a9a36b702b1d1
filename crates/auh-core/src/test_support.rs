//! Test helpers: scripted process runner and in-memory collaborators.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::backend::{Acquired, Backend, BackendKind};
use crate::error::{ExecError, PipelineError, RegistryError};
use crate::exec::{CommandOutput, CommandRunner, CommandSpec, ProcessExit};
use crate::local::LocalPackages;
use crate::name::PackageName;
use crate::probe::{Liveness, LivenessProbe};
use crate::registry::{RegistryClient, RegistryPackage};
use crate::reporter::Reporter;

type Hook = Box<dyn Fn(&CommandSpec) + Send + Sync>;

/// [`CommandRunner`] that records every call and answers from a script.
///
/// Exit codes and stdout are keyed by [`CommandSpec::display`]; unscripted
/// commands exit with `default_exit` (0 unless changed).
#[derive(Default)]
pub(crate) struct ScriptedRunner {
    default_exit: i32,
    exits: HashMap<String, i32>,
    stdout: HashMap<String, String>,
    missing: HashSet<String>,
    hook: Option<Hook>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn default_exit(mut self, code: i32) -> Self {
        self.default_exit = code;
        self
    }

    pub(crate) fn exit(mut self, cmdline: &str, code: i32) -> Self {
        self.exits.insert(cmdline.to_string(), code);
        self
    }

    pub(crate) fn stdout(mut self, cmdline: &str, text: &str) -> Self {
        self.stdout.insert(cmdline.to_string(), text.to_string());
        self
    }

    /// Make every invocation of `program` fail as if it were not installed.
    pub(crate) fn missing(mut self, program: &str) -> Self {
        self.missing.insert(program.to_string());
        self
    }

    /// Run `hook` on every command before answering it.
    pub(crate) fn on_run(mut self, hook: impl Fn(&CommandSpec) + Send + Sync + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub(crate) fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn called_programs(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.program).collect()
    }

    fn answer(&self, cmd: &CommandSpec) -> Result<ProcessExit, ExecError> {
        self.calls.lock().unwrap().push(cmd.clone());
        if let Some(hook) = &self.hook {
            hook(cmd);
        }
        if self.missing.contains(&cmd.program) {
            return Err(ExecError::NotFound {
                program: cmd.program.clone(),
            });
        }
        let code = self
            .exits
            .get(&cmd.display())
            .copied()
            .unwrap_or(self.default_exit);
        Ok(ProcessExit::Code(code))
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn status(&self, cmd: &CommandSpec) -> Result<ProcessExit, ExecError> {
        self.answer(cmd)
    }

    async fn output(&self, cmd: &CommandSpec) -> Result<CommandOutput, ExecError> {
        let exit = self.answer(cmd)?;
        Ok(CommandOutput {
            exit,
            stdout: self.stdout.get(&cmd.display()).cloned().unwrap_or_default(),
        })
    }
}

/// In-memory local package database.
#[derive(Default)]
pub(crate) struct FakeLocal {
    installed: Mutex<HashSet<String>>,
    failing: HashSet<String>,
    explicit: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeLocal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn installed(self, names: &[&str]) -> Self {
        self.installed
            .lock()
            .unwrap()
            .extend(names.iter().map(ToString::to_string));
        self
    }

    /// Every mutating operation on `name` exits non-zero.
    pub(crate) fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub(crate) fn explicit(mut self, names: &[&str]) -> Self {
        self.explicit = names.iter().map(ToString::to_string).collect();
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn exit_for(&self, name: &str) -> ProcessExit {
        if self.failing.contains(name) {
            ProcessExit::Code(1)
        } else {
            ProcessExit::Code(0)
        }
    }
}

#[async_trait]
impl LocalPackages for FakeLocal {
    async fn is_installed(&self, name: &PackageName) -> bool {
        self.record(format!("query {name}"));
        self.installed.lock().unwrap().contains(name.as_str())
    }

    async fn install(&self, name: &PackageName) -> Result<ProcessExit, ExecError> {
        self.record(format!("install {name}"));
        Ok(self.exit_for(name))
    }

    async fn remove(&self, name: &PackageName, purge_deps: bool) -> Result<ProcessExit, ExecError> {
        let flag = if purge_deps { " --purge" } else { "" };
        self.record(format!("remove {name}{flag}"));
        let exit = self.exit_for(name);
        if exit.success() {
            self.installed.lock().unwrap().remove(name.as_str());
        }
        Ok(exit)
    }

    async fn upgrade_all(&self) -> Result<ProcessExit, ExecError> {
        self.record("upgrade".to_string());
        Ok(self.exit_for("*"))
    }

    async fn clean_cache(&self) -> Result<ProcessExit, ExecError> {
        self.record("clean".to_string());
        Ok(self.exit_for("*"))
    }

    async fn list_explicit(&self) -> Result<Vec<String>, ExecError> {
        self.record("list".to_string());
        Ok(self.explicit.clone())
    }
}

/// Registry that knows a fixed set of names.
#[derive(Default)]
pub(crate) struct FakeRegistry {
    known: HashSet<String>,
    broken: HashSet<String>,
    lookups: Mutex<Vec<String>>,
}

impl FakeRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, names: &[&str]) -> Self {
        self.known.extend(names.iter().map(ToString::to_string));
        self
    }

    /// Lookups of `name` fail with HTTP 503.
    pub(crate) fn broken(mut self, name: &str) -> Self {
        self.broken.insert(name.to_string());
        self
    }

    pub(crate) fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl RegistryClient for FakeRegistry {
    async fn lookup(&self, name: &PackageName) -> Result<Vec<RegistryPackage>, RegistryError> {
        self.lookups.lock().unwrap().push(name.to_string());
        if self.broken.contains(name.as_str()) {
            return Err(RegistryError::Status(503));
        }
        if !self.known.contains(name.as_str()) {
            return Ok(Vec::new());
        }
        Ok(vec![RegistryPackage {
            name: name.to_string(),
            package_base: Some(name.to_string()),
            version: "1.0-1".to_string(),
            description: None,
            url_path: None,
        }])
    }
}

/// Probe with a fixed answer.
pub(crate) struct FakeProbe {
    answer: Liveness,
    checks: AtomicUsize,
}

impl FakeProbe {
    pub(crate) fn new(answer: Liveness) -> Self {
        Self {
            answer,
            checks: AtomicUsize::new(0),
        }
    }

    pub(crate) fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LivenessProbe for FakeProbe {
    async fn check(&self) -> Liveness {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}

/// Backend that sleeps, tracks how many units run at once and answers per
/// name: names in `failing` fail, names in `panicking` panic, the rest
/// install.
pub(crate) struct TrackingBackend {
    delay: Duration,
    failing: HashSet<String>,
    panicking: HashSet<String>,
    active: AtomicUsize,
    peak: AtomicUsize,
    started: Mutex<Vec<String>>,
}

impl TrackingBackend {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            failing: HashSet::new(),
            panicking: HashSet::new(),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            started: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub(crate) fn panicking(mut self, name: &str) -> Self {
        self.panicking.insert(name.to_string());
        self
    }

    pub(crate) fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub(crate) fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for TrackingBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Registry
    }

    async fn acquire(
        &self,
        name: &PackageName,
        _reporter: &dyn Reporter,
    ) -> Result<Acquired, PipelineError> {
        self.started.lock().unwrap().push(name.to_string());
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.panicking.contains(name.as_str()) {
            panic!("unit for {name} crashed");
        }
        if self.failing.contains(name.as_str()) {
            return Err(PipelineError::build(name.as_str(), "makepkg: exit code 1"));
        }
        Ok(Acquired::Installed)
    }
}

/// Reporter that keeps one line per event.
#[derive(Default)]
pub(crate) struct RecordingReporter {
    events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, prefix: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl Reporter for RecordingReporter {
    fn prepare_batch(&self, packages: &[String], backend: &str) {
        self.push(format!("batch {backend} {}", packages.join(",")));
    }
    fn fetching(&self, name: &str) {
        self.push(format!("fetching {name}"));
    }
    fn building(&self, name: &str) {
        self.push(format!("building {name}"));
    }
    fn working(&self, name: &str, action: &str) {
        self.push(format!("working {name} {action}"));
    }
    fn done(&self, name: &str, detail: &str) {
        self.push(format!("done {name} {detail}"));
    }
    fn skipped(&self, name: &str, reason: &str) {
        self.push(format!("skipped {name} {reason}"));
    }
    fn failed(&self, name: &str, reason: &str) {
        self.push(format!("failed {name} {reason}"));
    }
    fn info(&self, msg: &str) {
        self.push(format!("info {msg}"));
    }
    fn success(&self, msg: &str) {
        self.push(format!("success {msg}"));
    }
    fn warning(&self, msg: &str) {
        self.push(format!("warning {msg}"));
    }
    fn error(&self, msg: &str) {
        self.push(format!("error {msg}"));
    }
}
