//! External command execution.
//!
//! Every tool invocation is described by a [`CommandSpec`], an argument
//! vector handed directly to the OS process launcher. Identifiers are passed
//! as single arguments and are never re-parsed by a shell.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tracing::debug;

use crate::error::ExecError;

/// A program invocation: program, arguments, extra environment and working
/// directory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandSpec {
    /// Executable name, resolved through `PATH`.
    pub program: String,
    /// Arguments, each passed verbatim.
    pub args: Vec<String>,
    /// Variables added to the inherited environment.
    pub env: BTreeMap<String, String>,
    /// Directory the child starts in.
    pub working_dir: Option<PathBuf>,
    /// Discard stdout/stderr instead of inheriting the terminal.
    pub quiet: bool,
}

impl CommandSpec {
    /// Invocation of `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            working_dir: None,
            quiet: false,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Run the child inside `dir`.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Discard the child's output.
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Render for logs, e.g. `git clone https://... /tmp/x`.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How a process ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProcessExit {
    /// Exited normally with this code.
    Code(i32),
    /// Killed by a signal; no exit code.
    Signaled,
}

impl ProcessExit {
    /// Exit code zero.
    pub fn success(self) -> bool {
        self == Self::Code(0)
    }
}

impl std::fmt::Display for ProcessExit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Code(c) => write!(f, "exit code {c}"),
            Self::Signaled => f.write_str("terminated by signal"),
        }
    }
}

impl From<std::process::ExitStatus> for ProcessExit {
    fn from(status: std::process::ExitStatus) -> Self {
        status.code().map_or(Self::Signaled, Self::Code)
    }
}

/// Exit status plus captured stdout.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandOutput {
    /// How the process ended.
    pub exit: ProcessExit,
    /// Everything written to stdout, lossily decoded.
    pub stdout: String,
}

/// Launches external commands.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion and return the exit status.
    async fn status(&self, cmd: &CommandSpec) -> Result<ProcessExit, ExecError>;

    /// Run to completion capturing stdout (stderr is discarded).
    async fn output(&self, cmd: &CommandSpec) -> Result<CommandOutput, ExecError>;
}

/// [`CommandRunner`] backed by `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    fn command(cmd: &CommandSpec) -> Result<tokio::process::Command, ExecError> {
        let program = which::which(&cmd.program).map_err(|_| ExecError::NotFound {
            program: cmd.program.clone(),
        })?;

        let mut command = tokio::process::Command::new(program);
        command.args(&cmd.args);
        command.envs(&cmd.env);
        if let Some(dir) = &cmd.working_dir {
            command.current_dir(dir);
        }
        Ok(command)
    }
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn status(&self, cmd: &CommandSpec) -> Result<ProcessExit, ExecError> {
        debug!(command = %cmd.display(), "spawning");
        let mut command = Self::command(cmd)?;
        if cmd.quiet {
            command
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null());
        }

        let status = command.status().await.map_err(|source| ExecError::Io {
            program: cmd.program.clone(),
            source,
        })?;
        Ok(status.into())
    }

    async fn output(&self, cmd: &CommandSpec) -> Result<CommandOutput, ExecError> {
        debug!(command = %cmd.display(), "capturing");
        let mut command = Self::command(cmd)?;
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        let output = command.output().await.map_err(|source| ExecError::Io {
            program: cmd.program.clone(),
            source,
        })?;
        Ok(CommandOutput {
            exit: output.status.into(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}
