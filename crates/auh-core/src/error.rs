//! Domain-specific errors for acquisition pipelines

use thiserror::Error;

/// A package identifier failed validation. Raised before any external call
/// and never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid package name '{name}': {reason}")]
pub struct InvalidIdentifier {
    /// The identifier exactly as supplied.
    pub name: String,
    /// Short description of the rule it broke.
    pub reason: &'static str,
}

/// Terminal failure of a single package pipeline.
///
/// These stay local to the unit that produced them; the scheduler records
/// them and the rest of the batch carries on.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The registry has no package with this name.
    #[error("Package not found: {0}")]
    NotFound(String),

    /// The recipe could not be retrieved (network, repository or spawn error).
    #[error("Fetch failed for {name}: {reason}")]
    FetchFailed {
        /// Package whose recipe was being fetched.
        name: String,
        /// What went wrong.
        reason: String,
    },

    /// The build tool reported failure.
    #[error("Build failed for {name}: {reason}")]
    BuildFailed {
        /// Package being built.
        name: String,
        /// Exit status or spawn error of the build tool.
        reason: String,
    },

    /// The repository install step of an update failed.
    #[error("{action} failed for {name}: {reason}")]
    Local {
        /// Step that failed, e.g. "install".
        action: &'static str,
        /// Package the step ran for.
        name: String,
        /// Error reported by the package manager.
        reason: String,
    },

    /// The unit died without producing an outcome.
    #[error("Task for {name} aborted: {reason}")]
    Aborted {
        /// Package the unit was working on.
        name: String,
        /// Panic message or cancellation cause.
        reason: String,
    },
}

impl PipelineError {
    /// Create a fetch failure.
    pub fn fetch(name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::FetchFailed {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a build failure.
    pub fn build(name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::BuildFailed {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Short status word used in per-package output lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not found",
            Self::FetchFailed { .. } => "fetch failed",
            Self::BuildFailed { .. } => "build failed",
            Self::Local { .. } => "failed",
            Self::Aborted { .. } => "aborted",
        }
    }
}

/// Failure to launch or wait for an external command.
#[derive(Error, Debug)]
pub enum ExecError {
    /// The executable is not on `PATH`.
    #[error("{program} not found in PATH")]
    NotFound {
        /// Program that was looked up.
        program: String,
    },

    /// Spawning or waiting on the child failed.
    #[error("Failed to run {program}: {source}")]
    Io {
        /// Program that was launched.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Failure talking to the registry query service.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status code.
    #[error("Registry returned HTTP {0}")]
    Status(u16),

    /// Body was not the expected JSON.
    #[error("Malformed registry response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The service answered with an error document.
    #[error("Registry error: {0}")]
    Api(String),
}

/// Failure loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Config file path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`Config`](crate::Config).
    #[error("Invalid config {path}: {source}")]
    Parse {
        /// Config file path.
        path: String,
        /// Parser error with location.
        #[source]
        source: toml::de::Error,
    },
}
