//! auh-core - acquisition engine for community package recipes
//!
//! Fetches build recipes from an untrusted remote registry (or its mirror when
//! the registry is unreachable), builds them with the system build tool and
//! installs the result, running several packages at once under a fixed cap.
//!
//! # Architecture
//!
//! ```text
//!  raw names ──► PackageName::parse ──► select_backend (probe once)
//!                                             │
//!                                             ▼
//!                              TaskScheduler (≤ max_concurrent units)
//!                               │        │        │
//!                        Backend::acquire for each name
//!                               │        │        │
//!                               ▼        ▼        ▼
//!                           OutcomeAggregator ──► BatchResult
//! ```
//!
//! - **Newtypes**: `PackageName` can only be built through validation, so the
//!   backends never see an identifier that failed the character-class check.
//! - **Argument vectors**: every external tool is launched from a
//!   [`CommandSpec`](exec::CommandSpec); no shell ever parses an identifier.
//! - **Seams**: the local package database, the registry RPC, the liveness
//!   probe and process execution are traits, so the pipelines are tested
//!   without a network or a real package manager.

pub mod backend;
pub mod config;
pub mod error;
pub mod exec;
pub mod install;
pub mod local;
pub mod maintenance;
pub mod name;
pub mod outcome;
pub mod paths;
pub mod probe;
pub mod registry;
pub mod reporter;
pub mod scheduler;
pub mod source;

#[cfg(test)]
pub(crate) mod test_support;

pub use backend::{Acquired, Backend, BackendKind, MirrorBackend, RegistryBackend};
pub use config::Config;
pub use error::{InvalidIdentifier, PipelineError};
pub use install::{BackendPreference, Installer, select_backend};
pub use name::{PackageName, PackageRequest};
pub use outcome::{BatchResult, Outcome, OutcomeAggregator};
pub use reporter::{NullReporter, Reporter};
pub use scheduler::TaskScheduler;

/// User Agent string for registry traffic
pub const USER_AGENT: &str = concat!("auh/", env!("CARGO_PKG_VERSION"));
