//! Command implementations.

pub mod clean;
pub mod install;
pub mod remove;
pub mod sync;
pub mod update;

use std::process::ExitCode;

use anyhow::{Context, Result};
use auh_core::{BatchResult, Config, Installer};

use crate::Cli;

/// Load the configuration, apply flag overrides and wire the real services.
pub fn installer(cli: &Cli) -> Result<Installer> {
    let config = Config::load().context("Failed to load configuration")?;
    let config = cli.apply(config);
    tracing::debug!(?config, "effective configuration");
    Installer::from_config(config).context("Failed to initialise registry client")
}

pub(crate) fn exit_code(result: BatchResult) -> ExitCode {
    ExitCode::from(result.exit_code())
}
