//! Sync command

use std::process::ExitCode;

use anyhow::{Context, Result};
use auh_core::Installer;

use crate::ui::Output;

/// Print explicitly installed packages that the registry also knows.
pub async fn sync(installer: &Installer, output: &Output) -> Result<ExitCode> {
    installer
        .sync(output)
        .await
        .context("Failed to list installed packages")?;
    Ok(ExitCode::SUCCESS)
}
