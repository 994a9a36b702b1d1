//! Clean command

use std::process::ExitCode;

use anyhow::Result;
use auh_core::Installer;

use crate::ui::Output;

/// Clear the package cache.
pub async fn clean(installer: &Installer, output: &Output) -> Result<ExitCode> {
    let result = installer.clean(output).await;
    Ok(super::exit_code(result))
}
