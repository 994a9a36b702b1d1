//! Remove command

use std::process::ExitCode;

use anyhow::Result;
use auh_core::Installer;

use crate::ui::Output;

/// Remove `packages`, optionally with their unneeded dependencies.
pub async fn remove(
    installer: &Installer,
    packages: &[String],
    autoremove: bool,
    output: &Output,
) -> Result<ExitCode> {
    let result = installer.remove(packages, autoremove, output).await;
    Ok(super::exit_code(result))
}
