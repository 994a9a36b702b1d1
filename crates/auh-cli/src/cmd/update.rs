//! Update command

use std::process::ExitCode;

use anyhow::Result;
use auh_core::{Installer, Reporter};

use crate::ui::Output;

/// Full system upgrade when `packages` is empty, otherwise per package.
pub async fn update(installer: &Installer, packages: &[String], output: &Output) -> Result<ExitCode> {
    if packages.is_empty() {
        output.info("Upgrading all packages...");
    }
    let result = installer.update(packages, output).await;
    Ok(super::exit_code(result))
}
