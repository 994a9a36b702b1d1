//! Install command

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use auh_core::{BackendPreference, Installer};

use crate::ui::Output;

/// Build and install `packages` through the selected backend.
pub async fn install(
    installer: &Installer,
    packages: &[String],
    preference: BackendPreference,
    output: &Output,
) -> Result<ExitCode> {
    let result = installer
        .install(packages, preference, Arc::new(output.clone()))
        .await;
    Ok(super::exit_code(result))
}
