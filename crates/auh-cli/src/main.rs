//! auh - parallel installer for community package recipes

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use auh_cli::cmd;
use auh_cli::ui::Output;
use auh_cli::{Cli, Commands};
use auh_core::BackendPreference;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let installer = cmd::installer(&cli)?;
    let output = Output::new();

    let code = match cli.command {
        Commands::Install { packages, backend } => {
            cmd::install::install(&installer, &packages, backend.into(), &output).await
        }
        Commands::Installg { packages } => {
            cmd::install::install(&installer, &packages, BackendPreference::Mirror, &output).await
        }
        Commands::Remove {
            packages,
            autoremove,
        } => cmd::remove::remove(&installer, &packages, autoremove, &output).await,
        Commands::Update { packages } => cmd::update::update(&installer, &packages, &output).await,
        Commands::Clean => cmd::clean::clean(&installer, &output).await,
        Commands::Sync => cmd::sync::sync(&installer, &output).await,
    };

    output.wait().await;
    code
}
