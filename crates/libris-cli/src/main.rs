#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod telemetry;

use std::process;

use anyhow::Context;
use libris_postgres::PgClient;

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "libris_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "libris_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "libris_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "libris_cli::command";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SHUTDOWN,
            "command completed successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %error,
            "command failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    telemetry::init_tracing()?;
    cli.log();
    cli.validate()?;

    let client = create_client(&cli)?;
    cli.command.run(&client).await
}

/// Creates the pooled database client from configuration.
fn create_client(cli: &Cli) -> anyhow::Result<PgClient> {
    cli.postgres
        .clone()
        .build()
        .context("failed to create database client")
}
