//! Maintenance subcommands.

use anyhow::{Context, bail};
use clap::Subcommand;
use libris_postgres::query::BookLoanRepository;
use libris_postgres::types::{Clock, SystemClock};
use libris_postgres::PgClient;

use crate::TRACING_TARGET_COMMAND;

/// Maintenance task to run against the library database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Apply all pending schema migrations.
    Migrate,
    /// Report applied and pending migrations.
    Status,
    /// Check that the schema is fully migrated and every table exists.
    Verify,
    /// Flag borrowed loans past their due time as overdue.
    MarkOverdue,
}

impl Command {
    /// Returns the subcommand name as typed on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Command::Migrate => "migrate",
            Command::Status => "status",
            Command::Verify => "verify",
            Command::MarkOverdue => "mark-overdue",
        }
    }

    /// Runs the subcommand.
    pub async fn run(self, client: &PgClient) -> anyhow::Result<()> {
        match self {
            Command::Migrate => migrate(client).await,
            Command::Status => status(client).await,
            Command::Verify => verify(client).await,
            Command::MarkOverdue => mark_overdue(client, &SystemClock).await,
        }
    }
}

async fn migrate(client: &PgClient) -> anyhow::Result<()> {
    let report = client
        .run_pending_migrations()
        .await
        .context("failed to run migrations")?;

    if report.is_no_op() {
        tracing::info!(target: TRACING_TARGET_COMMAND, "Schema already up to date");
        return Ok(());
    }

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        applied = report.applied.len(),
        last_version = ?report.applied.last(),
        duration_ms = report.elapsed.as_millis() as u64,
        "Migrations applied"
    );

    Ok(())
}

async fn status(client: &PgClient) -> anyhow::Result<()> {
    let status = client
        .schema_status()
        .await
        .context("failed to read migration status")?;

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        %status,
        last_applied = ?status.latest_applied(),
        next_pending = ?status.next_pending(),
        up_to_date = status.is_current(),
        "Migration status"
    );

    Ok(())
}

async fn verify(client: &PgClient) -> anyhow::Result<()> {
    let report = client
        .verify_schema()
        .await
        .context("failed to inspect schema")?;

    if !report.is_healthy() {
        bail!("schema verification failed: {}", report.problems().join("; "));
    }

    tracing::info!(target: TRACING_TARGET_COMMAND, status = %report.status, "Schema verified");
    Ok(())
}

async fn mark_overdue(client: &PgClient, clock: &impl Clock) -> anyhow::Result<()> {
    let mut conn = client
        .get_connection()
        .await
        .context("failed to acquire database connection")?;

    let now = clock.now();
    let flagged = conn
        .mark_overdue_loans(now)
        .await
        .context("failed to flag overdue loans")?;

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        flagged,
        %now,
        "Overdue loans flagged"
    );

    Ok(())
}
