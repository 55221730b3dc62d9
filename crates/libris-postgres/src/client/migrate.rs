//! Embedded schema migrations and schema checks.
//!
//! The migrations under `migrations/` are compiled into the crate. The CLI's
//! `migrate`, `status` and `verify` subcommands are thin wrappers around the
//! three [`PgClient`] methods defined here.

use std::fmt;
use std::time::{Duration, Instant};

use diesel::migration::MigrationSource;
use diesel::pg::Pg;
use diesel::sql_query;
use diesel::sql_types::{Bool, Text};
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use diesel_migrations::MigrationHarness;
use tokio::task::spawn_blocking;

use super::PooledConnection;
use crate::{MIGRATIONS, PgClient, PgError, PgResult, TRACING_TARGET_MIGRATION};

/// Tables every repository in this crate reads from or writes to.
pub const REQUIRED_TABLES: &[&str] = &[
    "accounts",
    "books",
    "book_loans",
    "book_reviews",
    "annotations",
    "annotation_replies",
    "annotation_likes",
];

const MIGRATION_TABLE: &str = "__diesel_schema_migrations";

/// Applied and pending schema versions, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaStatus {
    pub applied: Vec<String>,
    pub pending: Vec<String>,
}

impl SchemaStatus {
    /// Splits the embedded versions by whether the database recorded them.
    fn compare(applied: Vec<String>, embedded: Vec<String>) -> Self {
        let pending = embedded
            .into_iter()
            .filter(|version| !applied.contains(version))
            .collect();

        Self { applied, pending }
    }

    /// Returns whether every embedded migration has been applied.
    #[inline]
    pub fn is_current(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn latest_applied(&self) -> Option<&str> {
        self.applied.last().map(String::as_str)
    }

    pub fn next_pending(&self) -> Option<&str> {
        <[String]>::first(&self.pending).map(String::as_str)
    }
}

impl fmt::Display for SchemaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} applied, {} pending",
            self.applied.len(),
            self.pending.len()
        )?;

        match self.next_pending() {
            Some(next) => write!(f, " (next {next})"),
            None => Ok(()),
        }
    }
}

/// Versions applied by one migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub applied: Vec<String>,
    pub elapsed: Duration,
}

impl MigrationReport {
    /// Returns whether the schema was already current.
    #[inline]
    pub fn is_no_op(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Result of checking the live schema against the embedded one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReport {
    /// Whether diesel's migration bookkeeping table exists.
    pub initialized: bool,
    pub status: SchemaStatus,
    /// Entries of [`REQUIRED_TABLES`] absent from the database.
    pub missing_tables: Vec<&'static str>,
}

impl SchemaReport {
    /// Returns every problem found; empty for a usable schema.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if !self.initialized {
            problems.push(format!("{MIGRATION_TABLE} does not exist"));
        }

        if !self.status.is_current() {
            problems.push(format!(
                "{} migrations pending: {}",
                self.status.pending.len(),
                self.status.pending.join(", ")
            ));
        }

        if !self.missing_tables.is_empty() {
            problems.push(format!(
                "missing tables: {}",
                self.missing_tables.join(", ")
            ));
        }

        problems
    }

    #[inline]
    pub fn is_healthy(&self) -> bool {
        self.problems().is_empty()
    }
}

#[derive(diesel::QueryableByName)]
struct Exists {
    #[diesel(sql_type = Bool)]
    exists: bool,
}

#[derive(diesel::QueryableByName)]
struct AppliedVersion {
    #[diesel(sql_type = Text)]
    version: String,
}

fn embedded_versions() -> PgResult<Vec<String>> {
    let mut versions: Vec<String> = MigrationSource::<Pg>::migrations(&MIGRATIONS)
        .map_err(PgError::Migration)?
        .iter()
        .map(|migration| migration.name().version().to_string())
        .collect();

    versions.sort();
    Ok(versions)
}

async fn table_exists(conn: &mut AsyncPgConnection, table: &str) -> PgResult<bool> {
    let row = sql_query("SELECT to_regclass($1) IS NOT NULL AS exists")
        .bind::<Text, _>(table)
        .get_result::<Exists>(conn)
        .await
        .map_err(PgError::from)?;

    Ok(row.exists)
}

async fn read_status(conn: &mut AsyncPgConnection, initialized: bool) -> PgResult<SchemaStatus> {
    let applied = if initialized {
        sql_query(format!("SELECT version FROM {MIGRATION_TABLE} ORDER BY version"))
            .get_results::<AppliedVersion>(conn)
            .await
            .map_err(PgError::from)?
            .into_iter()
            .map(|row| row.version)
            .collect()
    } else {
        Vec::new()
    };

    Ok(SchemaStatus::compare(applied, embedded_versions()?))
}

impl PgClient {
    /// Applies every embedded migration the database has not recorded.
    ///
    /// The diesel migration harness is synchronous, so it runs on a blocking
    /// thread over an [`AsyncConnectionWrapper`].
    pub async fn run_pending_migrations(&self) -> PgResult<MigrationReport> {
        let started = Instant::now();
        let mut conn = self.get_connection().await?;

        let initialized = table_exists(&mut conn, MIGRATION_TABLE).await?;
        let status = read_status(&mut conn, initialized).await?;
        if status.is_current() {
            tracing::info!(
                target: TRACING_TARGET_MIGRATION,
                latest = ?status.latest_applied(),
                "Schema is up to date"
            );
            return Ok(MigrationReport {
                applied: Vec::new(),
                elapsed: started.elapsed(),
            });
        }

        tracing::info!(
            target: TRACING_TARGET_MIGRATION,
            pending = status.pending.len(),
            next = ?status.next_pending(),
            "Applying migrations"
        );

        let mut harness: AsyncConnectionWrapper<PooledConnection> = conn.into_inner().into();
        let applied = spawn_blocking(move || {
            harness.run_pending_migrations(MIGRATIONS).map(|versions| {
                versions
                    .into_iter()
                    .map(|version| version.to_string())
                    .collect::<Vec<_>>()
            })
        })
        .await
        .map_err(|err| PgError::Migration(err.into()))?
        .map_err(|err| {
            tracing::error!(target: TRACING_TARGET_MIGRATION, error = %err, "Migration failed");
            PgError::Migration(err)
        })?;

        let report = MigrationReport {
            applied,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            target: TRACING_TARGET_MIGRATION,
            applied = ?report.applied,
            elapsed = ?report.elapsed,
            "Migrations applied"
        );

        Ok(report)
    }

    /// Reads which embedded migrations the database has applied.
    ///
    /// A database that was never migrated reports all of them as pending.
    pub async fn schema_status(&self) -> PgResult<SchemaStatus> {
        let mut conn = self.get_connection().await?;
        let initialized = table_exists(&mut conn, MIGRATION_TABLE).await?;
        read_status(&mut conn, initialized).await
    }

    /// Compares the live schema with the embedded migrations and
    /// [`REQUIRED_TABLES`].
    ///
    /// Problems are reported in the returned [`SchemaReport`], not as errors.
    pub async fn verify_schema(&self) -> PgResult<SchemaReport> {
        let mut conn = self.get_connection().await?;
        let initialized = table_exists(&mut conn, MIGRATION_TABLE).await?;
        let status = read_status(&mut conn, initialized).await?;

        let mut missing_tables = Vec::new();
        for &table in REQUIRED_TABLES {
            if !table_exists(&mut conn, table).await? {
                missing_tables.push(table);
            }
        }

        let report = SchemaReport {
            initialized,
            status,
            missing_tables,
        };

        if report.is_healthy() {
            tracing::info!(target: TRACING_TARGET_MIGRATION, "Schema verified");
        } else {
            tracing::warn!(
                target: TRACING_TARGET_MIGRATION,
                problems = ?report.problems(),
                "Schema verification found problems"
            );
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions(list: &[&str]) -> Vec<String> {
        list.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn embedded_versions_are_sorted() {
        let embedded = embedded_versions().unwrap();
        assert!(!embedded.is_empty());
        assert!(embedded.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn status_splits_embedded_versions() {
        let status = SchemaStatus::compare(
            versions(&["20250601000000"]),
            versions(&["20250601000000", "20250701000000"]),
        );

        assert_eq!(status.pending, versions(&["20250701000000"]));
        assert_eq!(status.latest_applied(), Some("20250601000000"));
        assert_eq!(status.next_pending(), Some("20250701000000"));
        assert!(!status.is_current());
        assert_eq!(status.to_string(), "1 applied, 1 pending (next 20250701000000)");

        let fresh = SchemaStatus::compare(Vec::new(), versions(&["20250601000000"]));
        assert_eq!(fresh.latest_applied(), None);
        assert_eq!(fresh.to_string(), "0 applied, 1 pending (next 20250601000000)");
    }

    #[test]
    fn report_lists_each_problem() {
        let healthy = SchemaReport {
            initialized: true,
            status: SchemaStatus::compare(versions(&["1"]), versions(&["1"])),
            missing_tables: Vec::new(),
        };
        assert!(healthy.is_healthy());
        assert_eq!(healthy.status.to_string(), "1 applied, 0 pending");

        let broken = SchemaReport {
            initialized: false,
            status: SchemaStatus::compare(Vec::new(), versions(&["1", "2"])),
            missing_tables: vec!["books", "book_loans"],
        };
        assert_eq!(
            broken.problems(),
            vec![
                "__diesel_schema_migrations does not exist".to_string(),
                "2 migrations pending: 1, 2".to_string(),
                "missing tables: books, book_loans".to_string(),
            ]
        );
    }

    #[test]
    fn required_tables_cover_both_aggregates() {
        for table in ["books", "book_loans", "annotations", "annotation_likes"] {
            assert!(REQUIRED_TABLES.contains(&table));
        }
    }
}
