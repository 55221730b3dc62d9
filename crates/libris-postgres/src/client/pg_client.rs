//! Pool owner and pooled connection handle.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use deadpool::managed::{Hook, Pool};
use derive_more::{Deref, DerefMut};
use diesel_async::RunQueryDsl;
use diesel_async::pooled_connection::{AsyncDieselConnectionManager, ManagerConfig};

use super::{ConnectionPool, PooledConnection, hooks};
use crate::{PgConfig, PgError, PgResult, TRACING_TARGET_CLIENT, TRACING_TARGET_CONNECTION};

/// Acquisitions slower than this are logged as a warning.
const SLOW_ACQUIRE: Duration = Duration::from_millis(100);

/// Shared handle to the library database.
///
/// Clones share one pool. Repository operations run on the [`PgConn`]
/// returned by [`PgClient::get_connection`].
#[derive(Clone)]
pub struct PgClient {
    inner: Arc<PgClientInner>,
}

struct PgClientInner {
    pool: ConnectionPool,
    config: PgConfig,
}

impl PgClient {
    /// Builds the pool without opening a connection.
    ///
    /// Prefer [`PgConfig::build`], which validates the configuration first.
    pub fn new(config: PgConfig) -> PgResult<Self> {
        let mut manager_config = ManagerConfig::default();
        manager_config.custom_setup = Box::new(hooks::establish);
        let manager =
            AsyncDieselConnectionManager::new_with_config(config.database_url(), manager_config);

        let pool = Pool::builder(manager)
            .max_size(config.postgres_max_connections as usize)
            .wait_timeout(config.connection_timeout())
            .create_timeout(config.connection_timeout())
            .recycle_timeout(config.idle_timeout())
            .runtime(deadpool::Runtime::Tokio1)
            .post_create(Hook::sync_fn(hooks::post_create))
            .pre_recycle(Hook::sync_fn(hooks::pre_recycle))
            .build()
            .map_err(|err| PgError::Config(format!("invalid pool settings: {err}")))?;

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            database_url = %config.database_url_masked(),
            max_connections = config.postgres_max_connections,
            "Database pool created"
        );

        Ok(Self {
            inner: Arc::new(PgClientInner { pool, config }),
        })
    }

    /// Validates the configuration, builds the pool and checks that the
    /// database answers.
    pub async fn connect(config: PgConfig) -> PgResult<Self> {
        let client = config.build()?;
        client.ping().await?;
        Ok(client)
    }

    /// Runs `SELECT 1` on a pooled connection.
    pub async fn ping(&self) -> PgResult<()> {
        let mut conn = self.get_connection().await?;
        diesel::sql_query("SELECT 1")
            .execute(&mut **conn)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(target: TRACING_TARGET_CONNECTION, "Database answered ping");
        Ok(())
    }

    /// Checks a connection out of the pool.
    ///
    /// Waits at most the configured connection timeout.
    pub async fn get_connection(&self) -> PgResult<PgConn> {
        let started = Instant::now();
        let conn = self.inner.pool.get().await.map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_CONNECTION,
                error = %err,
                elapsed = ?started.elapsed(),
                "Failed to acquire connection from pool"
            );
            PgError::from(err)
        })?;

        let elapsed = started.elapsed();
        if elapsed > SLOW_ACQUIRE {
            let status = self.inner.pool.status();
            tracing::warn!(
                target: TRACING_TARGET_CONNECTION,
                ?elapsed,
                pool_size = status.size,
                waiting = status.waiting,
                "Slow connection acquisition"
            );
        }

        Ok(PgConn { conn })
    }
}

impl fmt::Debug for PgClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self.inner.pool.status();
        f.debug_struct("PgClient")
            .field("config", &self.inner.config)
            .field("pool_size", &status.size)
            .field("pool_available", &status.available)
            .finish()
    }
}

/// A connection checked out of the pool.
///
/// Every repository trait is implemented for [`PgConnection`], which this
/// handle dereferences to, so `conn.borrow_book(..)` works directly. The
/// connection goes back to the pool on drop.
///
/// [`PgConnection`]: crate::PgConnection
#[derive(Deref, DerefMut)]
pub struct PgConn {
    #[deref]
    #[deref_mut]
    conn: PooledConnection,
}

impl PgConn {
    /// Releases the pooled connection itself.
    pub(crate) fn into_inner(self) -> PooledConnection {
        self.conn
    }
}

impl fmt::Debug for PgConn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgConn").finish_non_exhaustive()
    }
}
