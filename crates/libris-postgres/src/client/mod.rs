//! Pooled access to the library database.
//!
//! [`PgConfig`] describes the pool, [`PgClient`] owns it and hands out
//! [`PgConn`]s on which every repository trait in [`crate::query`] runs. The
//! client also applies the embedded schema migrations and reports on them.

mod hooks;
mod migrate;
mod pg_client;
mod pg_config;

use deadpool::managed::{Object, Pool};
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
pub use migrate::{MigrationReport, REQUIRED_TABLES, SchemaReport, SchemaStatus};
pub use pg_client::{PgClient, PgConn};
pub use pg_config::PgConfig;

type ConnectionManager = AsyncDieselConnectionManager<AsyncPgConnection>;

pub(crate) type ConnectionPool = Pool<ConnectionManager>;

/// Connection checked out of the pool; returned to it on drop.
pub type PooledConnection = Object<ConnectionManager>;
