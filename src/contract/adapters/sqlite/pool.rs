//! Connection pooling and blocking-operation helpers for SQLite.
//!
//! Diesel's SQLite driver is synchronous; every operation is offloaded
//! through [`tokio::task::spawn_blocking`] so it never blocks the async
//! executor's worker threads.

use diesel::SqliteConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sql_query;
use diesel::RunQueryDsl;

use crate::contract::ports::{ContractStoreError, ContractStoreResult};

/// SQLite connection pool type.
pub(super) type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

/// Pooled connection type for internal use.
pub(super) type PooledConn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Pragmas applied to every pooled connection.
///
/// WAL keeps readers unblocked during the gateway's serialized writes;
/// NORMAL sync is safe with WAL; the busy timeout covers pool-level
/// contention when tests share one file.
const CONNECTION_PRAGMAS: [&str; 4] = [
    "PRAGMA journal_mode=WAL",
    "PRAGMA synchronous=NORMAL",
    "PRAGMA cache_size=-65536",
    "PRAGMA busy_timeout=5000",
];

#[derive(Debug, Clone, Copy)]
struct ConnectionTuning;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionTuning {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        for pragma in CONNECTION_PRAGMAS {
            sql_query(pragma)
                .execute(conn)
                .map_err(diesel::r2d2::Error::QueryError)?;
        }
        Ok(())
    }
}

/// Builds a tuned pool for the given database path or URL.
pub(super) fn build_pool(database_url: &str, max_size: u32) -> ContractStoreResult<SqlitePool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(ConnectionTuning))
        .build(manager)
        .map_err(ContractStoreError::persistence)
}

/// Runs a blocking database operation on a dedicated thread pool.
pub(super) async fn run_blocking<F, T>(f: F) -> ContractStoreResult<T>
where
    F: FnOnce() -> ContractStoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| ContractStoreError::persistence(std::io::Error::other(err.to_string())))?
}

/// Obtains a connection from the pool.
pub(super) fn get_conn(pool: &SqlitePool) -> ContractStoreResult<PooledConn> {
    pool.get().map_err(ContractStoreError::persistence)
}
