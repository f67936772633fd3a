//! `PostgreSQL` connection pooling shared by the Diesel adapters.

use crate::config::DatabaseConfig;
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use thiserror::Error;

/// `PostgreSQL` connection pool type used by every adapter.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Failure to reach a connection before any query ran.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// No pooled connection could be checked out.
    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),

    /// The blocking worker panicked or was cancelled.
    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Builds a connection pool from configuration.
///
/// # Errors
///
/// Returns [`PoolError`] when the initial connections cannot be opened.
pub fn build_pool(config: &DatabaseConfig) -> Result<PgPool, PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(config.url.as_str());
    Pool::builder()
        .max_size(config.max_connections)
        .build(manager)
}

/// Runs `f` with a pooled connection on the blocking thread pool.
///
/// Checkout and join failures are converted with `wrap`, so each adapter
/// keeps its own error type.
pub(crate) async fn with_connection<F, T, E>(
    pool: &PgPool,
    wrap: fn(ConnectionError) -> E,
    f: F,
) -> Result<T, E>
where
    F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let shared_pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = shared_pool.get().map_err(|err| wrap(err.into()))?;
        f(&mut connection)
    })
    .await
    .map_err(|err| wrap(err.into()))?
}
