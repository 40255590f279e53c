//! Bounded pool of database connections handed out one per request.
//!
//! Wraps an sqlx `AnyPool` so the same code runs against MySQL in production
//! and SQLite locally. Connections are opened lazily, on first checkout, up to
//! `max_connections`.

use super::Backend;
use crate::config::DatabaseConfig;
use sqlx::any::AnyPoolOptions;
use sqlx::pool::PoolConnection;
use sqlx::{Any, AnyConnection, AnyPool};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

#[derive(Clone)]
pub struct ConnectionPool {
    pool: AnyPool,
    backend: Backend,
    session_statements: Arc<[String]>,
    checked_out: Arc<AtomicU32>,
}

impl ConnectionPool {
    /// Builds the pool without opening any connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the database url cannot be parsed.
    pub fn new(config: &DatabaseConfig) -> sqlx::Result<Self> {
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy(&config.url)?;

        Ok(Self {
            pool,
            backend: config.backend,
            session_statements: config.session_statements.clone().into(),
            checked_out: Arc::new(AtomicU32::new(0)),
        })
    }

    /// Checks out one connection, waiting while the pool is exhausted.
    ///
    /// # Errors
    ///
    /// Fails with `PoolTimedOut` once the acquire timeout elapses, or with the
    /// driver's error when the database cannot be reached.
    pub async fn acquire(&self) -> sqlx::Result<PooledConnection> {
        let conn = self.pool.acquire().await?;
        let count = self.checked_out.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::trace!(checked_out = count, "connection checked out");

        Ok(PooledConnection {
            conn,
            checked_out: Arc::clone(&self.checked_out),
        })
    }

    /// Returns a connection to the pool. Dropping the handle has the same effect.
    pub fn release(&self, handle: PooledConnection) {
        drop(handle);
    }

    /// Number of connections currently held by callers.
    pub fn checked_out(&self) -> u32 {
        self.checked_out.load(Ordering::Acquire)
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn session_statements(&self) -> &[String] {
        &self.session_statements
    }

    /// Waits for checked out connections to come back, then closes every connection.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("database pool closed");
    }
}

impl fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("backend", &self.backend)
            .field("size", &self.pool.size())
            .field("checked_out", &self.checked_out())
            .finish()
    }
}

/// A connection checked out of a [`ConnectionPool`]; released when dropped.
pub struct PooledConnection {
    conn: PoolConnection<Any>,
    checked_out: Arc<AtomicU32>,
}

impl Deref for PooledConnection {
    type Target = AnyConnection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let count = self.checked_out.fetch_sub(1, Ordering::AcqRel) - 1;
        tracing::trace!(checked_out = count, "connection released");
    }
}

impl fmt::Debug for PooledConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledConnection").finish_non_exhaustive()
    }
}
