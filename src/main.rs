use crate::config::CarsConfig;
use crate::database::ConnectionPool;
use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod database;
pub mod envelope;
pub mod error;
mod features;
pub mod middleware;
pub mod server;

#[cfg(test)]
mod tests;

#[derive(Clone, Debug)]
pub struct AppState {
    pub pool: ConnectionPool,
    pub config: Arc<CarsConfig>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // determine environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,cars_server=debug")),
        )
        .init();

    let config = CarsConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(
        backend = %config.database.backend,
        max_connections = config.database.max_connections,
        session_statements = config.database.session_statements.len(),
        "configuration loaded"
    );

    // lazy: nothing is opened until the first checkout
    let pool = ConnectionPool::new(&config.database).context("Failed to create database pool")?;

    if config.auto_create_schema {
        database::ensure_schema(&pool)
            .await
            .context("Failed to prepare the cars table, is the database reachable?")?;
    }

    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config),
    };

    let served = server::serve(state).await;

    // drain before exiting, whether the server stopped cleanly or not
    pool.close().await;

    served
}
