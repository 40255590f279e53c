use derive_more::Display;
use sqlx::Executor;

pub mod pool;

pub use pool::{ConnectionPool, PooledConnection};

// the cars table and session setup are the only dialect-specific parts of the service;
// every query the handlers run uses `?` placeholders, which both drivers accept
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum Backend {
    #[display("mysql")]
    MySql,
    #[display("sqlite")]
    Sqlite,
}

impl Backend {
    pub fn from_url(url: &str) -> Option<Self> {
        let scheme = url.split(':').next()?.to_ascii_lowercase();
        match scheme.as_str() {
            "mysql" | "mariadb" => Some(Backend::MySql),
            "sqlite" => Some(Backend::Sqlite),
            _ => None,
        }
    }

    /// Strict mode and a fixed UTC offset for MySQL; SQLite only has foreign keys to switch on.
    pub fn default_session_statements(self) -> Vec<String> {
        match self {
            Backend::MySql => vec![
                "SET SESSION sql_mode = 'TRADITIONAL'".to_string(),
                "SET time_zone = '-08:00'".to_string(),
            ],
            Backend::Sqlite => vec!["PRAGMA foreign_keys = ON".to_string()],
        }
    }

    pub fn create_cars_table(self) -> &'static str {
        match self {
            Backend::MySql => {
                r#"
                CREATE TABLE IF NOT EXISTS cars (
                    id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
                    make VARCHAR(255) NOT NULL,
                    model VARCHAR(255) NOT NULL,
                    year INT NOT NULL,
                    deleted_flag BOOLEAN NOT NULL DEFAULT FALSE
                )
                "#
            }
            Backend::Sqlite => {
                r#"
                CREATE TABLE IF NOT EXISTS cars (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    make TEXT NOT NULL,
                    model TEXT NOT NULL,
                    year INTEGER NOT NULL,
                    deleted_flag BOOLEAN NOT NULL DEFAULT 0
                )
                "#
            }
        }
    }
}

/// Creates the `cars` table when it does not exist yet.
pub async fn ensure_schema(pool: &ConnectionPool) -> sqlx::Result<()> {
    let mut conn = pool.acquire().await?;
    conn.execute(pool.backend().create_cars_table()).await?;
    pool.release(conn);

    tracing::info!(backend = %pool.backend(), "cars schema is ready");
    Ok(())
}
