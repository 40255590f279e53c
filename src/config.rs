use crate::database::Backend;
use sqlx::mysql::MySqlConnectOptions;
use sqlx::ConnectOptions;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("unsupported database url scheme in {0:?}, expected mysql:// or sqlite:")]
    UnsupportedBackend(String),
}

#[derive(Clone, Debug)]
pub struct CarsConfig {
    pub database: DatabaseConfig,
    pub bind_addr: SocketAddr,
    pub auto_create_schema: bool,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub backend: Backend,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// Statements run on every connection as it is checked out for a request.
    pub session_statements: Vec<String>,
}

impl DatabaseConfig {
    /// Pool settings for `url` with the backend's default session statements.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let backend =
            Backend::from_url(&url).ok_or_else(|| ConfigError::UnsupportedBackend(url.clone()))?;

        Ok(Self {
            url,
            backend,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
            session_statements: backend.default_session_statements(),
        })
    }
}

impl CarsConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't have to touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = match lookup("DATABASE_URL").filter(|url| !url.is_empty()) {
            Some(url) => url,
            None => mysql_url_from_parts(&lookup)?,
        };

        let mut database = DatabaseConfig::new(url)?;

        if let Some(max) = parse_var::<u32, _>(&lookup, "MAX_CONNECTIONS")? {
            if max == 0 {
                return Err(ConfigError::Invalid {
                    key: "MAX_CONNECTIONS",
                    value: max.to_string(),
                });
            }
            database.max_connections = max;
        }

        if let Some(secs) = parse_var::<u64, _>(&lookup, "ACQUIRE_TIMEOUT_SECS")? {
            database.acquire_timeout = Duration::from_secs(secs);
        }

        // an explicitly empty SESSION_STATEMENTS disables session setup entirely
        if let Some(raw) = lookup("SESSION_STATEMENTS") {
            database.session_statements = split_statements(&raw);
        }

        let host = match lookup("HOST") {
            Some(raw) => raw.parse::<IpAddr>().map_err(|_| ConfigError::Invalid {
                key: "HOST",
                value: raw,
            })?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        let port = parse_var::<u16, _>(&lookup, "PORT")?.unwrap_or(DEFAULT_PORT);

        let auto_create_schema = match lookup("AUTO_CREATE_SCHEMA") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid {
                key: "AUTO_CREATE_SCHEMA",
                value: raw,
            })?,
            None => true,
        };

        Ok(Self {
            database,
            bind_addr: SocketAddr::new(host, port),
            auto_create_schema,
        })
    }
}

// only used when DATABASE_URL is unset; the DB_* parts always describe a MySQL server
fn mysql_url_from_parts<F>(lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let database = lookup("DB_DATABASE")
        .filter(|db| !db.is_empty())
        .ok_or(ConfigError::Missing("DB_DATABASE"))?;
    let host = lookup("DB_HOST").unwrap_or_else(|| "localhost".to_string());
    let port = parse_var::<u16, _>(lookup, "DB_PORT")?.unwrap_or(3306);
    let user = lookup("DB_USER").unwrap_or_else(|| "root".to_string());

    let mut options = MySqlConnectOptions::new()
        .host(&host)
        .port(port)
        .username(&user)
        .database(&database);
    if let Some(password) = lookup("DB_PASSWORD").filter(|p| !p.is_empty()) {
        options = options.password(&password);
    }

    Ok(options.to_url_lossy().to_string())
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn split_statements(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
