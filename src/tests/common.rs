use crate::config::{CarsConfig, DatabaseConfig};
use crate::database::{ensure_schema, ConnectionPool};
use crate::server::app;
use crate::AppState;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

// a single connection keeps every checkout on the same in-memory database
pub fn memory_db_config() -> DatabaseConfig {
    let mut config = DatabaseConfig::new("sqlite::memory:").expect("sqlite url is supported");
    config.max_connections = 1;
    config.acquire_timeout = Duration::from_millis(500);
    config
}

// file-backed database for tests that need more than one connection
pub fn file_db_config(dir: &Path, max_connections: u32) -> DatabaseConfig {
    let url = format!("sqlite://{}?mode=rwc", dir.join("cars.db").display());
    let mut config = DatabaseConfig::new(url).expect("sqlite url is supported");
    config.max_connections = max_connections;
    config.acquire_timeout = Duration::from_secs(2);
    config
}

pub async fn setup_pool(config: &DatabaseConfig) -> ConnectionPool {
    let pool = ConnectionPool::new(config).expect("Failed to create pool");
    ensure_schema(&pool).await.expect("Failed to create cars table");
    pool
}

pub fn test_state(pool: ConnectionPool) -> AppState {
    let config = CarsConfig {
        database: memory_db_config(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        auto_create_schema: false,
    };

    AppState {
        pool,
        config: Arc::new(config),
    }
}

// the real router on top of an in-memory database with the cars table in place
pub async fn setup_app() -> (Router, ConnectionPool) {
    let pool = setup_pool(&memory_db_config()).await;
    (app(test_state(pool.clone())), pool)
}

// send a request through the router and decode the JSON envelope
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, json)
}

pub async fn list(app: &Router) -> Vec<Value> {
    let (status, json) = send(app, Method::GET, "/cars", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true, "list failed: {json}");
    json["data"].as_array().cloned().unwrap_or_default()
}
