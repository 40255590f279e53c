use crate::envelope::Envelope;
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct PoolStatus {
    pub backend: String,
    pub checked_out: u32,
}

pub fn health_router() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}

// does not touch the database, so it stays up while the pool is exhausted
async fn health_handler(State(state): State<AppState>) -> Json<Envelope<PoolStatus>> {
    Json(Envelope::success(
        "ok",
        PoolStatus {
            backend: state.pool.backend().to_string(),
            checked_out: state.pool.checked_out(),
        },
    ))
}
